//! Template store: named document templates loaded from YAML.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::TemplateError;
use crate::models::template::Template;

/// On-disk layout of the template source.
#[derive(Deserialize)]
struct TemplateFile {
    templates: BTreeMap<String, Template>,
}

/// Read-only mapping from template name to template definition.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: BTreeMap<String, Template>,
}

impl TemplateStore {
    /// Load templates from a YAML file.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_yaml_str(&content)?;
        info!("Loaded {} templates from {}", store.len(), path.display());
        Ok(store)
    }

    /// Parse templates from an in-memory YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, TemplateError> {
        let file: TemplateFile =
            serde_yaml::from_str(content).map_err(|e| TemplateError::Parse(e.to_string()))?;
        Self::from_templates(file.templates)
    }

    fn from_templates(raw: BTreeMap<String, Template>) -> Result<Self, TemplateError> {
        let mut templates = BTreeMap::new();
        for (name, mut template) in raw {
            template.name = name.clone();
            template.validate()?;
            debug!("Template '{}' has {} sections", name, template.sections.len());
            templates.insert(name, template);
        }
        Ok(Self { templates })
    }

    /// Replace every template with the contents of `path`.
    ///
    /// On error the current templates are left untouched.
    pub fn reload(&mut self, path: &Path) -> Result<(), TemplateError> {
        let fresh = Self::load(path)?;
        *self = fresh;
        Ok(())
    }

    /// Look up a template by name.
    pub fn lookup(&self, name: &str) -> Result<&Template, TemplateError> {
        self.templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    /// Names of all loaded templates, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// Iterate over templates in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

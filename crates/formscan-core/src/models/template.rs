//! Document template data model.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

/// A named, ordered set of document regions with fixed fractional geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Unique key of the template (the mapping key in the config source).
    #[serde(default, skip_serializing)]
    pub name: String,

    /// Human-readable template name.
    #[serde(alias = "template_name")]
    pub display_name: String,

    /// Free-form description shown in reports.
    #[serde(default)]
    pub description: String,

    /// Regions of interest, in processing order.
    pub sections: Vec<Section>,
}

/// One named region within a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section name, unique within its template.
    pub name: String,

    /// Region as fractions of image width/height.
    pub coordinates: Rect,
}

/// A region expressed as fractions of image width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x_start: f64,
    pub x_end: f64,
    pub y_start: f64,
    pub y_end: f64,
}

impl Rect {
    /// Create a new rect from start/end fractions on each axis.
    pub fn new(x_start: f64, x_end: f64, y_start: f64, y_end: f64) -> Self {
        Self {
            x_start,
            x_end,
            y_start,
            y_end,
        }
    }

    /// Named fractional fields, in serialization order.
    pub fn fields(&self) -> [(&'static str, f64); 4] {
        [
            ("x_start", self.x_start),
            ("x_end", self.x_end),
            ("y_start", self.y_start),
            ("y_end", self.y_end),
        ]
    }

    /// Check range and ordering. Returns a description of the first problem.
    pub fn check(&self) -> Option<String> {
        for (field, value) in self.fields() {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Some(format!("{} = {} is outside [0, 1]", field, value));
            }
        }
        if self.x_start >= self.x_end {
            return Some(format!(
                "x_start ({}) must be less than x_end ({})",
                self.x_start, self.x_end
            ));
        }
        if self.y_start >= self.y_end {
            return Some(format!(
                "y_start ({}) must be less than y_end ({})",
                self.y_start, self.y_end
            ));
        }
        None
    }
}

impl Template {
    /// Validate the structural rules a loaded template must satisfy.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let invalid = |reason: String| TemplateError::Invalid {
            template: self.name.clone(),
            reason,
        };

        if self.sections.is_empty() {
            return Err(invalid("template has no sections".to_string()));
        }

        let mut seen = HashSet::new();
        for section in &self.sections {
            if section.name.trim().is_empty() {
                return Err(invalid("section name must not be empty".to_string()));
            }
            if section.name.contains(['/', '\\']) {
                return Err(invalid(format!(
                    "section name '{}' must not contain path separators",
                    section.name
                )));
            }
            if !seen.insert(section.name.as_str()) {
                return Err(invalid(format!("duplicate section name '{}'", section.name)));
            }
            if let Some(problem) = section.coordinates.check() {
                return Err(invalid(format!("section '{}': {}", section.name, problem)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: &str, rect: Rect) -> Section {
        Section {
            name: name.to_string(),
            coordinates: rect,
        }
    }

    fn template(sections: Vec<Section>) -> Template {
        Template {
            name: "invoice".to_string(),
            display_name: "Invoice".to_string(),
            description: String::new(),
            sections,
        }
    }

    #[test]
    fn test_valid_template() {
        let t = template(vec![
            section("header", Rect::new(0.0, 1.0, 0.0, 0.1)),
            section("amount", Rect::new(0.6, 0.9, 0.1, 0.2)),
        ]);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_duplicate_section_names_rejected() {
        let t = template(vec![
            section("amount", Rect::new(0.0, 0.5, 0.0, 0.5)),
            section("amount", Rect::new(0.5, 1.0, 0.5, 1.0)),
        ]);
        let err = t.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate section name 'amount'"));
    }

    #[test]
    fn test_rect_checks() {
        assert_eq!(Rect::new(0.1, 0.2, 0.3, 0.4).check(), None);
        assert!(Rect::new(0.5, 0.5, 0.0, 1.0).check().is_some());
        assert!(Rect::new(0.0, 1.0, 0.7, 0.2).check().is_some());
        assert!(Rect::new(-0.1, 0.5, 0.0, 1.0).check().is_some());
        assert!(Rect::new(0.0, 1.5, 0.0, 1.0).check().is_some());
        assert!(Rect::new(0.0, f64::NAN, 0.0, 1.0).check().is_some());
    }

    #[test]
    fn test_path_separator_rejected() {
        let t = template(vec![section("../amount", Rect::new(0.0, 0.5, 0.0, 0.5))]);
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_empty_template_rejected() {
        assert!(template(Vec::new()).validate().is_err());
    }
}

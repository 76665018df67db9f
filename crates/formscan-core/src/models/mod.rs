//! Data models shared across the pipeline.

pub mod config;
pub mod run;
pub mod template;

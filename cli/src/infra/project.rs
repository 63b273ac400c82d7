//! Infrastructure implementation of the `ProjectSource` port.
//!
//! Reads an already-resolved project (YAML or JSON, for example the output of
//! `compose config`). No schema validation happens here.

use std::path::Path;

use anyhow::{Context, Result};
use berth_common::Project;

use crate::application::ports::ProjectSource;

/// Loads a resolved project file from disk.
#[derive(Debug, Default)]
pub struct YamlProjectSource {
    /// Replaces the project name found in the file.
    name_override: Option<String>,
}

impl YamlProjectSource {
    #[must_use]
    pub fn new(name_override: Option<String>) -> Self {
        Self { name_override }
    }

    /// Parse project text. JSON input is accepted since it is valid YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid project, or it names no
    /// project and no override was given.
    pub fn parse(&self, content: &str) -> Result<Project> {
        let mut project: Project = serde_yaml::from_str(content).context("invalid project file")?;
        if let Some(name) = &self.name_override {
            project.name.clone_from(name);
        }
        anyhow::ensure!(
            !project.name.trim().is_empty(),
            "project has no name; pass --project-name"
        );
        project.resolve_names();
        Ok(project)
    }
}

impl ProjectSource for YamlProjectSource {
    fn load(&self, path: &Path) -> Result<Project> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        self.parse(&content)
            .with_context(|| format!("cannot load project from {}", path.display()))
    }
}

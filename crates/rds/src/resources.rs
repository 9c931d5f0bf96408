//! Database instances produced by a provisioning run.
//!
//! Later provisioning stages read endpoints from here, either in-process or
//! from the JSON file written by [`GeneratedResources::save`].

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::providers::{DbEndpoint, DbInstance};

/// The two database instances of a stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResources {
    /// The ID generator database.
    pub id_generator_database: DbInstance,
    /// The stack-instance database.
    pub stack_instances_database: DbInstance,
    /// When the run finished.
    pub generated_at: String,
}

impl GeneratedResources {
    /// Record the result of a run.
    #[must_use]
    pub fn new(id_generator_database: DbInstance, stack_instances_database: DbInstance) -> Self {
        Self {
            id_generator_database,
            stack_instances_database,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Endpoint of the ID generator database, once RDS has assigned one.
    #[must_use]
    pub fn id_generator_endpoint(&self) -> Option<&DbEndpoint> {
        self.id_generator_database.endpoint.as_ref()
    }

    /// Endpoint of the stack-instance database, once RDS has assigned one.
    #[must_use]
    pub fn stack_instances_endpoint(&self) -> Option<&DbEndpoint> {
        self.stack_instances_database.endpoint.as_ref()
    }

    /// Save to a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create output directory")?;
        }

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize resources")?;
        std::fs::write(path, content).context("Failed to write resources file")?;

        info!(path = %path.display(), "Saved generated resources");
        Ok(())
    }

    /// Load from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read resources file")?;
        serde_json::from_str(&content).context("Failed to parse resources file")
    }
}

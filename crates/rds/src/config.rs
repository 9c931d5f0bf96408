//! Stack configuration.
//!
//! The configuration is read once from a YAML file at startup. Master
//! passwords and the region may be overridden afterwards (the CLI feeds them
//! from environment variables) and the result is validated before use.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::providers::aws::regions;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`StackConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A required value is empty.
    #[error("Missing required configuration value: {0}")]
    Missing(&'static str),
}

/// Settings for one logical database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// DB instance identifier.
    pub identifier: String,
    /// Schema created on the instance.
    pub schema: String,
    /// Master user name.
    pub master_username: String,
    /// Master user password in plain text.
    #[serde(default, skip_serializing)]
    pub master_password: String,
    /// DB security group name.
    pub security_group: String,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("identifier", &self.identifier)
            .field("schema", &self.schema)
            .field("master_username", &self.master_username)
            .field("master_password", &"<redacted>")
            .field("security_group", &self.security_group)
            .finish()
    }
}

fn default_region() -> String {
    regions::US_EAST_1.to_string()
}

/// Configuration for a stack's databases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Production stacks get multi-AZ replicas and a larger stack database.
    #[serde(default)]
    pub production: bool,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// DB parameter group shared by both databases.
    pub database_parameter_group: String,
    /// The ID generator database.
    pub id_generator: DatabaseSettings,
    /// The stack-instance database.
    pub stack_instance: DatabaseSettings,
}

impl StackConfig {
    /// Parse configuration from YAML.
    ///
    /// # Errors
    /// Returns an error if the YAML is malformed.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&contents)?;

        info!(
            path = %path.display(),
            production = config.production,
            region = %config.region,
            "Loaded stack configuration"
        );
        Ok(config)
    }

    /// Override the region.
    #[must_use]
    pub fn with_region(mut self, region: Option<String>) -> Self {
        if let Some(region) = region {
            self.region = region;
        }
        self
    }

    /// Override master passwords. `None` keeps the configured value.
    #[must_use]
    pub fn with_passwords(
        mut self,
        id_generator: Option<String>,
        stack_instance: Option<String>,
    ) -> Self {
        if let Some(password) = id_generator {
            self.id_generator.master_password = password;
        }
        if let Some(password) = stack_instance {
            self.stack_instance.master_password = password;
        }
        self
    }

    /// Whether this is a production stack.
    #[must_use]
    pub fn is_production_stack(&self) -> bool {
        self.production
    }

    /// Check that every required value is present.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] naming the first empty value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("region", &self.region),
            ("database_parameter_group", &self.database_parameter_group),
            ("id_generator.identifier", &self.id_generator.identifier),
            ("id_generator.schema", &self.id_generator.schema),
            ("id_generator.master_username", &self.id_generator.master_username),
            ("id_generator.master_password", &self.id_generator.master_password),
            ("id_generator.security_group", &self.id_generator.security_group),
            ("stack_instance.identifier", &self.stack_instance.identifier),
            ("stack_instance.schema", &self.stack_instance.schema),
            ("stack_instance.master_username", &self.stack_instance.master_username),
            ("stack_instance.master_password", &self.stack_instance.master_password),
            ("stack_instance.security_group", &self.stack_instance.security_group),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ConfigError::Missing(*name)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use super::*;

    pub(crate) const SAMPLE: &str = r"
production: false
database_parameter_group: stack-mysql-params
id_generator:
  identifier: dev-id-generator-db
  schema: idgen
  master_username: idgenuser
  master_password: idgen-secret
  security_group: dev-id-generator-sg
stack_instance:
  identifier: dev-stack-db
  schema: stackdb
  master_username: stackuser
  master_password: stack-secret
  security_group: dev-stack-sg
";

    pub(crate) fn sample(production: bool) -> StackConfig {
        let mut config = StackConfig::from_yaml(SAMPLE).unwrap();
        config.production = production;
        config
    }

    #[test]
    fn test_parse_defaults_region() {
        let config = StackConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.region, "us-east-1");
        assert!(!config.is_production_stack());
        assert_eq!(config.id_generator.identifier, "dev-id-generator-db");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = StackConfig::load(file.path()).unwrap();
        assert_eq!(config.stack_instance.schema, "stackdb");
    }

    #[test]
    fn test_load_missing_file() {
        let result = StackConfig::load(Path::new("/nonexistent/stack.yaml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_validate_rejects_empty_password() {
        let config = sample(false).with_passwords(None, Some(String::new()));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("stack_instance.master_password"))
        ));
    }

    #[test]
    fn test_example_config_needs_passwords_from_env() {
        let config = StackConfig::from_yaml(include_str!("../stack.example.yaml")).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("id_generator.master_password"))
        ));

        let config = config.with_passwords(Some("a".to_string()), Some("b".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = sample(true)
            .with_region(Some("us-west-2".to_string()))
            .with_passwords(Some("from-env".to_string()), None);
        assert_eq!(config.region, "us-west-2");
        assert_eq!(config.id_generator.master_password, "from-env");
        assert_eq!(config.stack_instance.master_password, "stack-secret");
    }

    #[test]
    fn test_password_not_serialized_or_logged() {
        let config = sample(false);
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("idgen-secret"));
        assert!(!format!("{config:?}").contains("stack-secret"));
    }
}

//! Configuration management for the provisioner
//!
//! Handles configuration loading, defaults, and validation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::lifecycle::ProvisionError;

/// Provisioner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionerConfig {
    /// Directory containing module descriptors (one `module.toml` per
    /// subdirectory)
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: String,

    /// Timeout for a single lifecycle hook invocation, in seconds
    #[serde(default = "default_hook_timeout_secs")]
    pub hook_timeout_secs: u64,

    /// Log filter (e.g., "info", "app_provisioner=debug"); RUST_LOG takes
    /// precedence
    #[serde(default)]
    pub log_filter: Option<String>,

    /// Environment values handed to every lifecycle hook
    #[serde(default)]
    pub environment: HashMap<String, String>,
}

fn default_catalog_dir() -> String {
    "catalog".to_string()
}

fn default_hook_timeout_secs() -> u64 {
    30
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            catalog_dir: default_catalog_dir(),
            hook_timeout_secs: default_hook_timeout_secs(),
            log_filter: None,
            environment: HashMap::new(),
        }
    }
}

impl ProvisionerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProvisionError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ProvisionError::LoadError {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        let config: ProvisionerConfig =
            toml::from_str(&contents).map_err(|e| ProvisionError::LoadError {
                path: path.display().to_string(),
                cause: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.hook_timeout_secs == 0 {
            return Err(ProvisionError::InvalidConfig(
                "hook_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.catalog_dir.is_empty() {
            return Err(ProvisionError::InvalidConfig(
                "catalog_dir cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Hook timeout as a `Duration`
    pub fn hook_timeout(&self) -> Duration {
        Duration::from_secs(self.hook_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ProvisionerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hook_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = ProvisionerConfig {
            hook_timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ProvisionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: ProvisionerConfig = toml::from_str(
            r#"
            hook_timeout_secs = 5

            [environment]
            region = "eu-west"
            "#,
        )
        .unwrap();
        assert_eq!(config.catalog_dir, "catalog");
        assert_eq!(config.hook_timeout_secs, 5);
        assert_eq!(config.environment.get("region").unwrap(), "eu-west");
    }
}

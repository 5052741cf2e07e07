//! Module descriptor parsing and validation
//!
//! Handles parsing `module.toml` descriptors and validating module metadata
//! before it enters the catalog.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::lifecycle::ProvisionError;

/// Module category within the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleCategory {
    /// Required platform baseline
    Core,
    /// Standard feature module
    Feature,
    /// Optional extension
    Extension,
}

impl Default for ModuleCategory {
    fn default() -> Self {
        Self::Feature
    }
}

/// Static module metadata (`module.toml` structure)
///
/// Immutable once loaded into the catalog. Dependency order is preserved as
/// declared; the resolver relies on it for deterministic installation
/// ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Module id (unique, stable identifier)
    pub id: String,
    /// Module version (informational)
    #[serde(default)]
    pub version: Option<String>,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
    /// Module category
    #[serde(default)]
    pub category: ModuleCategory,
    /// Modules this module requires, in declared order
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Modules this module cannot run alongside
    #[serde(default)]
    pub incompatible_with: Vec<String>,
    /// Service groups this module may be provisioned for (empty = all)
    #[serde(default)]
    pub service_groups: Vec<String>,
    /// Whether this module is deprecated
    #[serde(default)]
    pub deprecated: bool,
    /// Recommended replacement for a deprecated module
    #[serde(default)]
    pub replacement: Option<String>,
}

impl ModuleDescriptor {
    /// Create a minimal descriptor with the given id and dependencies
    pub fn new(id: impl Into<String>, dependencies: Vec<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
            description: None,
            category: ModuleCategory::default(),
            dependencies,
            incompatible_with: Vec::new(),
            service_groups: Vec::new(),
            deprecated: false,
            replacement: None,
        }
    }

    /// Load a descriptor from a `module.toml` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProvisionError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ProvisionError::LoadError {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        let descriptor: ModuleDescriptor =
            toml::from_str(&contents).map_err(|e| ProvisionError::LoadError {
                path: path.display().to_string(),
                cause: e.to_string(),
            })?;

        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Validate descriptor invariants
    ///
    /// Self-references are rejected here, at catalog load, never at resolve
    /// time.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.id.is_empty() {
            return Err(ProvisionError::InvalidDescriptor(
                "module id cannot be empty".to_string(),
            ));
        }
        if self.dependencies.iter().any(|d| d == &self.id) {
            return Err(ProvisionError::InvalidDescriptor(format!(
                "module {} depends on itself",
                self.id
            )));
        }
        if self.incompatible_with.iter().any(|d| d == &self.id) {
            return Err(ProvisionError::InvalidDescriptor(format!(
                "module {} declares itself incompatible",
                self.id
            )));
        }
        Ok(())
    }

    /// Whether the module may be provisioned for the given service group
    ///
    /// An empty `service_groups` list means the module is eligible
    /// everywhere.
    pub fn eligible_for_group(&self, service_group: &str) -> bool {
        self.service_groups.is_empty()
            || self.service_groups.iter().any(|g| g == service_group)
    }

    /// Whether this module declares the other module incompatible
    pub fn declares_incompatible(&self, other_id: &str) -> bool {
        self.incompatible_with.iter().any(|m| m == other_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_dependency_is_rejected() {
        let descriptor = ModuleDescriptor::new("shop", vec!["shop".to_string()]);
        assert!(matches!(
            descriptor.validate(),
            Err(ProvisionError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn empty_service_groups_is_universal() {
        let descriptor = ModuleDescriptor::new("shop", vec![]);
        assert!(descriptor.eligible_for_group("pharmacy"));

        let mut scoped = ModuleDescriptor::new("dispensary", vec![]);
        scoped.service_groups = vec!["pharmacy".to_string()];
        assert!(scoped.eligible_for_group("pharmacy"));
        assert!(!scoped.eligible_for_group("cosmetics"));
    }

    #[test]
    fn parses_full_descriptor_toml() {
        let toml = r#"
            id = "groupbuy"
            version = "1.2.0"
            category = "extension"
            dependencies = ["shop", "accounts"]
            incompatible_with = ["legacy-shop"]
            service_groups = ["pharmacy"]
            deprecated = true
            replacement = "groupbuy-v2"
        "#;
        let descriptor: ModuleDescriptor = toml::from_str(toml).unwrap();
        assert_eq!(descriptor.id, "groupbuy");
        assert_eq!(descriptor.category, ModuleCategory::Extension);
        assert_eq!(descriptor.dependencies, vec!["shop", "accounts"]);
        assert!(descriptor.deprecated);
        assert_eq!(descriptor.replacement.as_deref(), Some("groupbuy-v2"));
        assert!(descriptor.validate().is_ok());
    }
}

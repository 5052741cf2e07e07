//! Service templates
//!
//! A template names the module set a deployment starts from: the platform's
//! global core, the template's own core, and optional extensions. Expansion
//! is pure set algebra over those lists; the result is handed to the
//! resolver, never to the orchestrator directly, keeping "what should be
//! installed" separate from "how it gets installed".

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::lifecycle::ProvisionError;

/// A named deployment template (read-only input)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTemplate {
    /// Template id
    pub template_id: String,
    /// Service group this template deploys into
    pub service_group: String,
    /// Platform-wide baseline modules
    #[serde(default)]
    pub global_core_apps: Vec<String>,
    /// Modules every deployment of this template gets
    #[serde(default)]
    pub core_apps: Vec<String>,
    /// Optional extensions offered by this template
    #[serde(default)]
    pub extension_apps: Vec<String>,
}

/// Per-request expansion options
#[derive(Debug, Clone, Default)]
pub struct ExpandOptions {
    /// Include the template's extension apps
    pub include_extensions: bool,
    /// Extra extensions requested beyond the template
    pub additional_extensions: Vec<String>,
    /// Modules to leave out of the expansion
    pub skip: Vec<String>,
}

impl ExpandOptions {
    /// Include the template's extension apps
    pub fn with_extensions(mut self) -> Self {
        self.include_extensions = true;
        self
    }

    /// Request extensions beyond the template's own list
    pub fn with_additional_extensions(mut self, extensions: Vec<String>) -> Self {
        self.additional_extensions = extensions;
        self
    }

    /// Leave the given modules out of the expansion
    pub fn skipping(mut self, skip: Vec<String>) -> Self {
        self.skip = skip;
        self
    }
}

impl ServiceTemplate {
    /// Load a template from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProvisionError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ProvisionError::LoadError {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        let template: ServiceTemplate =
            toml::from_str(&contents).map_err(|e| ProvisionError::LoadError {
                path: path.display().to_string(),
                cause: e.to_string(),
            })?;

        if template.template_id.is_empty() {
            return Err(ProvisionError::LoadError {
                path: path.display().to_string(),
                cause: "template_id cannot be empty".to_string(),
            });
        }
        Ok(template)
    }

    /// Expand the template into the full requested module set
    ///
    /// Ordered union of global core, template core, extensions (when
    /// included), and additional extensions; first occurrence wins, skipped
    /// modules are dropped. Deterministic given identical inputs.
    pub fn expand(&self, options: &ExpandOptions) -> Vec<String> {
        fn push_all(
            apps: &[String],
            skip: &HashSet<&str>,
            seen: &mut HashSet<String>,
            modules: &mut Vec<String>,
        ) {
            for app in apps {
                if skip.contains(app.as_str()) || seen.contains(app) {
                    continue;
                }
                seen.insert(app.clone());
                modules.push(app.clone());
            }
        }

        let skip: HashSet<&str> = options.skip.iter().map(|s| s.as_str()).collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut modules: Vec<String> = Vec::new();

        push_all(&self.global_core_apps, &skip, &mut seen, &mut modules);
        push_all(&self.core_apps, &skip, &mut seen, &mut modules);
        if options.include_extensions {
            push_all(&self.extension_apps, &skip, &mut seen, &mut modules);
        }
        push_all(&options.additional_extensions, &skip, &mut seen, &mut modules);

        debug!(
            "Template {} expanded to {} modules",
            self.template_id,
            modules.len()
        );
        modules
    }
}

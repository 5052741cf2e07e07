//! Module catalog
//!
//! Read-only metadata store mapping module ids to their descriptors. The
//! catalog is an explicitly constructed handle injected into the resolver
//! and orchestrator, so both are testable against fixture catalogs.

pub mod descriptor;

pub use descriptor::{ModuleCategory, ModuleDescriptor};

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::lifecycle::ProvisionError;

/// Read-only module metadata store
///
/// Built once at startup (from descriptors or a catalog directory), then
/// shared immutably. Provisioning never mutates the catalog.
#[derive(Debug, Default)]
pub struct ModuleCatalog {
    modules: HashMap<String, ModuleDescriptor>,
}

impl ModuleCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of descriptors
    ///
    /// Fails on the first invalid or duplicate descriptor.
    pub fn from_descriptors(
        descriptors: Vec<ModuleDescriptor>,
    ) -> Result<Self, ProvisionError> {
        let mut catalog = Self::new();
        for descriptor in descriptors {
            catalog.insert(descriptor)?;
        }
        Ok(catalog)
    }

    /// Insert a descriptor, validating its invariants first
    pub fn insert(&mut self, descriptor: ModuleDescriptor) -> Result<(), ProvisionError> {
        descriptor.validate()?;
        if self.modules.contains_key(&descriptor.id) {
            return Err(ProvisionError::InvalidDescriptor(format!(
                "duplicate module id: {}",
                descriptor.id
            )));
        }
        debug!("Catalog entry added: {}", descriptor.id);
        self.modules.insert(descriptor.id.clone(), descriptor);
        Ok(())
    }

    /// Look up a module descriptor
    pub fn get(&self, module_id: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(module_id)
    }

    /// Whether the catalog knows the module
    pub fn contains(&self, module_id: &str) -> bool {
        self.modules.contains_key(module_id)
    }

    /// All module ids in the catalog
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(|s| s.as_str())
    }

    /// Number of catalog entries
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Load a catalog from a directory
    ///
    /// Scans each subdirectory for a `module.toml` descriptor. Entries that
    /// fail to parse or validate are rejected with a warning and the scan
    /// continues; a rejected entry never enters the catalog.
    pub fn load_dir<P: AsRef<Path>>(catalog_dir: P) -> Result<Self, ProvisionError> {
        let catalog_dir = catalog_dir.as_ref();
        info!("Loading module catalog from {:?}", catalog_dir);

        let entries = fs::read_dir(catalog_dir).map_err(|e| ProvisionError::LoadError {
            path: catalog_dir.display().to_string(),
            cause: e.to_string(),
        })?;

        let mut catalog = Self::new();
        for entry in entries {
            let entry = entry.map_err(|e| ProvisionError::LoadError {
                path: catalog_dir.display().to_string(),
                cause: e.to_string(),
            })?;

            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let descriptor_path = path.join("module.toml");
            if !descriptor_path.exists() {
                debug!("No module.toml found in {:?}, skipping", path);
                continue;
            }

            match ModuleDescriptor::from_file(&descriptor_path) {
                Ok(descriptor) => {
                    if let Err(e) = catalog.insert(descriptor) {
                        warn!("Rejected catalog entry in {:?}: {}", path, e);
                    }
                }
                Err(e) => {
                    warn!("Failed to load descriptor in {:?}: {}", path, e);
                }
            }
        }

        info!("Loaded {} catalog entries", catalog.len());
        Ok(catalog)
    }
}

//! Hook registry
//!
//! Maps module ids to their lifecycle hook implementations. Modules without
//! a registered implementation get no-op hooks.

use std::collections::HashMap;
use std::sync::Arc;

use crate::lifecycle::traits::ModuleLifecycle;

/// Registry of per-module lifecycle hooks
///
/// Built once at startup, then shared read-only with the orchestrator.
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<String, Arc<dyn ModuleLifecycle>>,
}

impl HookRegistry {
    /// Create an empty hook registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the lifecycle implementation for a module
    ///
    /// Replaces any previously registered implementation for the same id.
    pub fn register(
        &mut self,
        module_id: impl Into<String>,
        hooks: Arc<dyn ModuleLifecycle>,
    ) -> &mut Self {
        self.hooks.insert(module_id.into(), hooks);
        self
    }

    /// Look up the hooks for a module, if any were registered
    pub fn get(&self, module_id: &str) -> Option<Arc<dyn ModuleLifecycle>> {
        self.hooks.get(module_id).cloned()
    }

    /// Number of registered hook implementations
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hooks are registered
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("modules", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

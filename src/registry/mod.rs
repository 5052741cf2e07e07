//! Module registry
//!
//! Tracks the lifecycle state of every module that has ever been touched on
//! a tenant. Entries are created on first use and never removed; uninstall
//! returns a module to `NotInstalled` so installation history stays
//! inspectable.
//!
//! Each entry sits behind its own lock so one module's transition never
//! blocks reads or transitions of unrelated modules. All mutation goes
//! through the orchestrator.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::lifecycle::ModuleState;
use crate::utils::time::current_timestamp;

/// Per-module registry record
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// Module id this entry tracks
    pub module_id: String,
    /// Current lifecycle state
    pub state: ModuleState,
    /// Unix timestamp of the first successful install, if any
    pub installed_at: Option<u64>,
    /// Last error observed for this module, if any
    pub last_error: Option<String>,
}

impl RegistryEntry {
    fn new(module_id: String) -> Self {
        Self {
            module_id,
            state: ModuleState::NotInstalled,
            installed_at: None,
            last_error: None,
        }
    }

    /// Record a successful install
    pub fn mark_installed(&mut self) {
        self.state = ModuleState::Installed;
        self.installed_at = Some(current_timestamp());
        self.last_error = None;
    }

    /// Record a failure without changing state
    pub fn record_error(&mut self, error: impl std::fmt::Display) {
        self.last_error = Some(error.to_string());
    }
}

/// Registry of module lifecycle states, keyed by module id
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    entries: RwLock<HashMap<String, Arc<Mutex<RegistryEntry>>>>,
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for a module, creating a `NotInstalled` one on first use
    pub async fn entry(&self, module_id: &str) -> Arc<Mutex<RegistryEntry>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(module_id) {
                return Arc::clone(entry);
            }
        }

        let mut entries = self.entries.write().await;
        Arc::clone(entries.entry(module_id.to_string()).or_insert_with(|| {
            debug!("Registry entry created: {}", module_id);
            Arc::new(Mutex::new(RegistryEntry::new(module_id.to_string())))
        }))
    }

    /// Current state of a module (`NotInstalled` if never touched)
    pub async fn state(&self, module_id: &str) -> ModuleState {
        let entries = self.entries.read().await;
        match entries.get(module_id) {
            Some(entry) => entry.lock().await.state,
            None => ModuleState::NotInstalled,
        }
    }

    /// Ids of all modules currently installed in any form
    pub async fn installed_modules(&self) -> Vec<String> {
        self.modules_in(|state| state.is_installed()).await
    }

    /// Ids of all currently active modules
    pub async fn active_modules(&self) -> Vec<String> {
        self.modules_in(|state| state == ModuleState::Active).await
    }

    /// Snapshot of every tracked module and its state
    pub async fn snapshot(&self) -> HashMap<String, ModuleState> {
        let entries = self.entries.read().await;
        let mut snapshot = HashMap::with_capacity(entries.len());
        for (id, entry) in entries.iter() {
            snapshot.insert(id.clone(), entry.lock().await.state);
        }
        snapshot
    }

    async fn modules_in(&self, predicate: impl Fn(ModuleState) -> bool) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut matching = Vec::new();
        for (id, entry) in entries.iter() {
            if predicate(entry.lock().await.state) {
                matching.push(id.clone());
            }
        }
        matching.sort();
        matching
    }
}

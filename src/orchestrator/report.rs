//! Provisioning reports
//!
//! Structured outcomes of one orchestration run. Reports are produced fresh
//! per request, accumulate per-module results while the batch runs, and are
//! immutable once returned to the caller.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::lifecycle::ProvisionError;

/// A module that failed during a batch, with its typed error
#[derive(Debug)]
pub struct FailedModule {
    /// Module that failed
    pub module_id: String,
    /// What went wrong
    pub error: ProvisionError,
}

impl Serialize for FailedModule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("FailedModule", 3)?;
        s.serialize_field("module_id", &self.module_id)?;
        s.serialize_field("kind", self.error.kind())?;
        s.serialize_field("message", &self.error.to_string())?;
        s.end()
    }
}

/// Outcome of one provisioning (installation) run
#[derive(Debug, Serialize)]
pub struct ProvisioningReport {
    /// Provisioning run id
    pub run_id: Uuid,
    /// Installation order the resolver produced
    pub resolved_order: Vec<String>,
    /// Modules that reached `Active` during this run
    pub installed: Vec<String>,
    /// Modules skipped because they were already installed
    pub skipped: Vec<String>,
    /// Modules that failed, with their errors; the batch continued past each
    pub failed: Vec<FailedModule>,
}

impl ProvisioningReport {
    /// Create an empty report for a run
    pub fn new(run_id: Uuid, resolved_order: Vec<String>) -> Self {
        Self {
            run_id,
            resolved_order,
            installed: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Whether every processed module succeeded
    pub fn is_full_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of one deprovisioning (removal) run
#[derive(Debug, Serialize)]
pub struct DeprovisionReport {
    /// Provisioning run id
    pub run_id: Uuid,
    /// Modules uninstalled during this run
    pub removed: Vec<String>,
    /// Modules skipped because they were not installed
    pub skipped: Vec<String>,
    /// Modules that failed, with their errors; the batch continued past each
    pub failed: Vec<FailedModule>,
}

impl DeprovisionReport {
    /// Create an empty report for a run
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            removed: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }
}

//! Lifecycle states, transitions, and the module hook interface
//!
//! Defines the core types modules and the orchestrator use to communicate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Module lifecycle state
///
/// Entries never leave the registry; an uninstalled module returns to
/// `NotInstalled` so its history stays inspectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// Module is not installed (initial state, and the state after uninstall)
    NotInstalled,
    /// Module is installed but not yet activated
    Installed,
    /// Module is installed and active
    Active,
    /// Module is installed but deactivated
    Inactive,
}

impl ModuleState {
    /// Whether the module is present on the tenant in any form
    pub fn is_installed(&self) -> bool {
        !matches!(self, ModuleState::NotInstalled)
    }
}

impl std::fmt::Display for ModuleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ModuleState::NotInstalled => "not-installed",
            ModuleState::Installed => "installed",
            ModuleState::Active => "active",
            ModuleState::Inactive => "inactive",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle transition attempted on a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Install,
    Activate,
    Deactivate,
    Uninstall,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Transition::Install => "install",
            Transition::Activate => "activate",
            Transition::Deactivate => "deactivate",
            Transition::Uninstall => "uninstall",
        };
        write!(f, "{}", s)
    }
}

/// Provisioning errors
///
/// Resolution errors (`CyclicDependency`, `MissingDependency`) are fatal for
/// a whole batch: no coherent order exists, so nothing is installed. All
/// other variants are scoped to a single module and accumulate in the
/// provisioning report while the batch continues.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("circular dependency involving: {}", .0.join(", "))]
    CyclicDependency(Vec<String>),

    #[error("missing dependency: {0}")]
    MissingDependency(String),

    #[error("module {0} is not in the catalog")]
    UnknownModule(String),

    #[error("modules {0} and {1} are incompatible")]
    IncompatibleModules(String, String),

    #[error("cannot {attempted} module {module} while {from}")]
    InvalidTransition {
        module: String,
        from: ModuleState,
        attempted: Transition,
    },

    #[error("{transition} hook failed for module {module}: {cause}")]
    HookFailure {
        module: String,
        transition: Transition,
        cause: String,
    },

    #[error("{transition} hook timed out for module {module}")]
    HookTimeout {
        module: String,
        transition: Transition,
    },

    #[error("dependency {dependency} of module {module} is not installed")]
    DependencyNotInstalled { module: String, dependency: String },

    #[error("module {module} is still required by: {}", .dependents.join(", "))]
    RequiredByDependents {
        module: String,
        dependents: Vec<String>,
    },

    #[error("module {module} is not eligible for service group {service_group}")]
    ServiceGroupNotEligible {
        module: String,
        service_group: String,
    },

    #[error("invalid module descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to load {path}: {cause}")]
    LoadError { path: String, cause: String },
}

impl ProvisionError {
    /// Stable machine-readable error kind for reports and logs
    pub fn kind(&self) -> &'static str {
        match self {
            ProvisionError::CyclicDependency(_) => "cyclic_dependency",
            ProvisionError::MissingDependency(_) => "missing_dependency",
            ProvisionError::UnknownModule(_) => "unknown_module",
            ProvisionError::IncompatibleModules(_, _) => "incompatible_modules",
            ProvisionError::InvalidTransition { .. } => "invalid_transition",
            ProvisionError::HookFailure { .. } => "hook_failure",
            ProvisionError::HookTimeout { .. } => "hook_timeout",
            ProvisionError::DependencyNotInstalled { .. } => "dependency_not_installed",
            ProvisionError::RequiredByDependents { .. } => "required_by_dependents",
            ProvisionError::ServiceGroupNotEligible { .. } => "service_group_not_eligible",
            ProvisionError::InvalidDescriptor(_) => "invalid_descriptor",
            ProvisionError::InvalidConfig(_) => "invalid_config",
            ProvisionError::LoadError { .. } => "load_error",
        }
    }

    /// Whether this error aborts a whole provisioning batch
    ///
    /// Only resolution errors are fatal; module-scoped errors are recorded
    /// in the report and the batch continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProvisionError::CyclicDependency(_) | ProvisionError::MissingDependency(_)
        )
    }
}

/// Context handed to every lifecycle hook invocation
///
/// Carries the identity of the module and tenant being provisioned plus the
/// environment map from the provisioner configuration. The hook
/// implementation owns whatever else it needs.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Module being transitioned
    pub module_id: String,
    /// Tenant the provisioning run targets
    pub tenant_id: String,
    /// Provisioning run this invocation belongs to
    pub run_id: Uuid,
    /// Environment values (key-value pairs from provisioner config)
    pub environment: HashMap<String, String>,
}

impl HookContext {
    /// Create a new hook context
    pub fn new(
        module_id: String,
        tenant_id: String,
        run_id: Uuid,
        environment: HashMap<String, String>,
    ) -> Self {
        Self {
            module_id,
            tenant_id,
            run_id,
            environment,
        }
    }

    /// Get an environment value
    pub fn env(&self, key: &str) -> Option<&String> {
        self.environment.get(key)
    }

    /// Get an environment value with default
    pub fn env_or(&self, key: &str, default: &str) -> String {
        self.environment
            .get(key)
            .map(|s| s.as_str())
            .unwrap_or(default)
            .to_string()
    }
}

/// Lifecycle hooks a module may supply
///
/// Implemented once per module and registered in a [`HookRegistry`]. Every
/// hook defaults to a no-op, so modules implement only the transitions they
/// care about. Hooks report failure through `anyhow::Result`; the
/// orchestrator converts causes into typed [`ProvisionError`] values and
/// never lets them abort sibling installations.
///
/// [`HookRegistry`]: crate::lifecycle::HookRegistry
#[async_trait]
pub trait ModuleLifecycle: Send + Sync {
    /// Invoked when the module is installed for a tenant
    async fn on_install(&self, ctx: &HookContext) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Invoked when the module is activated
    async fn on_activate(&self, ctx: &HookContext) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Invoked when the module is deactivated
    async fn on_deactivate(&self, ctx: &HookContext) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Invoked when the module is uninstalled
    async fn on_uninstall(&self, ctx: &HookContext) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display_is_stable() {
        assert_eq!(ModuleState::NotInstalled.to_string(), "not-installed");
        assert_eq!(ModuleState::Active.to_string(), "active");
    }

    #[test]
    fn fatal_errors_are_resolution_errors_only() {
        assert!(ProvisionError::CyclicDependency(vec!["a".into()]).is_fatal());
        assert!(ProvisionError::MissingDependency("b".into()).is_fatal());
        assert!(!ProvisionError::HookFailure {
            module: "a".into(),
            transition: Transition::Install,
            cause: "boom".into(),
        }
        .is_fatal());
    }

    #[test]
    fn context_env_lookup() {
        let mut env = HashMap::new();
        env.insert("region".to_string(), "eu-west".to_string());
        let ctx = HookContext::new("shop".into(), "tenant-1".into(), Uuid::new_v4(), env);

        assert_eq!(ctx.env("region"), Some(&"eu-west".to_string()));
        assert_eq!(ctx.env_or("missing", "default"), "default");
    }
}

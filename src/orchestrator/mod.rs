//! Lifecycle orchestrator
//!
//! Drives modules through install, activate, deactivate, and uninstall,
//! running lifecycle hooks and recording every outcome in the registry.
//!
//! Transitions are serialized per module id: a keyed guard is held for the
//! whole transition so two concurrent provisioning requests cannot race one
//! module, while the registry entry lock itself is held only to validate and
//! record state, never across a hook call. Batches over disjoint module sets
//! proceed fully in parallel.
//!
//! Batch operations are deliberately best-effort: a failed module is
//! recorded and the batch continues, so one broken hook never aborts
//! unrelated work. No retries happen here; a failed module stays in its last
//! valid state and retry policy belongs to the caller.

pub mod compat;
pub mod report;

pub use compat::CompatibilityChecker;
pub use report::{DeprovisionReport, FailedModule, ProvisioningReport};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::catalog::ModuleCatalog;
use crate::lifecycle::{HookContext, HookRegistry, ModuleState, ProvisionError, Transition};
use crate::registry::ModuleRegistry;
use crate::utils::timeout::{with_custom_timeout, DEFAULT_HOOK_TIMEOUT};

/// Identity and environment of one provisioning run
#[derive(Debug, Clone)]
pub struct ProvisionContext {
    /// Tenant the run targets
    pub tenant_id: String,
    /// Unique id for this run
    pub run_id: Uuid,
    /// Service group eligibility is checked against, if any
    pub service_group: Option<String>,
    /// Environment values handed to every hook
    pub environment: HashMap<String, String>,
}

impl ProvisionContext {
    /// Create a context for a tenant with a fresh run id
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            run_id: Uuid::new_v4(),
            service_group: None,
            environment: HashMap::new(),
        }
    }

    /// Restrict provisioning to modules eligible for a service group
    pub fn with_service_group(mut self, service_group: impl Into<String>) -> Self {
        self.service_group = Some(service_group.into());
        self
    }

    /// Attach environment values for hook invocations
    pub fn with_environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    fn hook_context(&self, module_id: &str) -> HookContext {
        HookContext::new(
            module_id.to_string(),
            self.tenant_id.clone(),
            self.run_id,
            self.environment.clone(),
        )
    }
}

/// Orchestrates module lifecycle transitions against the registry
pub struct Orchestrator {
    catalog: Arc<ModuleCatalog>,
    registry: Arc<ModuleRegistry>,
    hooks: Arc<HookRegistry>,
    context: ProvisionContext,
    hook_timeout: Duration,
    /// Per-module transition guards (created on first use)
    transition_guards: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(
        catalog: Arc<ModuleCatalog>,
        registry: Arc<ModuleRegistry>,
        hooks: Arc<HookRegistry>,
        context: ProvisionContext,
    ) -> Self {
        Self {
            catalog,
            registry,
            hooks,
            context,
            hook_timeout: DEFAULT_HOOK_TIMEOUT,
            transition_guards: Mutex::new(HashMap::new()),
        }
    }

    /// Override the per-hook timeout
    pub fn with_hook_timeout(mut self, timeout: Duration) -> Self {
        self.hook_timeout = timeout;
        self
    }

    /// Install a module
    ///
    /// Requires `NotInstalled`. Re-checks dependencies against the registry
    /// even though the resolver already ordered them, because registry state
    /// can diverge from the resolver snapshot (a dependency may have failed
    /// its own install, or been deactivated concurrently).
    pub async fn install(&self, module_id: &str) -> Result<(), ProvisionError> {
        let _transition = self.transition_guard(module_id).await;

        let descriptor = self
            .catalog
            .get(module_id)
            .ok_or_else(|| ProvisionError::UnknownModule(module_id.to_string()))?;

        let entry = self.registry.entry(module_id).await;
        {
            let e = entry.lock().await;
            if e.state != ModuleState::NotInstalled {
                return Err(ProvisionError::InvalidTransition {
                    module: module_id.to_string(),
                    from: e.state,
                    attempted: Transition::Install,
                });
            }
        }

        if let Some(service_group) = &self.context.service_group {
            if !descriptor.eligible_for_group(service_group) {
                let err = ProvisionError::ServiceGroupNotEligible {
                    module: module_id.to_string(),
                    service_group: service_group.clone(),
                };
                entry.lock().await.record_error(&err);
                return Err(err);
            }
        }

        for dependency in &descriptor.dependencies {
            if !self.registry.state(dependency).await.is_installed() {
                let err = ProvisionError::DependencyNotInstalled {
                    module: module_id.to_string(),
                    dependency: dependency.clone(),
                };
                entry.lock().await.record_error(&err);
                return Err(err);
            }
        }

        if descriptor.deprecated {
            match &descriptor.replacement {
                Some(replacement) => warn!(
                    "Installing deprecated module {} (replacement: {})",
                    module_id, replacement
                ),
                None => warn!("Installing deprecated module {}", module_id),
            }
        }

        if let Err(err) = self.run_hook(module_id, Transition::Install).await {
            entry.lock().await.record_error(&err);
            return Err(err);
        }

        entry.lock().await.mark_installed();
        info!("Module {} installed", module_id);
        Ok(())
    }

    /// Activate an installed module
    ///
    /// Requires `Installed` or `Inactive`. Consults the compatibility
    /// checker against the currently active set; an incompatible pair
    /// blocks activation but leaves the module installed, awaiting manual
    /// resolution.
    pub async fn activate(&self, module_id: &str) -> Result<(), ProvisionError> {
        let _transition = self.transition_guard(module_id).await;

        let entry = self.registry.entry(module_id).await;
        {
            let e = entry.lock().await;
            if !matches!(e.state, ModuleState::Installed | ModuleState::Inactive) {
                return Err(ProvisionError::InvalidTransition {
                    module: module_id.to_string(),
                    from: e.state,
                    attempted: Transition::Activate,
                });
            }
        }

        let active = self.registry.active_modules().await;
        let checker = CompatibilityChecker::new(&self.catalog);
        if let Err(err) = checker.check(module_id, &active) {
            entry.lock().await.record_error(&err);
            return Err(err);
        }

        if let Err(err) = self.run_hook(module_id, Transition::Activate).await {
            entry.lock().await.record_error(&err);
            return Err(err);
        }

        {
            let mut e = entry.lock().await;
            e.state = ModuleState::Active;
            e.last_error = None;
        }
        info!("Module {} activated", module_id);
        Ok(())
    }

    /// Deactivate an active module
    pub async fn deactivate(&self, module_id: &str) -> Result<(), ProvisionError> {
        let _transition = self.transition_guard(module_id).await;

        let entry = self.registry.entry(module_id).await;
        {
            let e = entry.lock().await;
            if e.state != ModuleState::Active {
                return Err(ProvisionError::InvalidTransition {
                    module: module_id.to_string(),
                    from: e.state,
                    attempted: Transition::Deactivate,
                });
            }
        }

        if let Err(err) = self.run_hook(module_id, Transition::Deactivate).await {
            entry.lock().await.record_error(&err);
            return Err(err);
        }

        {
            let mut e = entry.lock().await;
            e.state = ModuleState::Inactive;
            e.last_error = None;
        }
        info!("Module {} deactivated", module_id);
        Ok(())
    }

    /// Uninstall a module
    ///
    /// Legal from `Installed` or `Inactive`; an `Active` module must be
    /// deactivated first. Refuses while another installed module still
    /// declares this one as a dependency. The registry entry survives with
    /// state `NotInstalled`.
    pub async fn uninstall(&self, module_id: &str) -> Result<(), ProvisionError> {
        let _transition = self.transition_guard(module_id).await;

        let entry = self.registry.entry(module_id).await;
        {
            let e = entry.lock().await;
            if !matches!(e.state, ModuleState::Installed | ModuleState::Inactive) {
                return Err(ProvisionError::InvalidTransition {
                    module: module_id.to_string(),
                    from: e.state,
                    attempted: Transition::Uninstall,
                });
            }
        }

        let mut dependents = Vec::new();
        for installed in self.registry.installed_modules().await {
            if installed == module_id {
                continue;
            }
            if let Some(descriptor) = self.catalog.get(&installed) {
                if descriptor.dependencies.iter().any(|d| d == module_id) {
                    dependents.push(installed);
                }
            }
        }
        if !dependents.is_empty() {
            let err = ProvisionError::RequiredByDependents {
                module: module_id.to_string(),
                dependents,
            };
            entry.lock().await.record_error(&err);
            return Err(err);
        }

        if let Err(err) = self.run_hook(module_id, Transition::Uninstall).await {
            entry.lock().await.record_error(&err);
            return Err(err);
        }

        {
            let mut e = entry.lock().await;
            e.state = ModuleState::NotInstalled;
            e.last_error = None;
        }
        info!("Module {} uninstalled", module_id);
        Ok(())
    }

    /// Install and activate every module in the given order
    ///
    /// Already-installed modules are skipped with no side effect, so
    /// re-provisioning is idempotent. A failed module is recorded and the
    /// batch continues; its dependents fail the dependency re-check with an
    /// attributable error instead of silently half-installing. The
    /// cancellation token is checked between modules; on cancellation the
    /// partial report is returned as-is.
    pub async fn install_all<S: AsRef<str>>(
        &self,
        order: &[S],
        cancel: &CancellationToken,
    ) -> ProvisioningReport {
        let resolved_order: Vec<String> =
            order.iter().map(|s| s.as_ref().to_string()).collect();
        let mut report = ProvisioningReport::new(self.context.run_id, resolved_order);

        info!(
            "Provisioning run {} for tenant {}: {} modules",
            self.context.run_id,
            self.context.tenant_id,
            order.len()
        );

        for module_id in order {
            let module_id = module_id.as_ref();

            if cancel.is_cancelled() {
                warn!(
                    "Provisioning run {} cancelled; {} modules not processed",
                    self.context.run_id,
                    order.len() - (report.installed.len() + report.skipped.len() + report.failed.len())
                );
                break;
            }

            if self.registry.state(module_id).await.is_installed() {
                debug!("Module {} already installed, skipping", module_id);
                report.skipped.push(module_id.to_string());
                continue;
            }

            let outcome = match self.install(module_id).await {
                Ok(()) => self.activate(module_id).await,
                Err(err) => Err(err),
            };

            match outcome {
                Ok(()) => report.installed.push(module_id.to_string()),
                Err(error) => {
                    warn!("Module {} failed to provision: {}", module_id, error);
                    report.failed.push(FailedModule {
                        module_id: module_id.to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            "Provisioning run {} finished: {} installed, {} skipped, {} failed",
            self.context.run_id,
            report.installed.len(),
            report.skipped.len(),
            report.failed.len()
        );
        report
    }

    /// Deactivate and uninstall every module in the given removal order
    ///
    /// Callers pass the reverse of the installation order so dependents are
    /// removed before their dependencies. Active modules are deactivated
    /// first; modules that are not installed are skipped. Failures
    /// accumulate and the batch continues.
    pub async fn deprovision_all<S: AsRef<str>>(
        &self,
        removal_order: &[S],
        cancel: &CancellationToken,
    ) -> DeprovisionReport {
        let mut report = DeprovisionReport::new(self.context.run_id);

        info!(
            "Deprovisioning run {} for tenant {}: {} modules",
            self.context.run_id,
            self.context.tenant_id,
            removal_order.len()
        );

        for module_id in removal_order {
            let module_id = module_id.as_ref();

            if cancel.is_cancelled() {
                warn!("Deprovisioning run {} cancelled", self.context.run_id);
                break;
            }

            let state = self.registry.state(module_id).await;
            if state == ModuleState::NotInstalled {
                debug!("Module {} not installed, skipping", module_id);
                report.skipped.push(module_id.to_string());
                continue;
            }

            if state == ModuleState::Active {
                if let Err(error) = self.deactivate(module_id).await {
                    warn!("Module {} failed to deactivate: {}", module_id, error);
                    report.failed.push(FailedModule {
                        module_id: module_id.to_string(),
                        error,
                    });
                    continue;
                }
            }

            match self.uninstall(module_id).await {
                Ok(()) => report.removed.push(module_id.to_string()),
                Err(error) => {
                    warn!("Module {} failed to uninstall: {}", module_id, error);
                    report.failed.push(FailedModule {
                        module_id: module_id.to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            "Deprovisioning run {} finished: {} removed, {} skipped, {} failed",
            self.context.run_id,
            report.removed.len(),
            report.skipped.len(),
            report.failed.len()
        );
        report
    }

    /// Run one lifecycle hook under the configured timeout
    ///
    /// Modules without registered hooks transition silently. Hook errors and
    /// timeouts are logged with full context and converted into typed
    /// failures; they never propagate as panics.
    async fn run_hook(
        &self,
        module_id: &str,
        transition: Transition,
    ) -> Result<(), ProvisionError> {
        let Some(hooks) = self.hooks.get(module_id) else {
            debug!("No hooks registered for {}, {} is a no-op", module_id, transition);
            return Ok(());
        };

        let ctx = self.context.hook_context(module_id);
        let invocation = async {
            match transition {
                Transition::Install => hooks.on_install(&ctx).await,
                Transition::Activate => hooks.on_activate(&ctx).await,
                Transition::Deactivate => hooks.on_deactivate(&ctx).await,
                Transition::Uninstall => hooks.on_uninstall(&ctx).await,
            }
        };

        match with_custom_timeout(invocation, self.hook_timeout).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(cause)) => {
                error!(
                    "{} hook failed for module {}: {:#}",
                    transition, module_id, cause
                );
                Err(ProvisionError::HookFailure {
                    module: module_id.to_string(),
                    transition,
                    cause: format!("{:#}", cause),
                })
            }
            Err(_) => {
                error!(
                    "{} hook for module {} did not finish within {:?}",
                    transition, module_id, self.hook_timeout
                );
                Err(ProvisionError::HookTimeout {
                    module: module_id.to_string(),
                    transition,
                })
            }
        }
    }

    /// Acquire the transition guard for a module
    async fn transition_guard(&self, module_id: &str) -> OwnedMutexGuard<()> {
        let guard = {
            let mut guards = self.transition_guards.lock().await;
            Arc::clone(guards.entry(module_id.to_string()).or_default())
        };
        guard.lock_owned().await
    }
}

//! Multi-tenant module provisioning core
//!
//! This crate installs, activates, and de-activates capability modules for a
//! tenant, subject to declared dependencies, mutual incompatibilities, and
//! per-service-group eligibility. It provides the dependency resolver and
//! the lifecycle orchestrator; everything around them (module packaging,
//! persistence of business entities, HTTP surfaces, billing) belongs to
//! collaborators that expose only the interfaces this core needs.
//!
//! ## Architecture
//!
//! - **Catalog**: read-only module metadata (dependencies,
//!   incompatibilities, service groups), injected wherever it is read
//! - **Resolver**: pure dependency-closure walk producing a deterministic,
//!   cycle-free installation order
//! - **Registry**: lifecycle state per module, one lock per entry
//! - **Orchestrator**: drives install/activate/deactivate/uninstall with
//!   hook execution, accumulating per-module failures instead of aborting
//!   the batch
//! - **Templates**: pure expansion of a deployment template into the
//!   requested module set
//!
//! Resolution failures (cycles, missing dependencies) are fatal for a
//! provisioning request: no order exists, so nothing is installed. Every
//! other failure is scoped to its module and reported in the provisioning
//! report while unrelated modules proceed.

pub mod catalog;
pub mod config;
pub mod lifecycle;
pub mod orchestrator;
pub mod registry;
pub mod resolver;
pub mod template;
pub mod utils;

pub use catalog::{ModuleCatalog, ModuleCategory, ModuleDescriptor};
pub use config::ProvisionerConfig;
pub use lifecycle::{
    HookContext, HookRegistry, ModuleLifecycle, ModuleState, ProvisionError, Transition,
};
pub use orchestrator::{
    CompatibilityChecker, DeprovisionReport, FailedModule, Orchestrator, ProvisionContext,
    ProvisioningReport,
};
pub use registry::{ModuleRegistry, RegistryEntry};
pub use resolver::{DependencyResolver, ResolutionResult};
pub use template::{ExpandOptions, ServiceTemplate};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Provisioning entry point
///
/// Owns the catalog, registry, and hook registry, and runs whole
/// provisioning requests: template expansion, dependency resolution, and
/// orchestration. One `Provisioner` serves many tenants; each request gets
/// its own run id and orchestrator.
pub struct Provisioner {
    catalog: Arc<ModuleCatalog>,
    registry: Arc<ModuleRegistry>,
    hooks: Arc<HookRegistry>,
    config: ProvisionerConfig,
}

impl Provisioner {
    /// Create a provisioner with a fresh registry
    pub fn new(catalog: ModuleCatalog, hooks: HookRegistry, config: ProvisionerConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            registry: Arc::new(ModuleRegistry::new()),
            hooks: Arc::new(hooks),
            config,
        }
    }

    /// The module catalog
    pub fn catalog(&self) -> &Arc<ModuleCatalog> {
        &self.catalog
    }

    /// The module registry
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Provision a tenant from a service template
    ///
    /// Expands the template, resolves the installation order, and installs
    /// and activates every module in it. Returns the fatal resolution error
    /// (cycle or missing dependency) with nothing installed when no coherent
    /// order exists; otherwise always returns a report, with per-module
    /// failures enumerated.
    pub async fn provision(
        &self,
        template: &ServiceTemplate,
        tenant_id: &str,
        options: &ExpandOptions,
        cancel: &CancellationToken,
    ) -> Result<ProvisioningReport, ProvisionError> {
        let requested = template.expand(options);
        info!(
            "Provisioning template {} for tenant {} ({} modules requested)",
            template.template_id,
            tenant_id,
            requested.len()
        );

        let context = ProvisionContext::new(tenant_id)
            .with_service_group(template.service_group.clone())
            .with_environment(self.config.environment.clone());
        self.run(&requested, context, cancel).await
    }

    /// Provision directly named modules, without a template
    pub async fn install_modules<S: AsRef<str>>(
        &self,
        modules: &[S],
        tenant_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ProvisioningReport, ProvisionError> {
        let requested: Vec<String> = modules.iter().map(|m| m.as_ref().to_string()).collect();
        let context = ProvisionContext::new(tenant_id)
            .with_environment(self.config.environment.clone());
        self.run(&requested, context, cancel).await
    }

    /// Remove the named modules and their dependency closure
    ///
    /// Walks the reverse of the installation order so dependents are
    /// removed before their dependencies. Modules still required by other
    /// installed modules fail with `RequiredByDependents` and stay
    /// installed.
    pub async fn deprovision<S: AsRef<str>>(
        &self,
        modules: &[S],
        tenant_id: &str,
        cancel: &CancellationToken,
    ) -> Result<DeprovisionReport, ProvisionError> {
        let requested: Vec<String> = modules.iter().map(|m| m.as_ref().to_string()).collect();
        let resolution = DependencyResolver::new(&self.catalog).resolve(&requested);
        if let Some(err) = resolution.to_error() {
            error!("Resolution failed for tenant {}: {}", tenant_id, err);
            return Err(err);
        }

        let context = ProvisionContext::new(tenant_id)
            .with_environment(self.config.environment.clone());
        let orchestrator = self.orchestrator(context);
        Ok(orchestrator
            .deprovision_all(&resolution.uninstall_order(), cancel)
            .await)
    }

    async fn run(
        &self,
        requested: &[String],
        context: ProvisionContext,
        cancel: &CancellationToken,
    ) -> Result<ProvisioningReport, ProvisionError> {
        let resolution = DependencyResolver::new(&self.catalog).resolve(requested);
        if let Some(err) = resolution.to_error() {
            error!(
                "Resolution failed for tenant {}: {}",
                context.tenant_id, err
            );
            return Err(err);
        }

        let orchestrator = self.orchestrator(context);
        Ok(orchestrator
            .install_all(&resolution.install_order, cancel)
            .await)
    }

    fn orchestrator(&self, context: ProvisionContext) -> Orchestrator {
        Orchestrator::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.registry),
            Arc::clone(&self.hooks),
            context,
        )
        .with_hook_timeout(self.config.hook_timeout())
    }
}

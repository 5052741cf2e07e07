//! Shared fixtures for provisioning tests
//!
//! Provides catalog builders and scripted lifecycle hook implementations
//! (recording, failing, slow, cancelling) used across the test suite.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use app_provisioner::{
    HookContext, HookRegistry, ModuleCatalog, ModuleDescriptor, ModuleLifecycle, ModuleRegistry,
    Orchestrator, ProvisionContext,
};

/// Build a catalog from (id, dependencies) pairs
pub fn catalog(entries: &[(&str, &[&str])]) -> ModuleCatalog {
    let descriptors = entries
        .iter()
        .map(|(id, deps)| ModuleDescriptor::new(*id, deps.iter().map(|d| d.to_string()).collect()))
        .collect();
    ModuleCatalog::from_descriptors(descriptors).unwrap()
}

/// Records every hook invocation as "transition:module"
#[derive(Clone, Default)]
pub struct RecordingHooks {
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, transition: &str, ctx: &HookContext) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", transition, ctx.module_id));
    }
}

#[async_trait]
impl ModuleLifecycle for RecordingHooks {
    async fn on_install(&self, ctx: &HookContext) -> anyhow::Result<()> {
        self.record("install", ctx);
        Ok(())
    }

    async fn on_activate(&self, ctx: &HookContext) -> anyhow::Result<()> {
        self.record("activate", ctx);
        Ok(())
    }

    async fn on_deactivate(&self, ctx: &HookContext) -> anyhow::Result<()> {
        self.record("deactivate", ctx);
        Ok(())
    }

    async fn on_uninstall(&self, ctx: &HookContext) -> anyhow::Result<()> {
        self.record("uninstall", ctx);
        Ok(())
    }
}

/// Fails its install hook with the given message
pub struct FailingInstall {
    pub message: &'static str,
}

#[async_trait]
impl ModuleLifecycle for FailingInstall {
    async fn on_install(&self, _ctx: &HookContext) -> anyhow::Result<()> {
        Err(anyhow::anyhow!(self.message))
    }
}

/// Fails its activate hook with the given message
pub struct FailingActivate {
    pub message: &'static str,
}

#[async_trait]
impl ModuleLifecycle for FailingActivate {
    async fn on_activate(&self, _ctx: &HookContext) -> anyhow::Result<()> {
        Err(anyhow::anyhow!(self.message))
    }
}

/// Sleeps through its install hook (for timeout tests)
pub struct SlowInstall {
    pub delay: Duration,
}

#[async_trait]
impl ModuleLifecycle for SlowInstall {
    async fn on_install(&self, _ctx: &HookContext) -> anyhow::Result<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Cancels the shared token during its install hook
pub struct CancellingInstall {
    pub cancel: CancellationToken,
}

#[async_trait]
impl ModuleLifecycle for CancellingInstall {
    async fn on_install(&self, _ctx: &HookContext) -> anyhow::Result<()> {
        self.cancel.cancel();
        Ok(())
    }
}

/// Orchestrator test fixture with an isolated registry
pub struct OrchestratorFixture {
    pub catalog: Arc<ModuleCatalog>,
    pub registry: Arc<ModuleRegistry>,
    pub orchestrator: Orchestrator,
    pub cancel: CancellationToken,
}

impl OrchestratorFixture {
    /// Fixture with no hooks registered
    pub fn new(catalog: ModuleCatalog) -> Self {
        Self::with_hooks(catalog, HookRegistry::new())
    }

    /// Fixture with the given hook registry
    pub fn with_hooks(catalog: ModuleCatalog, hooks: HookRegistry) -> Self {
        Self::with_context(catalog, hooks, ProvisionContext::new("tenant-1"))
    }

    /// Fixture with full control over the provisioning context
    pub fn with_context(
        catalog: ModuleCatalog,
        hooks: HookRegistry,
        context: ProvisionContext,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let registry = Arc::new(ModuleRegistry::new());
        let orchestrator = Orchestrator::new(
            Arc::clone(&catalog),
            Arc::clone(&registry),
            Arc::new(hooks),
            context,
        );
        Self {
            catalog,
            registry,
            orchestrator,
            cancel: CancellationToken::new(),
        }
    }
}

//! Module lifecycle primitives
//!
//! States, transitions, the typed error taxonomy, and the hook interface
//! modules implement to participate in provisioning.

pub mod hooks;
pub mod traits;

pub use hooks::HookRegistry;
pub use traits::{HookContext, ModuleLifecycle, ModuleState, ProvisionError, Transition};

//! Timeout utilities for hook execution
//!
//! Lifecycle hooks are arbitrary, potentially slow calls; every invocation
//! runs under a caller-supplied timeout, with elapse treated exactly like a
//! hook failure.

use std::time::Duration;
use tokio::time::timeout;

/// Default timeout for a single lifecycle hook invocation
///
/// Note: this is a fallback default. Prefer the configurable timeout from
/// `ProvisionerConfig::hook_timeout()` when available.
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// Execute operation with custom timeout
pub async fn with_custom_timeout<F, T>(
    operation: F,
    duration: Duration,
) -> Result<T, tokio::time::error::Elapsed>
where
    F: std::future::Future<Output = T>,
{
    timeout(duration, operation).await
}

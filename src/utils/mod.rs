//! Utility modules shared across the provisioner

pub mod logging;
pub mod time;
pub mod timeout;

// Re-export commonly used items
#[cfg(feature = "json-logging")]
pub use logging::init_json_logging;
pub use logging::init_logging;
pub use time::current_timestamp;
pub use timeout::{with_custom_timeout, DEFAULT_HOOK_TIMEOUT};

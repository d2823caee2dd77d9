//! Transport defaults.

use std::time::Duration;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("tkassa-http/", env!("CARGO_PKG_VERSION"));

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

//! Central configuration constants for runtime limits and defaults.

use std::time::Duration;

/// Fixed resource path the remote title endpoint serves, relative to the
/// configured base URL.
pub const TITLE_RESOURCE_PATH: &str = "title/next";

/// Delay before a tap-count display update is published.
pub const TAP_DISPLAY_DELAY: Duration = Duration::from_secs(1);

/// Default time budget for one refresh attempt.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// Total HTTP request timeout applied to the shared client.
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Connect-phase timeout applied to the shared client.
pub const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bound of the coordinator's domain-event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

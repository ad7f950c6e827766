use std::str::FromStr;

use tracing::Level;

/// Initialize tracing/logging for the relay.
///
/// Unknown level names fall back to `info`. Uses `try_init` so tests and
/// libraries can call this more than once without panicking.
pub fn init(default_level: &str) {
    let level = Level::from_str(default_level).unwrap_or(Level::INFO);

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

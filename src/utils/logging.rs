use std::str::FromStr;

use tracing::Level;

/// Installs the global fmt subscriber at `level` ("info", "debug", ...).
///
/// Unknown level names fall back to `INFO`. Calling this more than once is
/// harmless; later calls leave the first subscriber in place.
pub fn init_logging(level: &str) {
    let level = Level::from_str(level).unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

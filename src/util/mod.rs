//! Utility module
//!
//! This module provides common helpers used throughout the library and by the
//! demo program.

use tracing::Level;

/// Formats bytes as space-separated lowercase hex, the way the wire dumps read
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Installs a formatting subscriber on stderr at the given level
///
/// Returns false if a global subscriber was already installed.
pub fn init_logging(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

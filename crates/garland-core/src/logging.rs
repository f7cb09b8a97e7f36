//! Logging bootstrap shared by the Garland binaries.

use env_logger::Builder;
use std::env;

/// Initialise the global logger.
///
/// `RUST_LOG` takes precedence; `default_filter` applies otherwise. Safe to
/// call more than once (later calls are no-ops).
pub fn init(default_filter: &str) {
    let mut builder = Builder::new();
    match env::var("RUST_LOG") {
        Ok(spec) if !spec.is_empty() => {
            builder.parse_filters(&spec);
        }
        _ => {
            builder.parse_filters(default_filter);
        }
    }
    let _ = builder.format_timestamp_secs().try_init();
}

//! Configuration and process bootstrap helpers.

pub mod database;

use tracing_subscriber::EnvFilter;

/// Initializes tracing output for embedding binaries and tests.
///
/// Respects `RUST_LOG` and defaults to `info`. Safe to call more than once;
/// subsequent calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

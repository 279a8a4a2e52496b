//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Initialize tracing/logging with [`DEFAULT_DIRECTIVE`].
pub fn init() {
    init_with(DEFAULT_DIRECTIVE);
}

/// Initialize tracing/logging, falling back to `directive` when `RUST_LOG` is
/// unset or unparsable.
///
/// Safe to call multiple times (subsequent calls are no-ops). Collision
/// notices are emitted under the `rowguid::notice` target, so e.g.
/// `RUST_LOG=warn,rowguid::notice=info` keeps only those.
pub fn init_with(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    // JSON lines with timestamps and targets.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}

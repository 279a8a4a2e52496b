//! Tracing/logging setup and the notice sink used to report GUID collisions.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Notice-level log sinks.
pub mod notice;

pub use notice::{MemoryNoticeSink, NoticeSink, TracingNoticeSink};

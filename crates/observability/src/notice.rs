//! A single-level "notice" log sink.
//!
//! `tracing` has no NOTICE level; notices are INFO events on the
//! `rowguid::notice` target carrying `severity = "notice"`.

use std::sync::{Arc, Mutex};

/// Receives notice-level messages (one per detected GUID collision).
pub trait NoticeSink: Send + Sync {
    fn notice(&self, message: &str);
}

impl<S> NoticeSink for Arc<S>
where
    S: NoticeSink + ?Sized,
{
    fn notice(&self, message: &str) {
        (**self).notice(message)
    }
}

/// Forwards notices to the process `tracing` subscriber.
#[derive(Debug, Default, Copy, Clone)]
pub struct TracingNoticeSink;

impl NoticeSink for TracingNoticeSink {
    fn notice(&self, message: &str) {
        ::tracing::info!(target: "rowguid::notice", severity = "notice", "{message}");
    }
}

/// Keeps notices in memory.
///
/// Intended for tests/dev. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryNoticeSink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemoryNoticeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NoticeSink for MemoryNoticeSink {
    fn notice(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

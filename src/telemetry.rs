//! Telemetry utilities for handler timing and log correlation.

use std::time::Instant;

/// Guard for timing one handler invocation.
///
/// Emits a `trace` event with the elapsed time when dropped, so timings are
/// recorded whether the handler finished, failed, or panicked.
pub struct HandlerTimer {
    kind: &'static str,
    trigger: String,
    start: Instant,
}

impl HandlerTimer {
    /// Start timing a handler.
    pub fn new(kind: &'static str, trigger: impl Into<String>) -> Self {
        Self {
            kind,
            trigger: trigger.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for HandlerTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::trace!(
            kind = self.kind,
            trigger = %self.trigger,
            elapsed_ms,
            "handler finished"
        );
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, debug_span, info_span};

    /// Span covering one server connection.
    pub fn connection(host: &str, port: u16, tls: bool) -> Span {
        info_span!("connection", host = %host, port, tls)
    }

    /// Span covering the dispatch of one inbound message.
    pub fn message(command: &str) -> Span {
        debug_span!("message", command = %command)
    }

    /// Span covering one handler invocation.
    pub fn handler(kind: &'static str, trigger: &str) -> Span {
        debug_span!("handler", kind, trigger = %trigger)
    }
}

//! Metric instruments for resolution and playback attachment.
//!
//! Instruments are created against the global OpenTelemetry meter. Without an
//! installed meter provider they are no-ops, so embedding applications opt in
//! by registering their own provider before first use.

use opentelemetry::global;
use opentelemetry::metrics::{Counter, Meter};
use std::sync::OnceLock;

pub use opentelemetry::KeyValue;

/// Aggregated metric instruments.
pub struct PlaybackMetrics {
    pub resolution_total: Counter<u64>,
    pub resolution_requests_total: Counter<u64>,
    pub attach_total: Counter<u64>,
    pub session_destroyed_total: Counter<u64>,
}

impl PlaybackMetrics {
    fn new() -> Self {
        let meter: Meter = global::meter("m3u-playback");
        Self {
            resolution_total: meter
                .u64_counter("resolution_total")
                .with_description("Completed stream resolutions by termination reason")
                .build(),
            resolution_requests_total: meter
                .u64_counter("resolution_requests_total")
                .with_description("Network requests issued while resolving")
                .build(),
            attach_total: meter
                .u64_counter("attach_total")
                .with_description("Attachment passes by outcome")
                .build(),
            session_destroyed_total: meter
                .u64_counter("session_destroyed_total")
                .with_description("Streaming sessions released before replacement")
                .build(),
        }
    }
}

static METRICS: OnceLock<PlaybackMetrics> = OnceLock::new();

/// Public accessor for global metric instruments.
pub fn metrics() -> &'static PlaybackMetrics {
    METRICS.get_or_init(PlaybackMetrics::new)
}

//! Prometheus collectors for readiness and document-load outcomes.

use lazy_static::lazy_static;
use prometheus::exponential_buckets;
use prometheus::register_histogram;
use prometheus::register_int_counter;
use prometheus::register_int_counter_vec;
use prometheus::Encoder;
use prometheus::Histogram;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::TextEncoder;
use tracing::warn;

lazy_static! {
    pub static ref PATH_WATCH_FAILURES: IntCounterVec = register_int_counter_vec!(
        "docgate_path_watch_failures_total",
        "Path watches that gave up and force-completed the barrier",
        &["path", "reason"]
    )
    .expect("metric can not be created");

    pub static ref FAST_PATH_BYPASS: IntCounter = register_int_counter!(
        "docgate_fast_path_bypass_total",
        "Startups that skipped patching because the SDK build needs none"
    )
    .expect("metric can not be created");

    pub static ref BARRIER_COMPLETIONS: IntCounterVec = register_int_counter_vec!(
        "docgate_barrier_completions_total",
        "Readiness barrier completions by cause",
        &["cause"]
    )
    .expect("metric can not be created");

    pub static ref DOCUMENT_LOADS: IntCounterVec = register_int_counter_vec!(
        "docgate_document_loads_total",
        "Document-load invocations by outcome",
        &["outcome"]
    )
    .expect("metric can not be created");

    pub static ref READINESS_WAIT_MS: Histogram = register_histogram!(
        "docgate_readiness_wait_ms",
        "Time a document load spent waiting on the readiness barrier, in ms",
        exponential_buckets(1.0, 2.0, 16).expect("valid bucket layout")
    )
    .expect("metric can not be created");
}

/// Renders every registered collector in the Prometheus text format
pub fn gather_text() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&prometheus::gather(), &mut buffer) {
        warn!("could not encode metrics: {:?}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

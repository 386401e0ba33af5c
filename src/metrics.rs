//! Filter engine metrics.
//!
//! Instruments are created lazily from the OpenTelemetry global meter provider. The crate
//! never installs a provider itself; until the embedding application does, every recording
//! is a no-op.
//!
//! Provided metrics:
//! * `zuul_filter_executions_total` (counter; labels `filter`, `type`, `status`)
//! * `zuul_filter_duration_seconds` (histogram; label `span`)
//! * `zuul_filter_loads_total` (counter; labels `filter`, `type`)
use std::time::Duration;

use once_cell::sync::Lazy;
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};

use crate::core::result::ExecutionStatus;

pub const ZUUL_FILTER_EXECUTIONS_TOTAL: &str = "zuul_filter_executions_total";
pub const ZUUL_FILTER_DURATION_SECONDS: &str = "zuul_filter_duration_seconds";
pub const ZUUL_FILTER_LOADS_TOTAL: &str = "zuul_filter_loads_total";

struct FilterInstruments {
    executions: Counter<u64>,
    duration: Histogram<f64>,
    loads: Counter<u64>,
}

static INSTRUMENTS: Lazy<FilterInstruments> = Lazy::new(|| {
    let meter = global::meter("zuul_filters");
    FilterInstruments {
        executions: meter
            .u64_counter(ZUUL_FILTER_EXECUTIONS_TOTAL)
            .with_description("Filter invocations by final execution status.")
            .build(),
        duration: meter
            .f64_histogram(ZUUL_FILTER_DURATION_SECONDS)
            .with_unit("s")
            .with_description("Time spent in filter bodies.")
            .build(),
        loads: meter
            .u64_counter(ZUUL_FILTER_LOADS_TOTAL)
            .with_description("Filter instances created by the loader.")
            .build(),
    }
});

/// Count one filter invocation.
pub fn increment_filter_execution(filter: &str, filter_type: &str, status: ExecutionStatus) {
    INSTRUMENTS.executions.add(
        1,
        &[
            KeyValue::new("filter", filter.to_string()),
            KeyValue::new("type", filter_type.to_string()),
            KeyValue::new("status", status.as_str()),
        ],
    );
}

/// Record the duration of a closed filter span.
pub fn record_filter_duration(span: &str, duration: Duration) {
    INSTRUMENTS.duration.record(
        duration.as_secs_f64(),
        &[KeyValue::new("span", span.to_string())],
    );
}

/// Count one filter instance produced by the loader.
pub fn record_filter_load(filter: &str, filter_type: &str) {
    INSTRUMENTS.loads.add(
        1,
        &[
            KeyValue::new("filter", filter.to_string()),
            KeyValue::new("type", filter_type.to_string()),
        ],
    );
}

/// Create the instruments eagerly (idempotent).
pub fn init_metrics() -> eyre::Result<()> {
    tracing::info!("Initializing filter metrics");
    Lazy::force(&INSTRUMENTS);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_metrics() {
        assert!(init_metrics().is_ok());
    }

    #[test]
    fn test_recording_without_provider_is_noop() {
        increment_filter_execution("Auth", "pre", ExecutionStatus::Success);
        record_filter_duration("ZUUL::Auth", Duration::from_millis(3));
        record_filter_load("Auth", "pre");
    }
}

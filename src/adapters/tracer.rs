use std::time::Instant;

use crate::{
    metrics::record_filter_duration,
    ports::tracer::{TraceSpan, Tracer},
    tracing_setup::create_filter_span,
};

/// Tracer emitting spans through `tracing` and recording durations as metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTracer;

impl Tracer for TracingTracer {
    fn start_span(&self, name: &str) -> Box<dyn TraceSpan> {
        Box::new(TimedSpan {
            name: name.to_string(),
            started_at: Instant::now(),
            span: create_filter_span(name),
        })
    }
}

struct TimedSpan {
    name: String,
    started_at: Instant,
    span: tracing::Span,
}

impl TraceSpan for TimedSpan {
    fn rename(&mut self, name: &str) {
        self.span.record("span.name", name);
        self.name = name.to_string();
    }

    fn close_and_record(self: Box<Self>) {
        let elapsed = self.started_at.elapsed();
        self.span.record("duration_us", elapsed.as_micros() as u64);
        self.span.in_scope(|| {
            tracing::debug!(
                span = %self.name,
                elapsed_us = elapsed.as_micros() as u64,
                "Filter span closed"
            );
        });
        record_filter_duration(&self.name, elapsed);
    }
}

/// Tracer that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn start_span(&self, _name: &str) -> Box<dyn TraceSpan> {
        Box::new(NoopSpan)
    }
}

struct NoopSpan;

impl TraceSpan for NoopSpan {
    fn rename(&mut self, _name: &str) {}

    fn close_and_record(self: Box<Self>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_span_lifecycle() {
        let mut span = TracingTracer.start_span("ZUUL::Auth");
        span.rename("ZUUL::Auth failed");
        span.close_and_record();
    }

    #[test]
    fn test_noop_span_lifecycle() {
        let mut span = NoopTracer.start_span("ZUUL::Auth");
        span.rename("ignored");
        span.close_and_record();
    }
}

//! Execution state machine for a single filter.
//!
//! Every invocation walks the same path:
//! 1. disablement check (binding resolved once per instance, value read live)
//! 2. `should_run()` predicate
//! 3. body invocation inside a trace span
//!
//! Failures of the body, including panics, are converted into [`FilterResult::Failed`]; nothing
//! raised by a filter escapes [`FilterRuntime::run_filter`].
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use tracing::{debug, warn};

use crate::{
    core::{filter::ManagedFilter, result::FilterResult},
    ports::{
        property_source::PropertySource,
        tracer::{TraceSpan, Tracer},
    },
};

/// Prefix of every filter trace span name.
pub const TRACE_PREFIX: &str = "ZUUL::";

/// Runs filters against injected configuration and tracing collaborators.
#[derive(Clone)]
pub struct FilterRuntime {
    properties: Arc<dyn PropertySource>,
    tracer: Arc<dyn Tracer>,
}

impl FilterRuntime {
    pub fn new(properties: Arc<dyn PropertySource>, tracer: Arc<dyn Tracer>) -> Self {
        Self { properties, tracer }
    }

    /// The property source disable flags are resolved against.
    pub fn properties(&self) -> &Arc<dyn PropertySource> {
        &self.properties
    }

    /// Run one filter and describe the outcome. Never panics on behalf of the filter.
    pub fn run_filter(&self, filter: &ManagedFilter) -> FilterResult {
        if filter.is_disabled(self.properties.as_ref()) {
            debug!(filter = filter.implementation_name(), "Filter disabled");
            return FilterResult::default();
        }

        if !filter.should_run() {
            return FilterResult::Skipped;
        }

        let name = format!("{TRACE_PREFIX}{}", filter.implementation_name());
        let mut span = SpanGuard::new(self.tracer.start_span(&name));

        match panic::catch_unwind(AssertUnwindSafe(|| filter.run())) {
            Ok(Ok(payload)) => FilterResult::Success(payload),
            Ok(Err(report)) => {
                span.rename(&format!("{name} failed"));
                warn!(
                    filter = filter.implementation_name(),
                    filter_type = filter.filter_type(),
                    error = %report,
                    "Filter failed"
                );
                FilterResult::Failed(report)
            }
            Err(panic_payload) => {
                span.rename(&format!("{name} failed"));
                let message = panic_message(panic_payload.as_ref());
                warn!(
                    filter = filter.implementation_name(),
                    filter_type = filter.filter_type(),
                    panic = %message,
                    "Filter panicked"
                );
                FilterResult::Failed(eyre::eyre!("filter panicked: {message}"))
            }
        }
    }
}

/// Closes the wrapped span exactly once, when the guard goes out of scope.
struct SpanGuard {
    span: Option<Box<dyn TraceSpan>>,
}

impl SpanGuard {
    fn new(span: Box<dyn TraceSpan>) -> Self {
        Self { span: Some(span) }
    }

    fn rename(&mut self, name: &str) {
        if let Some(span) = self.span.as_mut() {
            span.rename(name);
        }
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        if let Some(span) = self.span.take() {
            span.close_and_record();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

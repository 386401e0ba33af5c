//! Drives a group of filters in order and relays every outcome to the usage notifier.
//!
//! Deciding which filter types to run for a request belongs to the transport layer; the
//! processor runs whatever type it is asked for and keeps going past failed filters so the
//! caller can hand control to error filters afterwards.
use std::sync::Arc;

use tracing::debug;

use crate::{
    core::{
        filter::ManagedFilter,
        loader::FilterLoader,
        result::{ExecutionStatus, FilterResult},
        runtime::FilterRuntime,
    },
    ports::usage_notifier::FilterUsageNotifier,
};

/// One filter invocation within a chain run.
#[derive(Debug)]
pub struct FilterExecution {
    pub filter: Arc<ManagedFilter>,
    pub result: FilterResult,
}

/// Outcome of running every filter of one type.
#[derive(Debug, Default)]
pub struct ChainReport {
    executions: Vec<FilterExecution>,
}

impl ChainReport {
    /// All executions in run order.
    pub fn executions(&self) -> &[FilterExecution] {
        &self.executions
    }

    pub fn into_executions(self) -> Vec<FilterExecution> {
        self.executions
    }

    pub fn successes(&self) -> impl Iterator<Item = &FilterExecution> {
        self.executions
            .iter()
            .filter(|execution| execution.result.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FilterExecution> {
        self.executions
            .iter()
            .filter(|execution| execution.result.is_failed())
    }

    /// Number of executions that ended with `status`.
    pub fn count(&self, status: ExecutionStatus) -> usize {
        self.executions
            .iter()
            .filter(|execution| execution.result.status() == status)
            .count()
    }

    pub fn any_success(&self) -> bool {
        self.successes().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.executions.is_empty()
    }
}

/// Runs filter groups through the runtime and notifies once per filter.
pub struct FilterProcessor {
    loader: Arc<FilterLoader>,
    runtime: FilterRuntime,
    notifier: Arc<dyn FilterUsageNotifier>,
}

impl FilterProcessor {
    pub fn new(
        loader: Arc<FilterLoader>,
        runtime: FilterRuntime,
        notifier: Arc<dyn FilterUsageNotifier>,
    ) -> Self {
        Self {
            loader,
            runtime,
            notifier,
        }
    }

    pub fn loader(&self) -> &Arc<FilterLoader> {
        &self.loader
    }

    /// Run a single filter and report its status.
    pub fn run_filter(&self, filter: &ManagedFilter) -> FilterResult {
        let result = self.runtime.run_filter(filter);
        self.notifier.notify(filter, result.status());
        result
    }

    /// Run every filter of `filter_type` in ascending order.
    pub async fn run_filters(&self, filter_type: &str) -> ChainReport {
        let group = self.loader.filters_by_type(filter_type).await;
        let mut executions = Vec::with_capacity(group.len());

        for filter in group.iter() {
            let result = self.run_filter(filter);
            executions.push(FilterExecution {
                filter: filter.clone(),
                result,
            });
        }

        let report = ChainReport { executions };
        debug!(
            filter_type,
            ran = report.executions.len(),
            succeeded = report.count(ExecutionStatus::Success),
            failed = report.count(ExecutionStatus::Failed),
            "Filter chain completed"
        );
        report
    }
}

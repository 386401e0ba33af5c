use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    core::{filter::ManagedFilter, result::ExecutionStatus},
    metrics::increment_filter_execution,
    ports::usage_notifier::FilterUsageNotifier,
};

/// Usage notifier exporting one counter increment per filter execution.
///
/// Also keeps process-local totals per status for diagnostics.
#[derive(Debug, Default)]
pub struct MetricsUsageNotifier {
    totals: [AtomicU64; 4],
}

impl MetricsUsageNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executions observed with `status` since creation.
    pub fn total(&self, status: ExecutionStatus) -> u64 {
        self.totals[status.index()].load(Ordering::Relaxed)
    }

    /// Executions observed across all statuses.
    pub fn grand_total(&self) -> u64 {
        ExecutionStatus::ALL
            .iter()
            .map(|status| self.total(*status))
            .sum()
    }
}

impl FilterUsageNotifier for MetricsUsageNotifier {
    fn notify(&self, filter: &ManagedFilter, status: ExecutionStatus) {
        self.totals[status.index()].fetch_add(1, Ordering::Relaxed);
        increment_filter_execution(filter.implementation_name(), filter.filter_type(), status);
    }
}

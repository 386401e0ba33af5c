use crate::core::{filter::ManagedFilter, result::ExecutionStatus};

/// FilterUsageNotifier defines the port for observing each filter execution
pub trait FilterUsageNotifier: Send + Sync + 'static {
    /// Called once per filter invocation with its final status
    fn notify(&self, filter: &ManagedFilter, status: ExecutionStatus);
}

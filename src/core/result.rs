//! Outcome of a single filter invocation.
//!
//! A [`FilterResult`] is produced by
//! [`FilterRuntime::run_filter`](crate::core::FilterRuntime::run_filter) and consumed immediately
//! by whoever drives the chain. It carries exactly one of the four terminal states so a caller
//! can never observe a payload next to a failure.
use std::{any::Any, fmt};

use serde::{Deserialize, Serialize};

/// Arbitrary value returned by a successful filter body.
pub type FilterPayload = Box<dyn Any + Send + Sync>;

/// Terminal status of one filter invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// The filter's disable property was set; nothing was evaluated.
    Disabled,
    /// `should_run()` returned false; the body was not invoked.
    Skipped,
    /// The body returned normally.
    Success,
    /// The body returned an error or panicked.
    Failed,
}

impl ExecutionStatus {
    /// All statuses, in declaration order.
    pub const ALL: [ExecutionStatus; 4] = [
        ExecutionStatus::Disabled,
        ExecutionStatus::Skipped,
        ExecutionStatus::Success,
        ExecutionStatus::Failed,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Disabled => "DISABLED",
            ExecutionStatus::Skipped => "SKIPPED",
            ExecutionStatus::Success => "SUCCESS",
            ExecutionStatus::Failed => "FAILED",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            ExecutionStatus::Disabled => 0,
            ExecutionStatus::Skipped => 1,
            ExecutionStatus::Success => 2,
            ExecutionStatus::Failed => 3,
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running a filter through the runtime.
///
/// The default value is [`FilterResult::Disabled`], which is what the runtime returns when it
/// short-circuits before looking at the filter's predicate.
#[derive(Default)]
pub enum FilterResult {
    #[default]
    Disabled,
    Skipped,
    Success(FilterPayload),
    Failed(eyre::Report),
}

impl FilterResult {
    /// Status tag of this result.
    pub fn status(&self) -> ExecutionStatus {
        match self {
            FilterResult::Disabled => ExecutionStatus::Disabled,
            FilterResult::Skipped => ExecutionStatus::Skipped,
            FilterResult::Success(_) => ExecutionStatus::Success,
            FilterResult::Failed(_) => ExecutionStatus::Failed,
        }
    }

    /// Payload of a successful run.
    pub fn payload(&self) -> Option<&(dyn Any + Send + Sync)> {
        match self {
            FilterResult::Success(payload) => Some(payload.as_ref()),
            _ => None,
        }
    }

    /// Payload of a successful run, downcast to a concrete type.
    pub fn payload_as<T: Any>(&self) -> Option<&T> {
        self.payload().and_then(|payload| payload.downcast_ref::<T>())
    }

    /// Failure cause of a failed run.
    pub fn error(&self) -> Option<&eyre::Report> {
        match self {
            FilterResult::Failed(report) => Some(report),
            _ => None,
        }
    }

    pub fn into_payload(self) -> Option<FilterPayload> {
        match self {
            FilterResult::Success(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn into_error(self) -> Option<eyre::Report> {
        match self {
            FilterResult::Failed(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FilterResult::Success(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FilterResult::Failed(_))
    }
}

impl fmt::Debug for FilterResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterResult::Success(_) => f.debug_tuple("Success").field(&"..").finish(),
            FilterResult::Failed(report) => f.debug_tuple("Failed").field(report).finish(),
            other => f.write_str(other.status().as_str()),
        }
    }
}

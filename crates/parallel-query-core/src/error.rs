//! Query error types.
//!
//! Defines the fault taxonomy for parallel query execution. Errors are
//! designed for fail-fast debugging with descriptive messages, and the
//! aggregate form keeps every underlying fault individually inspectable.

use std::fmt;

use thiserror::Error;

/// Underlying fault raised by an equivalence relation or by element access.
///
/// Boxed so that callers can surface their own error types through the
/// engine; the concrete type stays reachable via downcasting on the
/// [`PartitionFault`] that wraps it.
pub type ElementFault = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a query call was canceled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The token was already canceled when the call began. Nothing was
    /// scheduled and no element was accessed.
    PreCanceled,
    /// The token was canceled by the caller while partitions were in flight.
    External,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::PreCanceled => write!(f, "token canceled before execution began"),
            CancelReason::External => write!(f, "token canceled during execution"),
        }
    }
}

/// A fault raised inside one partition, tagged with the partition that
/// raised it.
#[derive(Debug, Error)]
#[error("partition {partition} faulted: {fault}")]
pub struct PartitionFault {
    /// Index of the partition whose worker raised the fault.
    pub partition: usize,
    /// The underlying fault from the equivalence relation or element access.
    #[source]
    fault: ElementFault,
}

impl PartitionFault {
    /// Wrap an underlying fault with the partition that raised it.
    pub fn new(partition: usize, fault: ElementFault) -> Self {
        Self { partition, fault }
    }

    /// Borrow the underlying fault.
    pub fn get_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.fault.as_ref()
    }

    /// Downcast the underlying fault to a concrete error type.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.fault.downcast_ref::<E>()
    }

    /// Take back the underlying fault.
    pub fn into_inner(self) -> ElementFault {
        self.fault
    }
}

/// Composite fault carrying every fault raised during a parallel call.
///
/// Concurrent partitions may each fault independently; all of them are
/// collected here, never collapsed to the first one. Each entry remains
/// inspectable through [`PartitionFault::get_ref`] and
/// [`PartitionFault::downcast_ref`].
#[derive(Debug, Error)]
#[error("parallel query faulted with {} underlying fault(s)", .faults.len())]
pub struct AggregateFault {
    faults: Vec<PartitionFault>,
}

impl AggregateFault {
    /// Build an aggregate from the faults collected across partitions.
    pub fn new(faults: Vec<PartitionFault>) -> Self {
        debug_assert!(!faults.is_empty(), "aggregate fault must carry at least one fault");
        Self { faults }
    }

    /// Number of underlying faults.
    pub fn len(&self) -> usize {
        self.faults.len()
    }

    /// True when the aggregate carries no faults. Never the case for
    /// aggregates produced by the engine.
    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    /// Borrow the collected faults.
    pub fn faults(&self) -> &[PartitionFault] {
        &self.faults
    }

    /// Iterate over the collected faults.
    pub fn iter(&self) -> impl Iterator<Item = &PartitionFault> {
        self.faults.iter()
    }

    /// Consume the aggregate, yielding the collected faults.
    pub fn into_faults(self) -> Vec<PartitionFault> {
        self.faults
    }
}

/// Errors surfaced at the query boundary.
///
/// A call returns a value or raises exactly one of these; concurrently
/// raised element faults are never lost when the outcome is `Faulted`.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Caller misuse, detected synchronously before any parallel work is
    /// scheduled. Never aggregated with other faults.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What the caller got wrong.
        message: String,
    },

    /// The call was abandoned cooperatively via its cancellation token.
    #[error("query canceled: {reason}")]
    Canceled {
        /// Whether cancellation was observed before or during execution.
        reason: CancelReason,
    },

    /// One or more partitions faulted and no match was found first.
    #[error(transparent)]
    Faulted(#[from] AggregateFault),
}

impl QueryError {
    /// Creates an `InvalidArgument` error with the given message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        QueryError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates the error raised when the source binding is absent.
    pub fn null_source() -> Self {
        QueryError::invalid_argument("source must be present; the query captured no source binding")
    }
}

/// Convenient Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("comparer blew up on purpose")]
    struct DeliberateFault;

    #[test]
    fn test_cancel_reason_display() {
        assert!(CancelReason::PreCanceled.to_string().contains("before execution"));
        assert!(CancelReason::External.to_string().contains("during execution"));
    }

    #[test]
    fn test_partition_fault_display_carries_partition_and_cause() {
        let fault = PartitionFault::new(3, Box::new(DeliberateFault));
        let msg = fault.to_string();
        assert!(msg.contains("partition 3"));
        assert!(msg.contains("blew up on purpose"));
    }

    #[test]
    fn test_partition_fault_downcast() {
        let fault = PartitionFault::new(0, Box::new(DeliberateFault));
        assert!(fault.downcast_ref::<DeliberateFault>().is_some());
        assert!(fault.downcast_ref::<std::fmt::Error>().is_none());
    }

    #[test]
    fn test_partition_fault_source_chain() {
        use std::error::Error as _;
        let fault = PartitionFault::new(1, Box::new(DeliberateFault));
        let source = fault.source().expect("source must be preserved");
        assert_eq!(source.to_string(), "comparer blew up on purpose");
    }

    #[test]
    fn test_aggregate_fault_keeps_every_fault() {
        let aggregate = AggregateFault::new(vec![
            PartitionFault::new(0, Box::new(DeliberateFault)),
            PartitionFault::new(2, Box::new(DeliberateFault)),
        ]);
        assert_eq!(aggregate.len(), 2);
        assert!(!aggregate.is_empty());
        assert!(aggregate.to_string().contains("2 underlying fault(s)"));
        let partitions: Vec<usize> = aggregate.iter().map(|f| f.partition).collect();
        assert_eq!(partitions, vec![0, 2]);
    }

    #[test]
    fn test_query_error_from_aggregate() {
        let aggregate = AggregateFault::new(vec![PartitionFault::new(0, Box::new(DeliberateFault))]);
        let error: QueryError = aggregate.into();
        match error {
            QueryError::Faulted(inner) => assert_eq!(inner.len(), 1),
            other => panic!("expected Faulted, got {other:?}"),
        }
    }

    #[test]
    fn test_null_source_is_invalid_argument() {
        let error = QueryError::null_source();
        assert!(matches!(error, QueryError::InvalidArgument { .. }));
        assert!(error.to_string().contains("invalid argument"));
    }

    #[test]
    fn test_canceled_display() {
        let error = QueryError::Canceled {
            reason: CancelReason::PreCanceled,
        };
        let msg = error.to_string();
        assert!(msg.contains("query canceled"));
        assert!(msg.contains("before execution"));
    }
}

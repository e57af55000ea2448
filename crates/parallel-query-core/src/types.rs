//! Terminal outcome types for workers and whole calls.

use crate::error::{AggregateFault, CancelReason, PartitionFault};

/// Terminal state of one worker task.
///
/// Workers run `Running -> {Found, Exhausted, CanceledOut, Faulted}`; this
/// enum carries the terminal state back to the merger.
#[derive(Debug)]
pub enum WorkerOutcome {
    /// The worker matched an element and the gate latched for the match.
    Found,
    /// The worker drained its partition without a match.
    Exhausted,
    /// The worker observed a closed gate and stopped pulling.
    CanceledOut,
    /// The equivalence relation or element access faulted; the worker
    /// stopped its partition immediately.
    Faulted(PartitionFault),
}

/// Terminal outcome of a whole search call. Exactly one per call.
#[derive(Debug)]
pub enum Verdict {
    /// Some element matched the target under the relation in force.
    Found,
    /// All partitions exhausted without a match, fault, or cancellation.
    NotFound,
    /// The call was abandoned via its cancellation token.
    Canceled(CancelReason),
    /// One or more partitions faulted and no match was found first.
    Faulted(AggregateFault),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ElementFault;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn test_faulted_outcome_keeps_partition_identity() {
        let outcome =
            WorkerOutcome::Faulted(PartitionFault::new(5, Box::new(Boom) as ElementFault));
        match outcome {
            WorkerOutcome::Faulted(fault) => assert_eq!(fault.partition, 5),
            other => panic!("expected Faulted, got {other:?}"),
        }
    }

    #[test]
    fn test_verdict_debug_names_variants() {
        assert!(format!("{:?}", Verdict::Found).contains("Found"));
        assert!(format!("{:?}", Verdict::Canceled(CancelReason::External)).contains("External"));
    }
}

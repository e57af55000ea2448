//! Worker task: drives one partition to a terminal state.

use parallel_query_core::equivalence::Equivalence;
use parallel_query_core::error::{ElementFault, PartitionFault};
use parallel_query_core::partition::ElementPartition;
use parallel_query_core::types::WorkerOutcome;
use tracing::debug;

use crate::gate::{CloseReason, SearchGate};

/// Equivalence oracle resolved once per call: the target plus the relation
/// in force (caller comparer or default equality). Not re-dispatched per
/// element.
pub(crate) struct Oracle<'a, T> {
    target: &'a T,
    relation: &'a dyn Equivalence<T>,
}

impl<'a, T> Oracle<'a, T> {
    pub(crate) fn new(target: &'a T, relation: &'a dyn Equivalence<T>) -> Self {
        Self { target, relation }
    }

    fn matches(&self, candidate: &T) -> Result<bool, ElementFault> {
        self.relation.equivalent(candidate, self.target)
    }
}

/// Run one worker over its exclusively owned partition.
///
/// State machine: `Running -> {Found, Exhausted, CanceledOut, Faulted}`.
/// The gate is checked between pulls, never mid-element, which bounds
/// cancellation latency to one element access.
pub(crate) fn run_worker<T, P>(
    partition_id: usize,
    mut partition: P,
    oracle: &Oracle<'_, T>,
    gate: &SearchGate,
) -> WorkerOutcome
where
    P: ElementPartition<T>,
{
    loop {
        let element = match partition.pull() {
            Ok(Some(element)) => element,
            Ok(None) => return WorkerOutcome::Exhausted,
            Err(fault) => return WorkerOutcome::Faulted(PartitionFault::new(partition_id, fault)),
        };

        if gate.is_closed() {
            return WorkerOutcome::CanceledOut;
        }

        match oracle.matches(&element.value) {
            Ok(true) => {
                return match gate.try_close(CloseReason::MatchFound) {
                    CloseReason::MatchFound => {
                        debug!(partition_id, "match found, gate latched");
                        WorkerOutcome::Found
                    }
                    // Lost the latch race to an external close: the call is
                    // already canceled.
                    CloseReason::External => WorkerOutcome::CanceledOut,
                };
            }
            Ok(false) => continue,
            Err(fault) => return WorkerOutcome::Faulted(PartitionFault::new(partition_id, fault)),
        }
    }
}

//! Result merger: collapses worker outcomes into one verdict.

use parallel_query_core::error::{AggregateFault, CancelReason};
use parallel_query_core::types::{Verdict, WorkerOutcome};
use tracing::debug;

use crate::gate::{CloseReason, SearchGate};

/// Compute the single verdict for a call whose workers have all terminated.
///
/// Priority, independent of arrival order:
/// 1. Gate latched for an external cancellation -> `Canceled`.
/// 2. Gate latched for a match -> `Found`; faults raised by siblings that
///    had not stopped yet are discarded, since existence is already proven.
/// 3. Any fault -> `Faulted`, aggregating every collected fault.
/// 4. Otherwise -> `NotFound`.
///
/// Pre-cancellation is handled by the facade before any worker is scheduled
/// and never reaches the merger.
///
/// The merger makes one final gate observation first, so a token canceled
/// after the last pull still wins over `NotFound` and over pending faults.
/// A latched match is unaffected by that observation: the latch is
/// first-closer-wins.
pub(crate) fn merge_outcomes(gate: &SearchGate, outcomes: Vec<WorkerOutcome>) -> Verdict {
    gate.is_closed();

    let faults: Vec<_> = outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            WorkerOutcome::Faulted(fault) => Some(fault),
            _ => None,
        })
        .collect();

    match gate.close_reason() {
        Some(CloseReason::MatchFound) => {
            if !faults.is_empty() {
                debug!(
                    discarded = faults.len(),
                    "discarding sibling faults after a confirmed match"
                );
            }
            Verdict::Found
        }
        Some(CloseReason::External) => {
            if !faults.is_empty() {
                debug!(
                    discarded = faults.len(),
                    "discarding partition faults after external cancellation"
                );
            }
            Verdict::Canceled(CancelReason::External)
        }
        None if !faults.is_empty() => Verdict::Faulted(AggregateFault::new(faults)),
        None => Verdict::NotFound,
    }
}

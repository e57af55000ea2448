//! Public `Contains` entry points.
//!
//! `Contains` asks only for existence: whether any element of a partitioned
//! source matches a target value under the relation in force. The call
//! blocks until every worker reaches a terminal state and the merger yields
//! a verdict; a match found anywhere closes the shared gate so siblings stop
//! early.

use parallel_query_core::cancel::CancellationToken;
use parallel_query_core::config::ExecOptions;
use parallel_query_core::equivalence::{DefaultEquivalence, Equivalence};
use parallel_query_core::error::{CancelReason, QueryError, QueryResult};
use parallel_query_core::partition::PartitionedSource;
use parallel_query_core::types::{Verdict, WorkerOutcome};
use rayon::prelude::*;
use tracing::debug;

use crate::gate::SearchGate;
use crate::merge::merge_outcomes;
use crate::worker::{run_worker, Oracle};

// ============================================================================
// QUERY FACADE
// ============================================================================

/// Facade over one parallel search call.
///
/// Carries the source binding captured by the enclosing pipeline (which may
/// be absent), the execution options the pipeline passes through, and an
/// optional cancellation token.
///
/// # Example
///
/// ```
/// use parallel_query_core::partition::SliceSource;
/// use parallel_query_engine::ParallelQuery;
///
/// let items: Vec<i32> = (0..16).collect();
/// let found = ParallelQuery::new(SliceSource::new(&items))
///     .contains(&11)
///     .unwrap();
/// assert!(found);
/// ```
#[derive(Debug)]
pub struct ParallelQuery<S> {
    source: Option<S>,
    options: ExecOptions,
    token: Option<CancellationToken>,
}

impl<S> ParallelQuery<S>
where
    S: PartitionedSource,
    S::Item: Sync,
    S::Partition: Send,
{
    /// Query over a present source.
    pub fn new(source: S) -> Self {
        Self::from_optional(Some(source))
    }

    /// Query over the source binding the pipeline captured, which may be
    /// absent. An absent source fails with an invalid-argument error at call
    /// time, before any partition is created.
    pub fn from_optional(source: Option<S>) -> Self {
        Self {
            source,
            options: ExecOptions::default(),
            token: None,
        }
    }

    /// Replace the execution options passed through from the pipeline.
    #[must_use]
    pub fn with_options(mut self, options: ExecOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach a cooperative cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Whether any element equals `target` under default equality.
    ///
    /// # Errors
    ///
    /// - `QueryError::InvalidArgument` for an absent source or invalid
    ///   options, synchronously, before any parallel work.
    /// - `QueryError::Canceled` when the token was pre-canceled or canceled
    ///   mid-flight.
    /// - `QueryError::Faulted` when element access faulted and no match was
    ///   found first.
    pub fn contains(self, target: &S::Item) -> QueryResult<bool>
    where
        S::Item: PartialEq,
    {
        self.run(target, &DefaultEquivalence)
    }

    /// Whether any element matches `target` under `comparer`.
    ///
    /// # Errors
    ///
    /// As [`ParallelQuery::contains`], plus comparer faults are collected
    /// into the aggregate.
    pub fn contains_with<C>(self, target: &S::Item, comparer: &C) -> QueryResult<bool>
    where
        C: Equivalence<S::Item>,
    {
        self.run(target, comparer)
    }

    fn run(self, target: &S::Item, relation: &dyn Equivalence<S::Item>) -> QueryResult<bool> {
        // FAIL FAST: argument validation precedes all parallel work.
        let source = self.source.ok_or_else(QueryError::null_source)?;
        self.options.validate()?;

        // Pre-cancellation: checked before any partition exists, so a
        // pre-canceled call touches zero elements.
        if let Some(token) = &self.token {
            if token.is_canceled() {
                return Err(QueryError::Canceled {
                    reason: CancelReason::PreCanceled,
                });
            }
        }

        let parallelism = self
            .options
            .degree_of_parallelism
            .unwrap_or_else(rayon::current_num_threads)
            .max(1);
        let plan = self.options.plan(parallelism);

        let len_hint = source.len_hint();
        let partitions = source.into_partitions(&plan);
        debug!(
            partitions = partitions.len(),
            parallelism,
            len_hint = ?len_hint,
            "scheduling parallel contains"
        );

        let gate = SearchGate::new(self.token.clone());
        let oracle = Oracle::new(target, relation);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .build()
            .map_err(|e| QueryError::invalid_argument(format!("worker pool: {e}")))?;

        // The only suspension point of the calling thread: waiting for every
        // worker to reach a terminal state.
        let outcomes: Vec<WorkerOutcome> = pool.install(|| {
            partitions
                .into_par_iter()
                .enumerate()
                .map(|(partition_id, partition)| {
                    run_worker(partition_id, partition, &oracle, &gate)
                })
                .collect()
        });

        match merge_outcomes(&gate, outcomes) {
            Verdict::Found => Ok(true),
            Verdict::NotFound => Ok(false),
            Verdict::Canceled(reason) => Err(QueryError::Canceled { reason }),
            Verdict::Faulted(aggregate) => Err(QueryError::Faulted(aggregate)),
        }
    }
}

// ============================================================================
// FREE-FUNCTION SURFACE
// ============================================================================

/// Whether `source` holds an element equal to `target` under default
/// equality.
///
/// # Errors
///
/// See [`ParallelQuery::contains`].
pub fn contains<S>(source: S, target: &S::Item) -> QueryResult<bool>
where
    S: PartitionedSource,
    S::Item: PartialEq + Sync,
    S::Partition: Send,
{
    ParallelQuery::new(source).contains(target)
}

/// Whether `source` holds an element matching `target` under `comparer`;
/// `None` means "use default equality".
///
/// # Errors
///
/// See [`ParallelQuery::contains_with`].
pub fn contains_with_comparer<S, C>(
    source: S,
    target: &S::Item,
    comparer: Option<&C>,
) -> QueryResult<bool>
where
    S: PartitionedSource,
    S::Item: PartialEq + Sync,
    S::Partition: Send,
    C: Equivalence<S::Item>,
{
    let query = ParallelQuery::new(source);
    match comparer {
        Some(comparer) => query.contains_with(target, comparer),
        None => query.contains(target),
    }
}

/// As [`contains_with_comparer`], with a cooperative cancellation token. A
/// pre-canceled token yields an immediate cancellation error; a token
/// canceled mid-flight yields one once observed between element pulls.
///
/// # Errors
///
/// See [`ParallelQuery::contains_with`].
pub fn contains_with_cancellation<S, C>(
    source: S,
    target: &S::Item,
    comparer: Option<&C>,
    token: &CancellationToken,
) -> QueryResult<bool>
where
    S: PartitionedSource,
    S::Item: PartialEq + Sync,
    S::Partition: Send,
    C: Equivalence<S::Item>,
{
    let query = ParallelQuery::new(source).with_cancellation(token.clone());
    match comparer {
        Some(comparer) => query.contains_with(target, comparer),
        None => query.contains(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallel_query_core::partition::SliceSource;

    #[test]
    fn test_contains_smoke() {
        let items: Vec<u32> = (0..64).collect();
        assert!(contains(SliceSource::new(&items), &63).unwrap());
        assert!(!contains(SliceSource::new(&items), &64).unwrap());
    }

    #[test]
    fn test_absent_source_fails_before_scheduling() {
        let query = ParallelQuery::<SliceSource<'_, u32>>::from_optional(None);
        let error = query.contains(&1).unwrap_err();
        assert!(matches!(error, QueryError::InvalidArgument { .. }));
    }

    #[test]
    fn test_invalid_options_fail_before_scheduling() {
        let items = [1u32];
        let error = ParallelQuery::new(SliceSource::new(&items))
            .with_options(ExecOptions::with_degree_of_parallelism(0))
            .contains(&1)
            .unwrap_err();
        assert!(matches!(error, QueryError::InvalidArgument { .. }));
    }
}

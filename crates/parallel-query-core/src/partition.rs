//! Source partitioning for parallel execution.
//!
//! Splits a logical source into independently advanceable partitions whose
//! union (ignoring order) equals the source and whose elements are visited
//! by exactly one partition.
//!
//! # Partitioning modes
//!
//! - **Range**: indexable sources ([`SliceSource`]) are cut into contiguous
//!   index ranges, one per partition. Each pulled element carries its
//!   original position so order can be reconstructed by operators that need
//!   it; existence checks ignore positions.
//! - **Chunked**: streaming sources ([`IterSource`]) share one mutex-guarded
//!   element stream. Each partition pulls chunks whose size grows
//!   geometrically up to a bound, so tiny sources stay responsive and large
//!   sources amortize lock traffic.
//!
//! Empty sources produce the requested number of partitions, all empty;
//! sources smaller than the partition count leave some partitions empty.
//! Element-access failures surface from [`ElementPartition::pull`] and are
//! treated like comparer faults by the engine.

use std::collections::VecDeque;
use std::ops::Range;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ElementFault;

/// First chunk pulled by each streaming partition.
pub const DEFAULT_INITIAL_CHUNK_SIZE: usize = 1;

/// Upper bound for the geometric chunk growth of streaming partitions.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 512;

// ============================================================================
// PARTITION CONTRACT
// ============================================================================

/// One element pulled from a partition, with its original position when the
/// source tracks one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element<T> {
    /// The element value.
    pub value: T,
    /// Zero-based position in the original source, when known.
    pub position: Option<usize>,
}

/// A disjoint slice of a source, exclusively owned by one worker.
pub trait ElementPartition<T>: Send {
    /// Pull the next element. `Ok(None)` means the partition is exhausted.
    ///
    /// # Errors
    ///
    /// Element-access failures from the underlying source surface here and
    /// are propagated by the worker like any comparer fault.
    fn pull(&mut self) -> Result<Option<Element<T>>, ElementFault>;
}

/// How a source should be split, derived from the execution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPlan {
    /// Number of partitions to produce. One worker is scheduled per
    /// partition.
    pub partitions: usize,
    /// First chunk size for streaming partitions.
    pub initial_chunk_size: usize,
    /// Chunk growth bound for streaming partitions.
    pub max_chunk_size: usize,
}

impl PartitionPlan {
    /// Plan with default chunk sizing.
    pub fn new(partitions: usize) -> Self {
        Self {
            partitions,
            initial_chunk_size: DEFAULT_INITIAL_CHUNK_SIZE,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

/// A source that can be split into independently advanceable partitions.
pub trait PartitionedSource {
    /// The element type produced by this source.
    type Item;
    /// The partition handle type handed to each worker.
    type Partition: ElementPartition<Self::Item>;

    /// Number of elements, when known in advance.
    fn len_hint(&self) -> Option<usize>;

    /// Split into exactly `plan.partitions` partitions.
    fn into_partitions(self, plan: &PartitionPlan) -> Vec<Self::Partition>;
}

// ============================================================================
// RANGE PARTITIONING (INDEXABLE SOURCES)
// ============================================================================

/// Indexable source borrowed from a slice.
///
/// Elements are cloned out of the slice as they are pulled; the slice itself
/// stays read-only for the duration of the call.
#[derive(Debug, Clone, Copy)]
pub struct SliceSource<'a, T> {
    items: &'a [T],
}

impl<'a, T> SliceSource<'a, T> {
    /// Borrow a slice as a partitionable source.
    pub fn new(items: &'a [T]) -> Self {
        Self { items }
    }
}

impl<'a, T: Clone + Sync> PartitionedSource for SliceSource<'a, T> {
    type Item = T;
    type Partition = RangePartition<'a, T>;

    fn len_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }

    fn into_partitions(self, plan: &PartitionPlan) -> Vec<Self::Partition> {
        split_ranges(self.items.len(), plan.partitions)
            .into_iter()
            .map(|range| RangePartition {
                items: self.items,
                range,
            })
            .collect()
    }
}

/// Contiguous index range over a shared slice.
#[derive(Debug)]
pub struct RangePartition<'a, T> {
    items: &'a [T],
    range: Range<usize>,
}

impl<T: Clone + Sync> ElementPartition<T> for RangePartition<'_, T> {
    fn pull(&mut self) -> Result<Option<Element<T>>, ElementFault> {
        Ok(self.range.next().map(|position| Element {
            value: self.items[position].clone(),
            position: Some(position),
        }))
    }
}

/// Cut `len` indexes into `count` contiguous ranges differing in size by at
/// most one. `count` must be at least 1.
fn split_ranges(len: usize, count: usize) -> Vec<Range<usize>> {
    debug_assert!(count >= 1, "partition count must be at least 1");
    let base = len / count;
    let extra = len % count;
    let mut start = 0;
    (0..count)
        .map(|i| {
            let size = base + usize::from(i < extra);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}

// ============================================================================
// CHUNK PARTITIONING (STREAMING SOURCES)
// ============================================================================

/// Streaming source over an iterator whose size need not be known.
///
/// All partitions share the underlying iterator behind a mutex; each pull
/// drains a chunk into a partition-local buffer. Chunk sizes double up to
/// the plan's bound.
pub struct IterSource<T> {
    iter: Box<dyn Iterator<Item = Result<T, ElementFault>> + Send>,
    len_hint: Option<usize>,
}

impl<T> std::fmt::Debug for IterSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IterSource")
            .field("len_hint", &self.len_hint)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> IterSource<T> {
    /// Wrap an infallible iterator.
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = T> + Send + 'static,
    {
        Self::try_new(iter.map(Ok))
    }

    /// Wrap an iterator whose element access may fault.
    pub fn try_new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<T, ElementFault>> + Send + 'static,
    {
        let len_hint = match iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(lower),
            _ => None,
        };
        Self {
            iter: Box::new(iter),
            len_hint,
        }
    }
}

impl<T: Send> PartitionedSource for IterSource<T> {
    type Item = T;
    type Partition = ChunkPartition<T>;

    fn len_hint(&self) -> Option<usize> {
        self.len_hint
    }

    fn into_partitions(self, plan: &PartitionPlan) -> Vec<Self::Partition> {
        let stream = Arc::new(Mutex::new(SharedStream {
            iter: self.iter,
            next_position: 0,
        }));
        (0..plan.partitions)
            .map(|_| ChunkPartition {
                stream: Arc::clone(&stream),
                buffer: VecDeque::new(),
                pending_fault: None,
                chunk_size: plan.initial_chunk_size.max(1),
                max_chunk_size: plan.max_chunk_size.max(1),
            })
            .collect()
    }
}

struct SharedStream<T> {
    iter: Box<dyn Iterator<Item = Result<T, ElementFault>> + Send>,
    next_position: usize,
}

/// Partition handle over the shared stream of an [`IterSource`].
pub struct ChunkPartition<T> {
    stream: Arc<Mutex<SharedStream<T>>>,
    buffer: VecDeque<Element<T>>,
    // A fault hit mid-refill is served after the elements buffered before it.
    pending_fault: Option<ElementFault>,
    chunk_size: usize,
    max_chunk_size: usize,
}

impl<T: Send> ChunkPartition<T> {
    fn refill(&mut self) {
        let mut stream = self.stream.lock();
        while self.buffer.len() < self.chunk_size {
            match stream.iter.next() {
                Some(Ok(value)) => {
                    let position = stream.next_position;
                    stream.next_position += 1;
                    self.buffer.push_back(Element {
                        value,
                        position: Some(position),
                    });
                }
                Some(Err(fault)) => {
                    self.pending_fault = Some(fault);
                    break;
                }
                None => break,
            }
        }
        drop(stream);
        self.chunk_size = self.chunk_size.saturating_mul(2).min(self.max_chunk_size);
    }
}

impl<T: Send> ElementPartition<T> for ChunkPartition<T> {
    fn pull(&mut self) -> Result<Option<Element<T>>, ElementFault> {
        if let Some(element) = self.buffer.pop_front() {
            return Ok(Some(element));
        }
        if let Some(fault) = self.pending_fault.take() {
            return Err(fault);
        }
        self.refill();
        match self.buffer.pop_front() {
            Some(element) => Ok(Some(element)),
            None => match self.pending_fault.take() {
                Some(fault) => Err(fault),
                None => Ok(None),
            },
        }
    }
}

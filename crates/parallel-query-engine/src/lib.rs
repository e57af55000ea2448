//! Parallel Query Engine
//!
//! Short-circuiting element search (`Contains`) over partitioned sources.
//!
//! # Architecture
//!
//! One worker task per partition, scheduled on a bounded rayon pool. Every
//! worker consults a shared close-once gate between element pulls; the first
//! match latches the gate so siblings stop early, and the caller's
//! cancellation token folds into the same latch when observed. A merger
//! collapses the terminal worker states into a single verdict:
//!
//! - `Found` / `NotFound` map to `Ok(true)` / `Ok(false)`
//! - cancellation and aggregated partition faults map to typed errors,
//!   with every underlying fault kept inspectable
//!
//! # Example
//!
//! ```
//! use parallel_query_core::partition::SliceSource;
//! use parallel_query_engine::contains;
//!
//! let items: Vec<i32> = (0..1000).collect();
//! assert!(contains(SliceSource::new(&items), &512).unwrap());
//! assert!(!contains(SliceSource::new(&items), &-1).unwrap());
//! ```

pub mod contains;
pub mod gate;
mod merge;
mod worker;

// Re-exports for convenience
pub use contains::{
    contains, contains_with_cancellation, contains_with_comparer, ParallelQuery,
};
pub use gate::{CloseReason, SearchGate};

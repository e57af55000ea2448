//! Parallel Query Core Library
//!
//! Shared substrate for the parallel query engine: source partitioning,
//! equivalence relations, cooperative cancellation, and the fault taxonomy
//! used by every parallel operator.
//!
//! # Architecture
//!
//! This crate defines:
//! - Source and partition abstractions (`PartitionedSource`, `ElementPartition`)
//! - The equivalence relation trait (`Equivalence`) and its default impl
//! - The cancellation token observed cooperatively by workers
//! - Error types and result aliases, including the composite fault that
//!   carries every fault raised during a parallel call
//! - Execution options supplied by the enclosing query pipeline
//!
//! # Example
//!
//! ```
//! use parallel_query_core::config::ExecOptions;
//! use parallel_query_core::partition::{PartitionedSource, SliceSource};
//!
//! let items = vec![1, 2, 3, 4];
//! let source = SliceSource::new(&items);
//! assert_eq!(source.len_hint(), Some(4));
//!
//! let options = ExecOptions::default();
//! assert!(options.validate().is_ok());
//! ```

pub mod cancel;
pub mod config;
pub mod equivalence;
pub mod error;
pub mod partition;
pub mod types;

// Re-exports for convenience
pub use cancel::CancellationToken;
pub use config::ExecOptions;
pub use equivalence::{DefaultEquivalence, Equivalence};
pub use error::{
    AggregateFault, CancelReason, ElementFault, PartitionFault, QueryError, QueryResult,
};
pub use partition::{
    Element, ElementPartition, IterSource, PartitionPlan, PartitionedSource, SliceSource,
};
pub use types::{Verdict, WorkerOutcome};

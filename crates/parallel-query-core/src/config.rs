//! Execution options supplied by the enclosing query pipeline.
//!
//! The pipeline owns the degree-of-parallelism and buffering preferences;
//! operators receive them as [`ExecOptions`] and never decide them locally.

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::partition::{PartitionPlan, DEFAULT_INITIAL_CHUNK_SIZE, DEFAULT_MAX_CHUNK_SIZE};

/// Options carried from the query pipeline into a parallel operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecOptions {
    /// Worker pool size. `None` uses the host's available parallelism.
    pub degree_of_parallelism: Option<usize>,
    /// First chunk pulled by each streaming partition.
    pub initial_chunk_size: usize,
    /// Upper bound for the geometric chunk growth of streaming partitions.
    pub max_chunk_size: usize,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            degree_of_parallelism: None,
            initial_chunk_size: DEFAULT_INITIAL_CHUNK_SIZE,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

impl ExecOptions {
    /// Options with an explicit worker pool size.
    pub fn with_degree_of_parallelism(degree: usize) -> Self {
        Self {
            degree_of_parallelism: Some(degree),
            ..Self::default()
        }
    }

    /// Validate before scheduling. FAIL FAST on caller misuse.
    ///
    /// # Errors
    ///
    /// `QueryError::InvalidArgument` when the degree of parallelism is zero
    /// or the chunk bounds are zero or inverted.
    pub fn validate(&self) -> QueryResult<()> {
        if self.degree_of_parallelism == Some(0) {
            return Err(QueryError::invalid_argument(
                "degree_of_parallelism must be at least 1",
            ));
        }
        if self.initial_chunk_size == 0 {
            return Err(QueryError::invalid_argument(
                "initial_chunk_size must be at least 1",
            ));
        }
        if self.max_chunk_size < self.initial_chunk_size {
            return Err(QueryError::invalid_argument(format!(
                "max_chunk_size {} must not be below initial_chunk_size {}",
                self.max_chunk_size, self.initial_chunk_size
            )));
        }
        Ok(())
    }

    /// Derive the partition plan for a call running on `parallelism` workers.
    pub fn plan(&self, parallelism: usize) -> PartitionPlan {
        PartitionPlan {
            partitions: parallelism.max(1),
            initial_chunk_size: self.initial_chunk_size,
            max_chunk_size: self.max_chunk_size,
        }
    }
}

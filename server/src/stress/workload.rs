//! Simulated stress workload

use async_trait::async_trait;
use dashmap::DashMap;
use rand::Rng;

use super::types::StressError;

/// One unit of simulated load against a resource
///
/// Implementations must keep a single unit short; the lifecycle wraps each
/// call in a timeout and treats an overrun as a failed run.
#[async_trait]
pub trait StressWorkload: Send + Sync {
    async fn execute_unit(&self) -> Result<(), StressError>;
}

/// Read/write "queries" against an in-memory table standing in for a database
pub struct SimulatedQueryWorkload {
    table: DashMap<u64, u64>,
    table_size: u64,
}

impl SimulatedQueryWorkload {
    pub fn new(table_size: u64) -> Self {
        Self {
            table: DashMap::new(),
            table_size: table_size.max(1),
        }
    }

    /// Number of rows written so far
    pub fn row_count(&self) -> usize {
        self.table.len()
    }
}

#[async_trait]
impl StressWorkload for SimulatedQueryWorkload {
    async fn execute_unit(&self) -> Result<(), StressError> {
        let (key, write) = {
            let mut rng = rand::rng();
            (rng.random_range(0..self.table_size), rng.random_bool(0.3))
        };

        if write {
            *self.table.entry(key).or_insert(0) += 1;
        } else {
            let _ = self.table.get(&key).map(|row| *row);
        }

        tokio::task::yield_now().await;
        Ok(())
    }
}

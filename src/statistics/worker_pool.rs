//! # Scoped worker pool
//!
//! The per-frame and per-lag statistics are embarrassingly parallel: each work item is a pure
//! function of one frame (or one lag) and the shared, read-only trajectory. [`WorkerPool`] runs
//! such batches on a dedicated `rayon` pool.
//!
//! Contract
//! -----------------
//! * A pool is built by each top-level statistics call and dropped when the call returns, so no
//!   thread outlives the computation that needed it.
//! * Default size is `max(cores − 1, 1)` threads ([`default_thread_count`]).
//! * [`WorkerPool::map_ordered`] returns results in submission order.
//! * The first work item that fails aborts the batch; no partial result is returned.
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::swarm_errors::SwarmError;

/// `max(available cores − 1, 1)`, leaving one core to the caller.
pub fn default_thread_count() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Pool sized with [`default_thread_count`].
    pub fn new() -> Result<Self, SwarmError> {
        Self::with_threads(default_thread_count())
    }

    pub fn with_threads(threads: usize) -> Result<Self, SwarmError> {
        if threads == 0 {
            return Err(SwarmError::InvalidParameter(
                "worker pool needs at least one thread".into(),
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("swarmkin-worker-{i}"))
            .build()?;
        Ok(WorkerPool { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Apply `task` to every item in parallel and collect the results in input order.
    ///
    /// Arguments
    /// -----------------
    /// * `items`: work items; each is only borrowed immutably by its task.
    /// * `task`: pure function of one item.
    ///
    /// Return
    /// ----------
    /// * `Ok(results)` with `results[i] = task(&items[i])`.
    /// * The error of a failing task; remaining tasks are abandoned.
    pub fn map_ordered<T, R, F>(&self, items: &[T], task: F) -> Result<Vec<R>, SwarmError>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> Result<R, SwarmError> + Sync + Send,
    {
        debug!(
            threads = self.threads(),
            items = items.len(),
            "dispatching parallel batch"
        );
        self.pool
            .install(|| items.par_iter().map(task).collect::<Result<Vec<R>, SwarmError>>())
    }
}

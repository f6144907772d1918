//! Bounded-parallel fan-out over units.
//!
//! Each marking step is a map/reduce over a slice of units evaluated on a
//! dedicated rayon pool; [`Dispatcher::count`] returns only once every
//! evaluation has finished.

use std::thread;

use rayon::prelude::*;

/// Worker pool configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Number of worker threads (0 = auto-detect).
    pub jobs: usize,
}

impl ParallelConfig {
    /// Create a new configuration with the given job count.
    #[must_use]
    pub fn new(jobs: usize) -> Self {
        ParallelConfig { jobs }
    }

    /// Auto-detect the number of CPUs.
    #[must_use]
    pub fn auto() -> Self {
        ParallelConfig { jobs: 0 }
    }

    /// Get the effective number of jobs.
    #[must_use]
    pub fn effective_jobs(&self) -> usize {
        if self.jobs == 0 {
            thread::available_parallelism()
                .map(std::num::NonZero::get)
                .unwrap_or(1)
        } else {
            self.jobs
        }
    }
}

/// Fans per-unit predicates out over a worker pool.
pub struct Dispatcher {
    /// `None` when the dedicated pool could not be built; work then runs on
    /// rayon's global pool.
    pool: Option<rayon::ThreadPool>,
    jobs: usize,
}

impl Dispatcher {
    pub fn new(config: ParallelConfig) -> Self {
        let jobs = config.effective_jobs();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|i| format!("recomp-worker-{i}"))
            .build();
        match pool {
            Ok(pool) => {
                tracing::debug!(jobs, "invalidation worker pool ready");
                Dispatcher {
                    pool: Some(pool),
                    jobs,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "falling back to the global rayon pool");
                Dispatcher {
                    pool: None,
                    jobs: rayon::current_num_threads(),
                }
            }
        }
    }

    /// Number of workers evaluations are spread over.
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Evaluate `predicate` for every item in parallel and count the hits.
    ///
    /// Blocks until all evaluations complete.
    pub fn count<T, F>(&self, items: &[T], predicate: F) -> usize
    where
        T: Sync,
        F: Fn(&T) -> bool + Sync + Send,
    {
        self.install(|| items.par_iter().filter(|&item| predicate(item)).count())
    }

    fn install<R, OP>(&self, op: OP) -> R
    where
        R: Send,
        OP: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher::new(ParallelConfig::auto())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("jobs", &self.jobs)
            .field("dedicated", &self.pool.is_some())
            .finish()
    }
}

//! Rayon thread pool sizing for batch scenario runs.

use rayon::ThreadPoolBuilder;
use tracing::warn;

/// How many worker threads a batch run uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerPool {
    /// `0` uses the global Rayon pool (one thread per core).
    pub workers: usize,
}

impl WorkerPool {
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Runs `f` on a pool of [workers](WorkerPool::workers) threads. If a
    /// dedicated pool cannot be built, `f` runs on the global pool instead.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                warn!(workers = self.workers, "falling back to the global pool: {err}");
                f()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn dedicated_pool_uses_requested_threads() {
        let threads = WorkerPool::with_workers(2).install(rayon::current_num_threads);
        assert_eq!(threads, 2);
    }

    #[test]
    fn results_match_across_pool_sizes() {
        let sum = |pool: WorkerPool| pool.install(|| (0..1_000u64).into_par_iter().sum::<u64>());
        assert_eq!(sum(WorkerPool::default()), sum(WorkerPool::with_workers(3)));
    }
}

// src/pipeline/parallelism.rs

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rayon::{ThreadPool, ThreadPoolBuilder};
use rayon_cond::CondIterator;

use crate::pipeline::Result;

/// Lets any collection be iterated either in parallel or serially, decided at runtime.
pub trait MaybeParallelIterator<P, S>
where
    P: ParallelIterator,
    S: Iterator<Item = P::Item>,
{
    fn into_maybe_par_iter_cond(self, cond: bool) -> CondIterator<P, S>;
}

impl<P, S, I> MaybeParallelIterator<P, S> for I
where
    I: IntoParallelIterator<Iter = P, Item = P::Item> + IntoIterator<IntoIter = S, Item = S::Item>,
    P: ParallelIterator,
    S: Iterator<Item = P::Item>,
{
    fn into_maybe_par_iter_cond(self, cond: bool) -> CondIterator<P, S> {
        CondIterator::new(self, cond)
    }
}

/// A pool sized for `num_workers` file tasks. Each pipeline phase installs its own
/// work here so the global rayon pool is left alone.
pub struct WorkerPool {
    pool: ThreadPool,
    parallel: bool,
}

impl WorkerPool {
    pub fn new(num_workers: usize) -> Result<Self> {
        let threads = num_workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("skipgram-worker-{i}"))
            .build()?;
        Ok(Self {
            pool,
            parallel: threads > 1,
        })
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

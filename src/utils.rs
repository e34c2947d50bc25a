//! Threading helpers shared by training and inference.

/// Execution strategy for data-parallel loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// Single-threaded execution.
    Sequential,
    /// Use the ambient rayon thread pool.
    #[default]
    Parallel,
}

impl Parallelism {
    /// Map a thread-count setting to a strategy. `1` means sequential;
    /// `0` means "use all cores".
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    #[inline]
    pub fn is_parallel(&self) -> bool {
        matches!(self, Parallelism::Parallel)
    }
}

/// Run `f` inside a rayon pool with `n_threads` workers.
///
/// With `n_threads == 0` the ambient pool is used as-is; with `1` the
/// closure runs sequentially without touching rayon at all.
pub fn run_with_threads<R: Send>(
    n_threads: usize,
    f: impl FnOnce(Parallelism) -> R + Send,
) -> R {
    let parallelism = Parallelism::from_threads(n_threads);
    if !parallelism.is_parallel() || n_threads == 0 {
        return f(parallelism);
    }
    match rayon::ThreadPoolBuilder::new().num_threads(n_threads).build() {
        Ok(pool) => pool.install(|| f(parallelism)),
        // Pool creation only fails when the global pool was already
        // configured; fall back to the ambient pool.
        Err(_) => f(parallelism),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_threads_mapping() {
        assert_eq!(Parallelism::from_threads(1), Parallelism::Sequential);
        assert_eq!(Parallelism::from_threads(0), Parallelism::Parallel);
        assert_eq!(Parallelism::from_threads(8), Parallelism::Parallel);
    }

    #[test]
    fn run_with_threads_returns_closure_result() {
        let out = run_with_threads(2, |p| {
            assert!(p.is_parallel());
            21 * 2
        });
        assert_eq!(out, 42);
    }
}

/// Concurrency management for exprkey.
/// Sizes the global rayon pool used for bulk hashing.

use anyhow::{Context, Result};

/// Initialize the global rayon thread pool with one worker per core.
/// Returns the number of workers.
pub fn init_thread_pool() -> Result<usize> {
    let workers = std::cmp::max(1, num_cpus::get());

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .context("global thread pool already initialized")?;

    println!("[exprkey] Initialized thread pool: {} workers", workers);

    Ok(workers)
}

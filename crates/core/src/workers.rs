use crate::error::RunError;
use rayon::{ThreadPool, ThreadPoolBuilder};

pub const DEFAULT_READ_LIMIT: usize = 5;
pub const DEFAULT_RENAME_LIMIT: usize = 30;

/// A pool with exactly `limit` workers, so at most `limit` jobs run at once.
pub fn bounded_pool(limit: usize, label: &'static str) -> Result<ThreadPool, RunError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(limit.max(1))
        .thread_name(move |index| format!("chronorename-{label}-{index}"))
        .build()?;
    Ok(pool)
}

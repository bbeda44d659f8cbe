use crate::error::{RenameFailure, RunError, Stage};
use crate::naming::RenameEntry;
use crate::planner::RenamePlan;
use crate::workers::{bounded_pool, DEFAULT_RENAME_LIMIT};
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ApplyOptions {
    pub ignore_errors: bool,
    pub rename_limit: usize,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            ignore_errors: false,
            rename_limit: DEFAULT_RENAME_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ApplyResult {
    pub renamed: usize,
    pub failed: usize,
    pub unchanged: usize,
}

pub fn apply_plan(plan: &RenamePlan, options: &ApplyOptions) -> Result<ApplyResult, RunError> {
    if plan.entries.is_empty() {
        return Ok(ApplyResult::default());
    }

    let pool = bounded_pool(options.rename_limit, "rename")?;
    let entries: Vec<&RenameEntry> = plan.entries.iter().collect();

    info!(files = entries.len(), "一時ファイル名へ退避します");
    let staged = run_phase(&pool, &plan.root, &entries, Stage::RenameToTemporary, options)?;

    info!(files = staged.len(), "最終ファイル名へリネームします");
    let finished = run_phase(&pool, &plan.root, &staged, Stage::RenameToFinal, options)?;

    let unchanged = finished.iter().filter(|entry| !entry.changed()).count();
    Ok(ApplyResult {
        renamed: finished.len(),
        failed: entries.len() - finished.len(),
        unchanged,
    })
}

/// Runs one rename phase to completion and returns the entries that moved.
fn run_phase<'a>(
    pool: &ThreadPool,
    root: &Path,
    entries: &[&'a RenameEntry],
    stage: Stage,
    options: &ApplyOptions,
) -> Result<Vec<&'a RenameEntry>, RunError> {
    let total = entries.len();
    let outcomes: Vec<(&'a RenameEntry, Result<(), RenameFailure>)> = pool.install(|| {
        entries
            .par_iter()
            .map(|entry| {
                let (from, to) = match stage {
                    Stage::RenameToFinal => (&entry.temporary, &entry.target),
                    _ => (&entry.original, &entry.temporary),
                };
                trace!(from = %from.display(), to = %to.display(), "リネーム");
                (*entry, rename_no_replace(&root.join(from), &root.join(to)))
            })
            .collect()
    });

    let mut moved = Vec::with_capacity(total);
    let mut failed = 0usize;
    for (entry, outcome) in outcomes {
        match outcome {
            Ok(()) => moved.push(entry),
            Err(err) => {
                failed += 1;
                debug!(error = %err, cause = %err.source, "{stage}失敗");
            }
        }
    }

    if failed > 0 {
        if !options.ignore_errors {
            return Err(RunError::StageFailed {
                stage,
                failed,
                total,
            });
        }
        warn!(failed, total, "{stage}に失敗したファイルをスキップしました");
    }

    Ok(moved)
}

fn rename_no_replace(from: &Path, to: &Path) -> Result<(), RenameFailure> {
    let failure = |source: io::Error| RenameFailure {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if fs::symlink_metadata(to).is_ok() {
        return Err(failure(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "リネーム先が既に存在します",
        )));
    }
    fs::rename(from, to).map_err(failure)
}

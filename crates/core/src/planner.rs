use crate::apply::{apply_plan, ApplyOptions, ApplyResult};
use crate::config::RunConfig;
use crate::error::RunError;
use crate::exif_reader::{CaptureTimeDecoder, ExifDecoder};
use crate::naming::{assign_names, RenameEntry};
use crate::resolve::{resolve_timestamps, retain_resolved};
use crate::select::select_files;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub name: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RenameStats {
    pub selected: usize,
    pub resolved: usize,
    pub skipped: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePlan {
    pub root: PathBuf,
    pub pattern: String,
    pub entries: Vec<RenameEntry>,
    pub skipped: Vec<SkippedFile>,
    pub stats: RenameStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub stats: RenameStats,
    pub skipped: Vec<SkippedFile>,
    pub applied: ApplyResult,
}

pub fn generate_plan(config: &RunConfig) -> Result<RenamePlan, RunError> {
    generate_plan_with_decoder(config, &ExifDecoder)
}

pub fn generate_plan_with_decoder(
    config: &RunConfig,
    decoder: &dyn CaptureTimeDecoder,
) -> Result<RenamePlan, RunError> {
    let pattern = config.validate()?;
    info!(root = %config.root.display(), pattern = pattern.as_str(), "並べ替えを開始します");

    let mut records = select_files(&config.root, &pattern, config.timestamp_source)?;
    let selected = records.len();

    resolve_timestamps(&config.root, &mut records, decoder, config.read_limit)?;
    let (resolved, failed) = retain_resolved(records, config.ignore_errors, pattern.as_str())?;

    let entries = assign_names(&resolved);
    let skipped: Vec<SkippedFile> = failed
        .iter()
        .map(|record| SkippedFile {
            name: record.name().to_path_buf(),
            reason: record
                .resolution_error()
                .map(ToString::to_string)
                .unwrap_or_default(),
        })
        .collect();

    let stats = RenameStats {
        selected,
        resolved: entries.len(),
        skipped: skipped.len(),
        unchanged: entries.iter().filter(|entry| !entry.changed()).count(),
    };

    Ok(RenamePlan {
        root: config.root.clone(),
        pattern: pattern.as_str().to_string(),
        entries,
        skipped,
        stats,
    })
}

pub fn run(config: &RunConfig) -> Result<RunReport, RunError> {
    run_with_decoder(config, &ExifDecoder)
}

pub fn run_with_decoder(
    config: &RunConfig,
    decoder: &dyn CaptureTimeDecoder,
) -> Result<RunReport, RunError> {
    let plan = generate_plan_with_decoder(config, decoder)?;
    let options = ApplyOptions {
        ignore_errors: config.ignore_errors,
        rename_limit: config.rename_limit,
    };
    let applied = apply_plan(&plan, &options)?;
    info!(renamed = applied.renamed, failed = applied.failed, "リネームが完了しました");

    Ok(RunReport {
        stats: plan.stats,
        skipped: plan.skipped,
        applied,
    })
}

use crate::error::{ResolveError, RunError, Stage};
use crate::exif_reader::{parse_capture_time, CaptureTimeDecoder};
use crate::metadata::{FileRecord, Resolution, TimestampSource};
use crate::workers::bounded_pool;
use chrono::{DateTime, Local, NaiveDateTime};
use rayon::prelude::*;
use std::fs::{self, Metadata};
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info, trace};

/// Each record is resolved from its own `source`: filesystem fields are read in
/// sequence, capture metadata inside a pool of `read_limit` workers.
pub fn resolve_timestamps(
    root: &Path,
    records: &mut [FileRecord],
    decoder: &dyn CaptureTimeDecoder,
    read_limit: usize,
) -> Result<(), RunError> {
    info!(files = records.len(), "タイムスタンプを取得します");

    for record in records
        .iter_mut()
        .filter(|record| !record.source.is_capture_metadata())
    {
        let path = root.join(record.name());
        let meta = fs::metadata(&path).map_err(|err| RunError::io(&path, err))?;
        record.resolution = match filesystem_time(&meta, record.source) {
            Ok(ts) => Resolution::Resolved(ts),
            Err(err) => Resolution::Failed(err),
        };
    }

    let captured: Vec<&mut FileRecord> = records
        .iter_mut()
        .filter(|record| record.source.is_capture_metadata())
        .collect();
    if captured.is_empty() {
        return Ok(());
    }

    let pool = bounded_pool(read_limit, "read")?;
    let total = captured.len();
    pool.install(|| {
        captured.into_par_iter().enumerate().for_each(|(index, record)| {
            trace!(name = %record.name().display(), "{}/{}", index + 1, total);
            record.resolution = match resolve_capture_time(&root.join(record.name()), decoder) {
                Ok(ts) => Resolution::Resolved(ts),
                Err(err) => Resolution::Failed(err),
            };
        });
    });
    Ok(())
}

/// Drops or rejects records whose timestamp could not be resolved.
pub fn retain_resolved(
    records: Vec<FileRecord>,
    ignore_errors: bool,
    pattern: &str,
) -> Result<(Vec<FileRecord>, Vec<FileRecord>), RunError> {
    let total = records.len();
    let (resolved, failed): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|record| record.timestamp().is_some());

    for record in &failed {
        if let Some(err) = record.resolution_error() {
            debug!(name = %record.name().display(), error = %err, "タイムスタンプ取得失敗");
        }
    }

    if !failed.is_empty() && !ignore_errors {
        return Err(RunError::StageFailed {
            stage: Stage::Resolve,
            failed: failed.len(),
            total,
        });
    }
    if resolved.is_empty() {
        return Err(RunError::NoMatch {
            pattern: pattern.to_string(),
        });
    }
    if !failed.is_empty() {
        info!(skipped = failed.len(), "取得できなかったファイルを除外しました");
    }

    Ok((resolved, failed))
}

fn resolve_capture_time(
    path: &Path,
    decoder: &dyn CaptureTimeDecoder,
) -> Result<NaiveDateTime, ResolveError> {
    let raw = decoder
        .read_capture_time(path)
        .map_err(|err| ResolveError::Decode(format!("{err:#}")))?
        .ok_or(ResolveError::MissingCaptureTime)?;
    parse_capture_time(&raw).ok_or(ResolveError::UnparsableTimestamp(raw))
}

fn filesystem_time(meta: &Metadata, source: TimestampSource) -> Result<NaiveDateTime, ResolveError> {
    let time = match source {
        TimestampSource::Atime => meta.accessed(),
        TimestampSource::Mtime => meta.modified(),
        TimestampSource::Birthtime => meta.created(),
        TimestampSource::Ctime => return change_time(meta),
        TimestampSource::Exif => return Err(ResolveError::Unsupported(source.label())),
    };
    time.map(to_local)
        .map_err(|_| ResolveError::Unsupported(source.label()))
}

#[cfg(unix)]
fn change_time(meta: &Metadata) -> Result<NaiveDateTime, ResolveError> {
    use std::os::unix::fs::MetadataExt;

    let nanos = u32::try_from(meta.ctime_nsec()).unwrap_or(0);
    DateTime::from_timestamp(meta.ctime(), nanos)
        .map(|utc| utc.with_timezone(&Local).naive_local())
        .ok_or(ResolveError::Unsupported("ctime"))
}

#[cfg(not(unix))]
fn change_time(_meta: &Metadata) -> Result<NaiveDateTime, ResolveError> {
    Err(ResolveError::Unsupported("ctime"))
}

fn to_local(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

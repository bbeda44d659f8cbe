mod apply;
mod config;
mod error;
mod exif_reader;
mod metadata;
mod naming;
mod planner;
mod resolve;
mod select;
mod workers;

pub use apply::{apply_plan, ApplyOptions, ApplyResult};
pub use config::{
    app_paths, load_config, save_config, AppConfig, AppPaths, RunConfig, DEFAULT_PATTERN,
};
pub use error::{RenameFailure, ResolveError, RunError, Stage};
pub use exif_reader::{parse_capture_time, CaptureTimeDecoder, ExifDecoder};
pub use metadata::{FileRecord, Resolution, TimestampSource};
pub use naming::{assign_names, timestamp_key, RenameEntry};
pub use planner::{
    generate_plan, generate_plan_with_decoder, run, run_with_decoder, RenamePlan, RenameStats,
    RunReport, SkippedFile,
};
pub use resolve::{resolve_timestamps, retain_resolved};
pub use select::{select_files, FilePattern};
pub use workers::{DEFAULT_READ_LIMIT, DEFAULT_RENAME_LIMIT};

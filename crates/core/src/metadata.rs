use crate::error::ResolveError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    #[default]
    Exif,
    Atime,
    Ctime,
    Mtime,
    Birthtime,
}

impl TimestampSource {
    pub fn is_capture_metadata(self) -> bool {
        matches!(self, TimestampSource::Exif)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimestampSource::Exif => "exif",
            TimestampSource::Atime => "atime",
            TimestampSource::Ctime => "ctime",
            TimestampSource::Mtime => "mtime",
            TimestampSource::Birthtime => "birthtime",
        }
    }
}

impl fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Default)]
pub enum Resolution {
    #[default]
    Pending,
    Resolved(NaiveDateTime),
    Failed(ResolveError),
}

#[derive(Debug)]
pub struct FileRecord {
    name: PathBuf,
    pub source: TimestampSource,
    pub resolution: Resolution,
}

impl FileRecord {
    pub fn new(name: PathBuf, source: TimestampSource) -> Self {
        Self {
            name,
            source,
            resolution: Resolution::Pending,
        }
    }

    /// Path relative to the batch root.
    pub fn name(&self) -> &Path {
        &self.name
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self.resolution {
            Resolution::Resolved(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn resolution_error(&self) -> Option<&ResolveError> {
        match &self.resolution {
            Resolution::Failed(err) => Some(err),
            _ => None,
        }
    }
}

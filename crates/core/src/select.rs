use crate::error::RunError;
use crate::metadata::{FileRecord, TimestampSource};
use globset::{GlobBuilder, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct FilePattern {
    raw: String,
    matcher: GlobMatcher,
    recursive: bool,
}

impl FilePattern {
    /// Patterns are relative to the batch root; a leading `./` is dropped.
    pub fn new(pattern: &str) -> Result<Self, RunError> {
        let mut pattern = pattern.trim();
        while let Some(rest) = pattern.strip_prefix("./") {
            pattern = rest;
        }
        if pattern.is_empty() {
            return Err(RunError::Input("パターンが空です".to_string()));
        }

        let matcher = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|err| RunError::Input(format!("パターンが不正です: {pattern} ({err})")))?
            .compile_matcher();

        Ok(Self {
            raw: pattern.to_string(),
            matcher,
            recursive: pattern.contains('/'),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn is_match(&self, relative: &Path) -> bool {
        self.matcher.is_match(relative)
    }
}

pub fn select_files(
    root: &Path,
    pattern: &FilePattern,
    source: TimestampSource,
) -> Result<Vec<FileRecord>, RunError> {
    debug!(root = %root.display(), pattern = pattern.as_str(), "フォルダを走査します");

    let mut names = if pattern.is_recursive() {
        walk_matching(root, pattern)?
    } else {
        list_matching(root, pattern)?
    };

    if names.is_empty() {
        return Err(RunError::NoMatch {
            pattern: pattern.as_str().to_string(),
        });
    }
    names.sort();
    debug!(count = names.len(), "パターンに一致するファイル");

    Ok(names
        .into_iter()
        .map(|name| FileRecord::new(name, source))
        .collect())
}

fn list_matching(root: &Path, pattern: &FilePattern) -> Result<Vec<PathBuf>, RunError> {
    let mut out = Vec::new();
    for entry in fs::read_dir(root).map_err(|err| RunError::io(root, err))? {
        let entry = entry.map_err(|err| RunError::io(root, err))?;
        let name = PathBuf::from(entry.file_name());
        let matched = pattern.is_match(&name);
        trace!(name = %name.display(), matched, "エントリ");
        if matched && is_regular_file(&entry.path())? {
            out.push(name);
        }
    }
    Ok(out)
}

fn walk_matching(root: &Path, pattern: &FilePattern) -> Result<Vec<PathBuf>, RunError> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(root).to_path_buf();
            RunError::io(path, err.into())
        })?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let matched = pattern.is_match(relative);
        trace!(name = %relative.display(), matched, "エントリ");
        if matched && is_regular_file(entry.path())? {
            out.push(relative.to_path_buf());
        }
    }
    Ok(out)
}

fn is_regular_file(path: &Path) -> Result<bool, RunError> {
    let meta = fs::metadata(path).map_err(|err| RunError::io(path, err))?;
    Ok(meta.is_file())
}

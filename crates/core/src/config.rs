use crate::error::RunError;
use crate::metadata::TimestampSource;
use crate::select::FilePattern;
use crate::workers::{DEFAULT_READ_LIMIT, DEFAULT_RENAME_LIMIT};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_PATTERN: &str = "*.jpg";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pattern: String,
    pub timestamp_source: TimestampSource,
    pub ignore_errors: bool,
    pub read_limit: usize,
    pub rename_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            timestamp_source: TimestampSource::Exif,
            ignore_errors: false,
            read_limit: DEFAULT_READ_LIMIT,
            rename_limit: DEFAULT_RENAME_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub root: PathBuf,
    pub pattern: String,
    pub timestamp_source: TimestampSource,
    pub ignore_errors: bool,
    pub read_limit: usize,
    pub rename_limit: usize,
}

impl RunConfig {
    pub fn from_app_config(root: PathBuf, config: &AppConfig) -> Self {
        Self {
            root,
            pattern: config.pattern.clone(),
            timestamp_source: config.timestamp_source,
            ignore_errors: config.ignore_errors,
            read_limit: config.read_limit,
            rename_limit: config.rename_limit,
        }
    }

    /// Checks everything that can be checked without reading the batch.
    pub fn validate(&self) -> Result<FilePattern, RunError> {
        let meta = fs::metadata(&self.root).map_err(|_| {
            RunError::Input(format!(
                "フォルダが存在しないか読めません: {}",
                self.root.display()
            ))
        })?;
        if !meta.is_dir() {
            return Err(RunError::Input(format!(
                "フォルダではありません: {}",
                self.root.display()
            )));
        }
        if self.read_limit == 0 || self.rename_limit == 0 {
            return Err(RunError::Input("同時実行数は1以上にしてください".to_string()));
        }
        FilePattern::new(&self.pattern)
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "chronorename", "chronorename")
        .context("OS標準設定ディレクトリを取得できませんでした")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    if !paths.config_path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(&paths.config_path).with_context(|| {
        format!(
            "設定ファイルを読めませんでした: {}",
            paths.config_path.display()
        )
    })?;

    parse_config(&raw)
}

pub fn save_config(config: &AppConfig) -> Result<PathBuf> {
    let paths = app_paths()?;
    fs::create_dir_all(&paths.config_dir).with_context(|| {
        format!(
            "設定ディレクトリを作成できませんでした: {}",
            paths.config_dir.display()
        )
    })?;
    let body = toml::to_string_pretty(config).context("設定のシリアライズに失敗しました")?;
    fs::write(&paths.config_path, body).with_context(|| {
        format!(
            "設定ファイルを書き込めませんでした: {}",
            paths.config_path.display()
        )
    })?;
    Ok(paths.config_path)
}

fn parse_config(raw: &str) -> Result<AppConfig> {
    toml::from_str::<AppConfig>(raw).context("設定ファイルのパースに失敗しました")
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Resolve,
    RenameToTemporary,
    RenameToFinal,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Resolve => "タイムスタンプ取得",
            Stage::RenameToTemporary => "一時リネーム",
            Stage::RenameToFinal => "最終リネーム",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("入力が不正です: {0}")]
    Input(String),

    #[error("パターンに一致するファイルがありません: {pattern}")]
    NoMatch { pattern: String },

    #[error("{stage}に失敗しました: {failed}/{total}件")]
    StageFailed {
        stage: Stage,
        failed: usize,
        total: usize,
    },

    #[error("ファイル情報を読めませんでした: {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ワーカープールを起動できませんでした")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl RunError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("メタデータを読めませんでした: {0}")]
    Decode(String),

    #[error("撮影日時がありません")]
    MissingCaptureTime,

    #[error("日時を解析できませんでした: {0:?}")]
    UnparsableTimestamp(String),

    #[error("このファイルシステムでは{0}を取得できません")]
    Unsupported(&'static str),
}

#[derive(Debug, Error)]
#[error("リネームに失敗しました: {} -> {}", .from.display(), .to.display())]
pub struct RenameFailure {
    pub from: PathBuf,
    pub to: PathBuf,
    #[source]
    pub source: io::Error,
}

#[cfg(test)]
mod tests {
    use super::{RunError, Stage};

    #[test]
    fn stage_failure_names_stage_and_count() {
        let err = RunError::StageFailed {
            stage: Stage::Resolve,
            failed: 2,
            total: 5,
        };
        assert_eq!(err.to_string(), "タイムスタンプ取得に失敗しました: 2/5件");
    }

    #[test]
    fn io_error_keeps_source() {
        let err = RunError::io(
            "/tmp/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("/tmp/missing"));
    }
}

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

/// Result alias used throughout the numeric engine.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Every failure the engine can report back to the session.
///
/// Validation always happens before a dataset is touched, so receiving any
/// of these means the dataset is exactly as it was before the call.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The file has no numeric data boundary, or a data row is malformed.
    #[error("{}: {reason}", location(.path, .line))]
    Parse {
        path: PathBuf,
        /// 1-based line in the source file, when a specific row is at fault.
        line: Option<usize>,
        reason: String,
    },

    /// Appended file row count disagrees with the loaded matrix.
    #[error("dimension mismatch: loaded data has {expected} rows, appended file has {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// The operation needs state that has not been established yet.
    #[error("{0}")]
    State(String),

    /// User-supplied value (anchor list, smoothing parameter) is invalid.
    #[error("invalid value: {0}")]
    Value(String),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Flat discriminant of [`EngineError`], handy for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    DimensionMismatch,
    State,
    Value,
    Io,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Parse { .. } => ErrorKind::Parse,
            EngineError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            EngineError::State(_) => ErrorKind::State,
            EngineError::Value(_) => ErrorKind::Value,
            EngineError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: Option<usize>, reason: impl Into<String>) -> Self {
        EngineError::Parse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_loaded() -> Self {
        EngineError::State("no dataset loaded".to_string())
    }
}

fn location(path: &std::path::Path, line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("{}:{line}", path.display()),
        None => path.display().to_string(),
    }
}

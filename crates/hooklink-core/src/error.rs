use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HooklinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Interpreter '{program}' is not available: {detail}")]
    InterpreterUnavailable { program: String, detail: String },

    #[error("{0}")]
    InterpreterMissing(String),

    #[error("Failed to run git: {0}")]
    GitUnavailable(std::io::Error),

    #[error("Error finding git repository root from {}. Are you inside a git repository? {detail}", .start.display())]
    NotARepository { start: PathBuf, detail: String },

    #[error("Source hooks directory does not exist: {}", .0.display())]
    SourceDirMissing(PathBuf),

    #[error("Target hooks directory does not exist: {}", .0.display())]
    TargetDirMissing(PathBuf),

    #[error("{0}")]
    Other(String),
}

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FilesizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Watcher error for {path}: {source}")]
    Watcher {
        path: PathBuf,
        source: notify::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, FilesizeError>;

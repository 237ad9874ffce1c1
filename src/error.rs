use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Rejected scan inputs. Raised before any background work starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please choose a folder.")]
    EmptyFolder,

    #[error("The selected path is not a directory.")]
    NotADirectory(PathBuf),

    #[error("Please enter the text to search for.")]
    EmptyNeedle,
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Cannot read folder '{}': {source}", path.display())]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("An unexpected error occurred: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;

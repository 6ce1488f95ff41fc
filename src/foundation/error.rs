use std::{path::PathBuf, time::Duration};

pub type StudioResult<T> = Result<T, StudioError>;

#[derive(thiserror::Error, Debug)]
pub enum StudioError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("media error: {0}")]
    Media(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StudioError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }
}

/// Failure of a single narration request. Always recoverable for the caller.
#[derive(thiserror::Error, Debug)]
pub enum SynthesisError {
    #[error("speech engine failed: {0}")]
    Engine(String),

    #[error("speech engine produced no audio at '{}'", .0.display())]
    EmptyOutput(PathBuf),

    #[error("speech synthesis timed out after {0:?}")]
    Timeout(Duration),

    #[error("speech worker could not run: {0}")]
    Worker(#[source] std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SynthesisError {
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }
}

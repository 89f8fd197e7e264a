use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, RenderError>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Failed to read input {}: {source}", path.display())]
    InputReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed input in {}: {message}", path.display())]
    MalformedInput { path: PathBuf, message: String },

    #[error("Failed to write output {}: {source}", path.display())]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Font load error for {}: {message}", path.display())]
    FontLoad { path: PathBuf, message: String },
}

impl RenderError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::InputReadError {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWriteError {
            path: path.into(),
            source,
        }
    }
}

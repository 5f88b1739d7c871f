use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, EmissiveError>;

/// Every way a single filter run can stop.
///
/// `MissingInput` is the expected "nothing to do" case; everything else is a
/// processing failure.
#[derive(thiserror::Error, Debug)]
pub enum EmissiveError {
    #[error("source texture not found, expected it at {}", .path.display())]
    MissingInput { path: PathBuf },

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode mask: {0}")]
    Encode(#[source] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pixel buffer: expected {expected} bytes, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl EmissiveError {
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingInput { .. })
    }
}

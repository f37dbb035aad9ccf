//! Render error types.

use std::io;
use std::path::PathBuf;

/// Error writing a rendered diagram.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// Output file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Layout could not be serialized.
    #[error("failed to serialize layout: {0}")]
    Json(#[from] serde_json::Error),
}

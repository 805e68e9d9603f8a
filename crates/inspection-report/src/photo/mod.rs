//! Extraction of photos embedded in observations.
//!
//! Photos arrive as `data:image/<ext>;base64,<payload>` strings. Each one is
//! decoded and handed to a [`PhotoSink`], which persists it and returns the
//! reference to put in the report.
//!
//! Failures here never abort a run: a photo that cannot be recognized,
//! decoded or written becomes a diagnostic comment in the markup.

mod data_uri;
mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use data_uri::{photo_file_name, preview, DataUri};
pub use store::{ImageStore, PhotoSink};

/// A recoverable failure while extracting a single photo.
#[derive(Error, Debug)]
pub enum PhotoError {
    /// The string is not a `data:image/<ext>;base64,` URI.
    #[error("unrecognized image data URI")]
    Unrecognized,

    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The decoded image could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Destination of the image file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl PhotoError {
    /// Check if the photo string did not look like an image data URI at all.
    #[must_use]
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized)
    }
}

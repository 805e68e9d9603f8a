//! Persisting decoded photos.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{photo_file_name, DataUri, PhotoError};
use crate::error::{Error, Result};

/// Destination for decoded photos.
///
/// The report renderer only knows about this trait, so rendering can be
/// exercised without touching the file system.
pub trait PhotoSink {
    /// Decode and store photo `index` of observation `observation_id`.
    ///
    /// Returns the reference to embed in the markup, relative to the report.
    ///
    /// # Errors
    ///
    /// Returns a [`PhotoError`] if the photo cannot be decoded or stored.
    fn store(
        &mut self,
        observation_id: &str,
        index: usize,
        photo: &DataUri<'_>,
    ) -> std::result::Result<String, PhotoError>;
}

/// Writes photos as individual files into the report's images directory.
#[derive(Debug)]
pub struct ImageStore {
    /// Directory receiving the image files.
    dir: PathBuf,
    /// Directory name as referenced from the markup document.
    reference_prefix: String,
    /// Number of files written so far.
    written: usize,
}

impl ImageStore {
    /// Open an image store at `dir`, creating the directory if needed.
    ///
    /// `reference_prefix` is the directory as seen from the report file,
    /// usually its last component (`images`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreate`] if the directory cannot be created.
    pub fn create(dir: impl Into<PathBuf>, reference_prefix: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
            path: dir.clone(),
            source,
        })?;

        Ok(Self {
            dir,
            reference_prefix: reference_prefix.into(),
            written: 0,
        })
    }

    /// The directory holding the image files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of image files written by this store.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }
}

impl PhotoSink for ImageStore {
    fn store(
        &mut self,
        observation_id: &str,
        index: usize,
        photo: &DataUri<'_>,
    ) -> std::result::Result<String, PhotoError> {
        let bytes = photo.decode()?;
        let file_name = photo_file_name(observation_id, index, photo.extension());
        let path = self.dir.join(&file_name);

        std::fs::write(&path, &bytes).map_err(|source| PhotoError::Write {
            path: path.clone(),
            source,
        })?;
        self.written += 1;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(format!("{}/{file_name}", self.reference_prefix))
    }
}

//! Generated image files

use super::error::StorageError;
use crate::domain::types::{ImageData, extension_for};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Directory of generated images named `{task_id}_{index}.{ext}`
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(task_id: &str, index: usize, mime_type: &str) -> String {
        format!("{task_id}_{index}.{}", extension_for(mime_type))
    }

    /// Write an image and return its file name.
    pub async fn save(
        &self,
        task_id: &str,
        index: usize,
        image: &ImageData,
    ) -> Result<String, StorageError> {
        let filename = Self::file_name(task_id, index, &image.mime_type);
        let path = self.resolve(&filename)?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::io(&self.dir, e))?;
        fs::write(&path, &image.bytes)
            .await
            .map_err(|e| StorageError::io(&path, e))?;
        debug!(path = %path.display(), bytes = image.bytes.len(), "Image saved");
        Ok(filename)
    }

    /// Path for a file name, rejecting anything that could leave the directory.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let valid = !filename.is_empty()
            && !filename.starts_with('.')
            && !filename.contains("..")
            && !filename.contains(['/', '\\', '\0']);
        if !valid {
            return Err(StorageError::invalid(filename));
        }
        Ok(self.dir.join(filename))
    }

    /// Bytes and guessed content type of a stored file
    pub async fn read(&self, filename: &str) -> Result<(Vec<u8>, String), StorageError> {
        let path = self.resolve(filename)?;
        let bytes = fs::read(&path)
            .await
            .map_err(|e| StorageError::from_read(filename, &path, e))?;
        let mime = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok((bytes, mime))
    }

    pub async fn read_image(&self, filename: &str) -> Result<ImageData, StorageError> {
        let (bytes, mime) = self.read(filename).await?;
        Ok(ImageData::new(mime, bytes))
    }

    /// Remove a file; a file that is already gone is not an error.
    pub async fn remove(&self, filename: &str) -> Result<(), StorageError> {
        let path = self.resolve(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::io(&path, err)),
        }
    }
}

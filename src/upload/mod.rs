//! Upload directory module
//!
//! Validates and stores uploaded images. The admin upload endpoint and event
//! creation both go through [`UploadDir::save`].

pub mod filename;

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::logger;
use crate::store::timestamp;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file selected")]
    EmptyFilename,
    #[error("Invalid file type")]
    InvalidType,
    #[error("failed to save upload: {0}")]
    Io(#[from] io::Error),
}

/// Directory that receives uploaded files
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    /// Use `root` as the upload directory, creating it if absent
    pub fn create(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Validate the client filename, write `data` under a generated name and
    /// return that name.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, UploadError> {
        if original_name.is_empty() {
            return Err(UploadError::EmptyFilename);
        }
        if !filename::allowed_file(original_name) {
            return Err(UploadError::InvalidType);
        }

        let safe_name = filename::secure_filename(original_name);
        let stored_name = filename::timestamped(&safe_name, timestamp::now());
        tokio::fs::write(self.root.join(&stored_name), data).await?;

        logger::log_info(&format!(
            "[Upload] Stored '{original_name}' as {stored_name} ({} bytes)",
            data.len()
        ));
        Ok(stored_name)
    }
}

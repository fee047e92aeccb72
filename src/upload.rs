//! Client-side checks for data source uploads.
//!
//! Only `.csv` files up to the configured size are accepted. Both checks run
//! before the file is read and before any request is issued.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{megabytes_label, ValidationError};

/// Upload limit used when the settings do not override it.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A validated file, ready to be sent as the multipart `file` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Checks the file name and size against the upload rules.
pub fn validate_upload(file_name: &str, size: u64, max_bytes: u64) -> Result<(), ValidationError> {
    if !file_name.to_lowercase().ends_with(".csv") {
        return Err(ValidationError::UnsupportedFileType {
            file_name: file_name.to_string(),
        });
    }
    if size > max_bytes {
        return Err(ValidationError::FileTooLarge {
            size,
            limit: max_bytes,
            limit_label: megabytes_label(max_bytes),
        });
    }
    Ok(())
}

impl UploadFile {
    /// Validates `path` from its name and metadata, then reads it.
    pub fn from_path(path: &Path, max_bytes: u64) -> Result<Self, ValidationError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let unreadable = |err: std::io::Error| ValidationError::UnreadableFile {
            path: path.display().to_string(),
            reason: err.to_string(),
        };

        // Type first: a missing `notes.txt` should still read as a type error.
        if !file_name.to_lowercase().ends_with(".csv") {
            return Err(ValidationError::UnsupportedFileType { file_name });
        }
        let metadata = fs::metadata(path).map_err(unreadable)?;
        validate_upload(&file_name, metadata.len(), max_bytes)?;

        let bytes = fs::read(path).map_err(unreadable)?;
        debug!("Prepared upload {} ({} bytes)", file_name, bytes.len());
        Ok(Self { file_name, bytes })
    }
}

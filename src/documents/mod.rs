//! Document management for docquery
//!
//! This module contains the in-session document registry, the simulated
//! upload pipeline that feeds it, and the store that backs deletion.

pub mod registry;
pub mod store;
pub mod upload;

pub use registry::{DeleteConfirmation, DocumentRegistry, PendingUpload};
pub use store::{create_document_store, DocumentStore, HttpDocumentStore, LocalDocumentStore};
pub use upload::{UploadEvent, UploadSimulator};

use crate::error::{DocQueryError, Result};

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// The only media type accepted for upload
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Unique document identifier within a registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file offered for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub size: u64,
    /// Declared media type; `None` when it cannot be determined
    pub media_type: Option<String>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, size: u64, media_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            size,
            media_type: media_type.map(str::to_string),
        }
    }

    /// Describe a local file, deriving its media type from the extension
    ///
    /// # Errors
    ///
    /// Returns error if the file metadata cannot be read or the path is
    /// not a regular file
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            DocQueryError::Upload(format!("Cannot read {}: {}", path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(
                DocQueryError::Upload(format!("{} is not a file", path.display())).into(),
            );
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| DocQueryError::Upload(format!("{} has no file name", path.display())))?;

        Ok(Self {
            name,
            size: metadata.len(),
            media_type: media_type_for(path).map(str::to_string),
        })
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type.as_deref() == Some(PDF_MEDIA_TYPE)
    }
}

fn media_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some(PDF_MEDIA_TYPE),
        "txt" => Some("text/plain"),
        "md" => Some("text/markdown"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

/// Metadata for one processed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: DocId,
    pub name: String,
    pub size: u64,
    /// Simulated page count
    pub pages: u32,
    pub uploaded_on: NaiveDate,
}

impl Document {
    /// Upload date as `YYYY-MM-DD`
    pub fn upload_date(&self) -> String {
        self.uploaded_on.format("%Y-%m-%d").to_string()
    }
}

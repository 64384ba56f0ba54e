//! In-session document registry
//!
//! Holds processed documents (most recent first) and the transient
//! progress entries of uploads still being processed. Nothing here is
//! persisted.

use crate::documents::{DocId, Document, UploadFile};

use chrono::{Local, Utc};

/// Highest progress an upload can show before it completes
pub const PROGRESS_CAP: u8 = 90;

/// An upload between selection and completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub id: DocId,
    pub name: String,
    pub size: u64,
    /// Percentage in `0..=PROGRESS_CAP`
    pub progress: u8,
}

/// Proof that a delete was requested and not cancelled
///
/// Only [`DocumentRegistry::request_delete`] creates one, so a document
/// cannot be removed without passing through the confirmation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    id: DocId,
    name: String,
}

impl DeleteConfirmation {
    pub fn id(&self) -> &DocId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Document list plus upload progress
///
/// # Examples
///
/// ```
/// use docquery::documents::{DocumentRegistry, UploadFile};
///
/// let mut registry = DocumentRegistry::new();
/// let id = registry
///     .begin_upload(UploadFile::new("terms.pdf", 2048, Some("application/pdf")))
///     .unwrap();
/// assert_eq!(registry.upload_progress(&id), Some(0));
///
/// registry.complete_upload(&id, 12);
/// assert_eq!(registry.document_count(), 1);
/// assert_eq!(registry.total_pages(), 12);
/// ```
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
    uploads: Vec<PendingUpload>,
    pending_delete: Option<DeleteConfirmation>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking an upload at 0%
    ///
    /// Files whose media type is not PDF are dropped and `None` is returned.
    pub fn begin_upload(&mut self, file: UploadFile) -> Option<DocId> {
        if !file.is_pdf() {
            tracing::debug!(
                name = %file.name,
                media_type = ?file.media_type,
                "Skipping non-PDF upload"
            );
            return None;
        }

        let id = self.allocate_id(&file.name);
        tracing::info!(id = %id, size = file.size, "Upload started");
        self.uploads.push(PendingUpload {
            id: id.clone(),
            name: file.name,
            size: file.size,
            progress: 0,
        });
        Some(id)
    }

    /// Start tracking every PDF in a batch, returning the accepted ids in order
    pub fn begin_uploads<I>(&mut self, files: I) -> Vec<DocId>
    where
        I: IntoIterator<Item = UploadFile>,
    {
        files
            .into_iter()
            .filter_map(|file| self.begin_upload(file))
            .collect()
    }

    /// Add `increment` to an upload's progress, capped at [`PROGRESS_CAP`]
    ///
    /// Returns the new progress, or `None` for an unknown id.
    pub fn advance_upload(&mut self, id: &DocId, increment: u8) -> Option<u8> {
        let upload = self.uploads.iter_mut().find(|u| &u.id == id)?;
        let next = upload.progress.saturating_add(increment).min(PROGRESS_CAP);
        upload.progress = upload.progress.max(next);
        Some(upload.progress)
    }

    /// Turn a pending upload into a document at the head of the list
    ///
    /// Returns `None` when no upload with `id` is pending.
    pub fn complete_upload(&mut self, id: &DocId, pages: u32) -> Option<&Document> {
        let index = self.uploads.iter().position(|u| &u.id == id)?;
        let upload = self.uploads.remove(index);

        tracing::info!(id = %upload.id, pages, "Upload complete");
        self.documents.insert(
            0,
            Document {
                id: upload.id,
                name: upload.name,
                size: upload.size,
                pages,
                uploaded_on: Local::now().date_naive(),
            },
        );
        self.documents.first()
    }

    /// Progress of a pending upload
    pub fn upload_progress(&self, id: &DocId) -> Option<u8> {
        self.uploads.iter().find(|u| &u.id == id).map(|u| u.progress)
    }

    /// Pending uploads in selection order
    pub fn uploads(&self) -> &[PendingUpload] {
        &self.uploads
    }

    /// Documents, most recent first
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: &DocId) -> Option<&Document> {
        self.documents.iter().find(|d| &d.id == id)
    }

    /// Resolve a 1-based list position or a document id
    pub fn lookup(&self, key: &str) -> Option<&Document> {
        if let Ok(position) = key.parse::<usize>() {
            if let Some(document) = position
                .checked_sub(1)
                .and_then(|index| self.documents.get(index))
            {
                return Some(document);
            }
        }
        self.documents.iter().find(|d| d.id.as_str() == key)
    }

    /// Ask to delete a document; the list is not changed
    ///
    /// Replaces any earlier unconfirmed request. Returns `None` for an
    /// unknown id.
    pub fn request_delete(&mut self, id: &DocId) -> Option<DeleteConfirmation> {
        let document = self.get(id)?;
        let confirmation = DeleteConfirmation {
            id: document.id.clone(),
            name: document.name.clone(),
        };
        self.pending_delete = Some(confirmation.clone());
        Some(confirmation)
    }

    /// The unconfirmed delete request, if any
    pub fn pending_delete(&self) -> Option<&DeleteConfirmation> {
        self.pending_delete.as_ref()
    }

    /// Remove the document named by a still-pending confirmation
    ///
    /// A confirmation that was cancelled or superseded removes nothing.
    pub fn confirm_delete(&mut self, confirmation: &DeleteConfirmation) -> Option<Document> {
        if self.pending_delete.as_ref() != Some(confirmation) {
            tracing::debug!(id = %confirmation.id, "Ignoring stale delete confirmation");
            return None;
        }
        self.pending_delete = None;

        let index = self.documents.iter().position(|d| d.id == confirmation.id)?;
        let removed = self.documents.remove(index);
        tracing::info!(id = %removed.id, "Document deleted");
        Some(removed)
    }

    /// Drop the pending delete request; returns `false` when there was none
    pub fn cancel_delete(&mut self) -> bool {
        self.pending_delete.take().is_some()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn total_pages(&self) -> u64 {
        self.documents.iter().map(|d| u64::from(d.pages)).sum()
    }

    pub fn total_size(&self) -> u64 {
        self.documents.iter().map(|d| d.size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn allocate_id(&self, name: &str) -> DocId {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let candidate = DocId(format!("{}-{}", name, millis));
            if !self.contains_id(&candidate) {
                return candidate;
            }
            millis += 1;
        }
    }

    fn contains_id(&self, id: &DocId) -> bool {
        self.documents.iter().any(|d| &d.id == id) || self.uploads.iter().any(|u| &u.id == id)
    }
}

use async_trait::async_trait;
use mime::Mime;
use tracing::debug;

/// Per-document size ceiling enforced before anything is stored.
pub const MAX_DOCUMENT_BYTES: u64 = 500 * 1024;

/// A file the user selected through the external picker.
#[derive(Debug, Clone, PartialEq)]
pub struct PickedFile {
    pub file_name: String,
    pub mime_type: Mime,
    pub size_bytes: u64,
    pub bytes: Vec<u8>,
}

/// A picked file bound to the required-document label it satisfies.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedDocument {
    pub document_type: String,
    pub file: PickedFile,
}

/// Result of one picker invocation. Cancelling the native picker is a normal
/// outcome, not an error.
#[derive(Debug)]
pub enum PickOutcome {
    Selected(PickedFile),
    Cancelled,
}

/// External file-selection capability. Suspends until the user completes or
/// cancels the native picker.
#[async_trait]
pub trait FilePicker: Send + Sync {
    async fn pick(&self, document_type: &str) -> Result<PickOutcome, FileError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error(
        "The selected file ({size}) exceeds the maximum allowed size of {limit}. \
         Please select a smaller file or compress the current file.",
        size = format_file_size(*.size_bytes),
        limit = format_file_size(MAX_DOCUMENT_BYTES)
    )]
    TooLarge { size_bytes: u64 },
    #[error("failed to read the selected file: {0}")]
    Unreadable(#[from] std::io::Error),
}

/// What `DocumentIntake::attach` reports back to the caller.
#[derive(Debug, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached { file_name: String, size_bytes: u64 },
    Cancelled,
}

/// The set of documents selected so far, at most one per document type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentSet {
    documents: Vec<UploadedDocument>,
}

impl AttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document, replacing any earlier selection for the same type.
    /// The replacement moves to the end, which also fixes its position in the
    /// indexed upload arrays.
    pub fn store(&mut self, document: UploadedDocument) {
        self.documents
            .retain(|existing| existing.document_type != document.document_type);
        self.documents.push(document);
    }

    pub fn get(&self, document_type: &str) -> Option<&UploadedDocument> {
        self.documents
            .iter()
            .find(|doc| doc.document_type == document_type)
    }

    pub fn contains(&self, document_type: &str) -> bool {
        self.get(document_type).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UploadedDocument> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn to_vec(&self) -> Vec<UploadedDocument> {
        self.documents.clone()
    }
}

/// Mediates picker invocations and maintains the attachment set invariants.
pub struct DocumentIntake<P> {
    picker: P,
    attachments: AttachmentSet,
}

impl<P: FilePicker> DocumentIntake<P> {
    pub fn new(picker: P) -> Self {
        Self {
            picker,
            attachments: AttachmentSet::new(),
        }
    }

    pub fn attachments(&self) -> &AttachmentSet {
        &self.attachments
    }

    /// Ask the user for a file covering `document_type`. Cancellation leaves
    /// existing attachments untouched; an oversized selection is rejected
    /// without being stored.
    pub async fn attach(&mut self, document_type: &str) -> Result<AttachOutcome, FileError> {
        let file = match self.picker.pick(document_type).await? {
            PickOutcome::Selected(file) => file,
            PickOutcome::Cancelled => {
                debug!(document_type, "document selection cancelled");
                return Ok(AttachOutcome::Cancelled);
            }
        };

        if file.size_bytes > MAX_DOCUMENT_BYTES {
            return Err(FileError::TooLarge {
                size_bytes: file.size_bytes,
            });
        }

        let outcome = AttachOutcome::Attached {
            file_name: file.file_name.clone(),
            size_bytes: file.size_bytes,
        };
        debug!(document_type, file_name = %file.file_name, size_bytes = file.size_bytes, "document attached");
        self.attachments.store(UploadedDocument {
            document_type: document_type.to_string(),
            file,
        });
        Ok(outcome)
    }
}

/// Human-readable byte count for user-facing messages only.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{} KB", (bytes + 512) / 1024)
    } else {
        format!("{} MB", (bytes + 512 * 1024) / (1024 * 1024))
    }
}

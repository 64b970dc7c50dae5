use serde::Deserialize;
use serde::Serialize;

use crate::query::TagLabel;

/// The `data` part of a `saveDocumentEntry` multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPayload {
    pub major_head: String,
    pub minor_head: String,
    /// `DD-MM-YYYY`, see [`crate::UPLOAD_DATE_FORMAT`].
    pub document_date: String,
    pub document_remarks: String,
    pub tags: Vec<TagLabel>,
    pub user_id: String,
    #[serde(skip)]
    pub file: Option<FileAttachment>,
}

/// File bytes plus the metadata the multipart `file` part needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

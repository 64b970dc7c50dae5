//! Wire schemas and collaborator seams shared by the docsearch crates.
//!
//! Everything the remote document service sends or receives is described
//! here with explicit serde types. Loosely shaped payloads are validated at
//! this boundary and rejected as [`ServiceError::Malformed`] instead of being
//! handed to the search engine.

mod category;
mod document;
mod otp;
mod query;
mod service;
mod tag;
mod upload;

pub use category::Category;
pub use category::CategoryTable;
pub use document::Document;
pub use document::PreviewKind;
pub use otp::OtpChallenge;
pub use otp::VerifiedSession;
pub use query::CriteriaQuery;
pub use query::SearchDocumentsRequest;
pub use query::SearchValue;
pub use query::TagLabel;
pub use service::DocumentPage;
pub use service::DocumentSearchService;
pub use service::DocumentUploadService;
pub use service::OtpService;
pub use service::ServiceError;
pub use service::TagPage;
pub use service::TagSearchService;
pub use tag::Tag;
pub use upload::FileAttachment;
pub use upload::UploadPayload;
pub use upload::UploadReceipt;

/// Wire format for every date the service accepts in search filters.
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format for the `document_date` field of an upload.
pub const UPLOAD_DATE_FORMAT: &str = "%d-%m-%Y";

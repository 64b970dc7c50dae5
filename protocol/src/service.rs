use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::document::Document;
use crate::otp::OtpChallenge;
use crate::otp::VerifiedSession;
use crate::query::CriteriaQuery;
use crate::tag::Tag;
use crate::upload::UploadPayload;
use crate::upload::UploadReceipt;

/// One page of documents, in the order the service delivered them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentPage {
    pub items: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagPage {
    pub items: Vec<Tag>,
}

/// Failure reported by a remote collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("session token was rejected")]
    Unauthorized,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Malformed(err.to_string())
    }
}

/// Paged document search.
#[async_trait]
pub trait DocumentSearchService: Send + Sync {
    async fn search_documents(
        &self,
        criteria: &CriteriaQuery,
        offset: usize,
        length: usize,
        free_text: &str,
    ) -> Result<DocumentPage, ServiceError>;
}

/// Tag autocomplete lookup.
#[async_trait]
pub trait TagSearchService: Send + Sync {
    async fn search_tags(&self, term: &str) -> Result<TagPage, ServiceError>;
}

#[async_trait]
pub trait DocumentUploadService: Send + Sync {
    async fn upload_document(&self, payload: &UploadPayload)
    -> Result<UploadReceipt, ServiceError>;
}

/// OTP based session issuance.
#[async_trait]
pub trait OtpService: Send + Sync {
    async fn request_otp(&self, challenge: &OtpChallenge) -> Result<(), ServiceError>;

    /// `Ok(None)` means the service accepted the request but issued no token.
    async fn verify_otp(
        &self,
        challenge: &OtpChallenge,
    ) -> Result<Option<VerifiedSession>, ServiceError>;
}

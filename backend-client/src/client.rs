use async_trait::async_trait;
use docsearch_login::AuthSession;
use docsearch_protocol::CriteriaQuery;
use docsearch_protocol::Document;
use docsearch_protocol::DocumentPage;
use docsearch_protocol::DocumentSearchService;
use docsearch_protocol::DocumentUploadService;
use docsearch_protocol::OtpChallenge;
use docsearch_protocol::OtpService;
use docsearch_protocol::SearchDocumentsRequest;
use docsearch_protocol::ServiceError;
use docsearch_protocol::Tag;
use docsearch_protocol::TagPage;
use docsearch_protocol::TagSearchService;
use docsearch_protocol::UploadPayload;
use docsearch_protocol::UploadReceipt;
use docsearch_protocol::VerifiedSession;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use tracing::warn;

use crate::config::BackendConfig;

const TOKEN_HEADER: &str = "token";

/// `{ "data": ... }`, the wrapper every endpoint answers with. `data` may be
/// missing or null.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct IssuedToken {
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct TagQuery<'a> {
    term: &'a str,
}

/// Talks to the document management API. Clones share the connection pool
/// and the session.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: BackendConfig,
    session: AuthSession,
}

impl BackendClient {
    pub fn new(config: BackendConfig, session: AuthSession) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(transport)?;
        Ok(Self {
            http,
            config,
            session,
        })
    }

    fn headers(&self) -> Result<HeaderMap, ServiceError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.session.token() {
            let value = HeaderValue::from_str(&token)
                .map_err(|err| ServiceError::Transport(format!("invalid session token: {err}")))?;
            headers.insert(TOKEN_HEADER, value);
        }
        Ok(headers)
    }

    fn post(&self, endpoint: &str) -> Result<RequestBuilder, ServiceError> {
        Ok(self
            .http
            .post(self.config.endpoint(endpoint))
            .headers(self.headers()?))
    }

    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(endpoint, "POST");
        let response = self
            .post(endpoint)?
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        read_json(endpoint, response).await
    }
}

async fn read_json<T: DeserializeOwned>(
    endpoint: &str,
    response: Response,
) -> Result<T, ServiceError> {
    let body = read_body(endpoint, response).await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn read_body(endpoint: &str, response: Response) -> Result<Vec<u8>, ServiceError> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport)?;
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        warn!(endpoint, %status, "session token rejected");
        return Err(ServiceError::Unauthorized);
    }
    if !status.is_success() {
        warn!(endpoint, %status, "request failed");
        return Err(ServiceError::Http {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    Ok(body.to_vec())
}

fn transport(err: reqwest::Error) -> ServiceError {
    ServiceError::Transport(err.to_string())
}

#[async_trait]
impl DocumentSearchService for BackendClient {
    async fn search_documents(
        &self,
        criteria: &CriteriaQuery,
        offset: usize,
        length: usize,
        free_text: &str,
    ) -> Result<DocumentPage, ServiceError> {
        let request = SearchDocumentsRequest::new(criteria, offset, length, free_text);
        let envelope: Envelope<Vec<Document>> =
            self.post_json("searchDocumentEntry", &request).await?;
        Ok(DocumentPage {
            items: envelope.data.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl TagSearchService for BackendClient {
    async fn search_tags(&self, term: &str) -> Result<TagPage, ServiceError> {
        let envelope: Envelope<Vec<Tag>> =
            self.post_json("documentTags", &TagQuery { term }).await?;
        Ok(TagPage {
            items: envelope.data.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl OtpService for BackendClient {
    async fn request_otp(&self, challenge: &OtpChallenge) -> Result<(), ServiceError> {
        let response = self
            .post("generateOTP")?
            .json(challenge)
            .send()
            .await
            .map_err(transport)?;
        read_body("generateOTP", response).await?;
        debug!("otp requested");
        Ok(())
    }

    async fn verify_otp(
        &self,
        challenge: &OtpChallenge,
    ) -> Result<Option<VerifiedSession>, ServiceError> {
        let envelope: Envelope<IssuedToken> = self.post_json("validateOTP", challenge).await?;
        Ok(envelope
            .data
            .and_then(|issued| issued.token)
            .filter(|token| !token.is_empty())
            .map(|token| VerifiedSession { token }))
    }
}

#[async_trait]
impl DocumentUploadService for BackendClient {
    async fn upload_document(
        &self,
        payload: &UploadPayload,
    ) -> Result<UploadReceipt, ServiceError> {
        let Some(file) = &payload.file else {
            return Err(ServiceError::Malformed(
                "upload payload carries no file".to_string(),
            ));
        };
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(transport)?;
        let form = Form::new()
            .part("file", part)
            .text("data", serde_json::to_string(payload)?);

        debug!(file = %file.name, "uploading document");
        let response = self
            .post("saveDocumentEntry")?
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        read_json("saveDocumentEntry", response).await
    }
}

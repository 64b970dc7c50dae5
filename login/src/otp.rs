use docsearch_protocol::OtpChallenge;
use docsearch_protocol::OtpService;
use docsearch_protocol::ServiceError;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::session::AuthSession;
use crate::storage::TokenStoreError;

pub const MIN_MOBILE_DIGITS: usize = 10;
pub const MIN_OTP_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("enter a valid 10-digit mobile number")]
    InvalidMobileNumber,

    #[error("enter the 4-digit code that was sent to you")]
    InvalidOtp,

    #[error("no access token received")]
    MissingToken,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Storage(#[from] TokenStoreError),
}

/// Strip everything but ASCII digits from user input.
pub fn sanitize_digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

fn normalize_mobile(mobile_number: &str) -> Result<String, LoginError> {
    let digits = sanitize_digits(mobile_number);
    if digits.len() < MIN_MOBILE_DIGITS {
        return Err(LoginError::InvalidMobileNumber);
    }
    Ok(digits)
}

/// Ask the service to send a one-time code. Returns the normalized number the
/// code was sent to, which must be passed back to [`verify_otp`].
pub async fn request_otp(
    service: &dyn OtpService,
    mobile_number: &str,
) -> Result<String, LoginError> {
    let mobile_number = normalize_mobile(mobile_number)?;
    service
        .request_otp(&OtpChallenge::request(mobile_number.clone()))
        .await?;
    debug!("otp requested");
    Ok(mobile_number)
}

/// Exchange a one-time code for a token and sign `session` in with it.
pub async fn verify_otp(
    service: &dyn OtpService,
    session: &AuthSession,
    mobile_number: &str,
    otp: &str,
) -> Result<(), LoginError> {
    let mobile_number = normalize_mobile(mobile_number)?;
    let otp = otp.trim();
    if otp.chars().count() < MIN_OTP_LEN {
        return Err(LoginError::InvalidOtp);
    }

    let verified = service
        .verify_otp(&OtpChallenge::verify(mobile_number, otp))
        .await?;
    let Some(verified) = verified.filter(|verified| !verified.token.is_empty()) else {
        warn!("otp verification succeeded without a token");
        return Err(LoginError::MissingToken);
    };
    session.sign_in(verified.token)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryTokenStore;
    use async_trait::async_trait;
    use docsearch_protocol::VerifiedSession;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubOtp {
        token: Option<String>,
        calls: Mutex<Vec<OtpChallenge>>,
    }

    #[async_trait]
    impl OtpService for StubOtp {
        async fn request_otp(&self, challenge: &OtpChallenge) -> Result<(), ServiceError> {
            self.calls.lock().unwrap().push(challenge.clone());
            Ok(())
        }

        async fn verify_otp(
            &self,
            challenge: &OtpChallenge,
        ) -> Result<Option<VerifiedSession>, ServiceError> {
            self.calls.lock().unwrap().push(challenge.clone());
            Ok(self.token.clone().map(|token| VerifiedSession { token }))
        }
    }

    fn session() -> AuthSession {
        AuthSession::new(Arc::new(InMemoryTokenStore::default()))
    }

    #[test]
    fn sanitize_keeps_only_digits() {
        assert_eq!(sanitize_digits("+91 (987) 654-3210"), "919876543210");
    }

    #[tokio::test]
    async fn short_mobile_number_is_rejected_before_any_request() {
        let service = StubOtp::default();
        let result = request_otp(&service, "98-76").await;
        assert!(matches!(result, Err(LoginError::InvalidMobileNumber)));
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn request_sends_sanitized_number() -> anyhow::Result<()> {
        let service = StubOtp::default();
        let sent_to = request_otp(&service, "98765 43210").await?;
        assert_eq!(sent_to, "9876543210");
        assert_eq!(
            *service.calls.lock().unwrap(),
            vec![OtpChallenge::request("9876543210")]
        );
        Ok(())
    }

    #[tokio::test]
    async fn short_otp_is_rejected() {
        let service = StubOtp::default();
        let result = verify_otp(&service, &session(), "9876543210", "12").await;
        assert!(matches!(result, Err(LoginError::InvalidOtp)));
    }

    #[tokio::test]
    async fn missing_token_leaves_session_signed_out() {
        let service = StubOtp::default();
        let session = session();
        let result = verify_otp(&service, &session, "9876543210", "1234").await;
        assert!(matches!(result, Err(LoginError::MissingToken)));
        assert!(!session.is_signed_in());
    }

    #[tokio::test]
    async fn successful_verification_signs_in() -> anyhow::Result<()> {
        let service = StubOtp {
            token: Some("tok".to_string()),
            ..Default::default()
        };
        let session = session();
        verify_otp(&service, &session, "9876543210", "1234").await?;
        assert_eq!(session.token().as_deref(), Some("tok"));
        Ok(())
    }
}

use serde::Deserialize;
use serde::Serialize;

/// Body of `POST /generateOTP` and, with `otp` set, `POST /validateOTP`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub mobile_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

impl OtpChallenge {
    pub fn request(mobile_number: impl Into<String>) -> Self {
        Self {
            mobile_number: mobile_number.into(),
            otp: None,
        }
    }

    pub fn verify(mobile_number: impl Into<String>, otp: impl Into<String>) -> Self {
        Self {
            mobile_number: mobile_number.into(),
            otp: Some(otp.into()),
        }
    }
}

/// Result of a successful OTP verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedSession {
    pub token: String,
}

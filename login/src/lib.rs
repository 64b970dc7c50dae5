//! Session issuance and persistence.
//!
//! An [`AuthSession`] is created once at start-up (restoring any persisted
//! token), handed to whatever needs the token, and torn down on sign-out.
//! There is no process-wide session; callers pass it explicitly.

mod otp;
mod session;
mod storage;

pub use otp::LoginError;
pub use otp::MIN_MOBILE_DIGITS;
pub use otp::MIN_OTP_LEN;
pub use otp::request_otp;
pub use otp::sanitize_digits;
pub use otp::verify_otp;
pub use session::AuthSession;
pub use storage::FileTokenStore;
pub use storage::InMemoryTokenStore;
pub use storage::StoredToken;
pub use storage::TokenStore;
pub use storage::TokenStoreError;

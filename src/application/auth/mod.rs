//! Admin credential handling: salted password digests and signed bearer tokens.

mod password;
mod service;
mod token;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub use password::{DIGEST_HEX_LEN, hash_password, is_digest, verify_password};
pub use service::{
    ADMIN_PASSWORD_HASH_ENV, AuthError, ChangePasswordCommand, CredentialEngine, MIN_PASSWORD_LEN,
    PasswordChange, PasswordChangeError, admin_hash_env_line, extract_token,
};
pub use token::{TokenClaims, TokenSigner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

/// Payload carried by admin session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPayload {
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub login_time: OffsetDateTime,
}

impl AdminPayload {
    pub fn now() -> Self {
        Self {
            role: Role::Admin,
            login_time: OffsetDateTime::now_utc(),
        }
    }
}

pub type AdminClaims = TokenClaims<AdminPayload>;

impl CredentialEngine {
    pub fn issue_admin_token(&self) -> Result<String, AuthError> {
        self.generate_token(AdminPayload::now())
    }
}

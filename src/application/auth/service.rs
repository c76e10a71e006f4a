use std::time::Duration;

use axum::http::{HeaderMap, header::AUTHORIZATION};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::warn;

use crate::config::AuthSettings;

use super::{
    password,
    token::{TokenClaims, TokenSigner},
};

const BEARER_PREFIX: &str = "Bearer ";
pub const MIN_PASSWORD_LEN: usize = 6;
pub const ADMIN_PASSWORD_HASH_ENV: &str = "ADMIN_PASSWORD_HASH";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error(transparent)]
    PasswordChange(#[from] PasswordChangeError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordChangeError {
    #[error("current, new and confirmation passwords are all required")]
    MissingFields,
    #[error("new password and confirmation do not match")]
    ConfirmationMismatch,
    #[error("new password must be at least {min} characters")]
    TooShort { min: usize },
    #[error("current password is incorrect")]
    IncorrectCurrent,
}

#[derive(Debug, Clone, Default)]
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Outcome of a password change: the digest the operator has to deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub new_hash: String,
    pub env_line: String,
}

/// Single-admin credential service: password digests and bearer tokens.
///
/// Immutable after construction; configuration is read once at start-up.
pub struct CredentialEngine {
    salt: String,
    admin_password_hash: String,
    signer: TokenSigner,
    lifetime_label: String,
}

impl CredentialEngine {
    pub fn new(
        salt: impl Into<String>,
        token_secret: &str,
        token_lifetime: Duration,
        admin_password_hash: impl Into<String>,
    ) -> Self {
        Self {
            salt: salt.into(),
            admin_password_hash: admin_password_hash.into(),
            signer: TokenSigner::new(token_secret, token_lifetime),
            lifetime_label: format_lifetime(token_lifetime),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        for key in &settings.defaulted {
            warn!(
                target = "homeblog::auth",
                key = *key,
                "using insecure built-in default; configure this secret before deploying"
            );
        }

        let mut engine = Self::new(
            settings.password_salt.clone(),
            &settings.token_secret,
            settings.token_lifetime,
            settings.admin_password_hash.clone(),
        );
        engine.lifetime_label = settings.token_lifetime_label.clone();
        engine
    }

    pub fn hash_password(&self, plaintext: &str) -> String {
        password::hash_password(plaintext, &self.salt)
    }

    pub fn verify_password(&self, plaintext: &str, stored_digest: &str) -> bool {
        password::verify_password(plaintext, &self.salt, stored_digest)
    }

    pub fn verify_admin_password(&self, plaintext: &str) -> bool {
        self.verify_password(plaintext, &self.admin_password_hash)
    }

    pub fn generate_token<P: Serialize>(&self, payload: P) -> Result<String, AuthError> {
        self.signer.issue(payload)
    }

    pub fn verify_token<P: DeserializeOwned>(&self, token: &str) -> Option<TokenClaims<P>> {
        self.signer.verify(token)
    }

    pub fn authenticate_request<P: DeserializeOwned>(
        &self,
        headers: &HeaderMap,
    ) -> Option<TokenClaims<P>> {
        extract_token(headers).and_then(|token| self.verify_token(token))
    }

    /// Validate a password change against the configured admin credential.
    ///
    /// The engine does not persist anything; the caller hands the returned
    /// digest to the operator.
    pub fn change_password(
        &self,
        command: &ChangePasswordCommand,
    ) -> Result<PasswordChange, AuthError> {
        if command.current_password.is_empty()
            || command.new_password.is_empty()
            || command.confirm_password.is_empty()
        {
            return Err(PasswordChangeError::MissingFields.into());
        }
        if command.new_password != command.confirm_password {
            return Err(PasswordChangeError::ConfirmationMismatch.into());
        }
        if command.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PasswordChangeError::TooShort {
                min: MIN_PASSWORD_LEN,
            }
            .into());
        }
        if !self.verify_admin_password(&command.current_password) {
            return Err(PasswordChangeError::IncorrectCurrent.into());
        }

        let new_hash = self.hash_password(&command.new_password);
        Ok(PasswordChange {
            env_line: admin_hash_env_line(&new_hash),
            new_hash,
        })
    }

    /// Lifetime as configured, e.g. `24h`, reported to clients as `expiresIn`.
    pub fn token_lifetime_label(&self) -> &str {
        &self.lifetime_label
    }
}

/// Bearer token from the `Authorization` header, if present.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

pub fn admin_hash_env_line(digest: &str) -> String {
    format!("{ADMIN_PASSWORD_HASH_ENV}={digest}")
}

fn format_lifetime(lifetime: Duration) -> String {
    let secs = lifetime.as_secs();
    match secs {
        0 => "0s".to_string(),
        s if s % 86_400 == 0 => format!("{}d", s / 86_400),
        s if s % 3_600 == 0 => format!("{}h", s / 3_600),
        s if s % 60 == 0 => format!("{}m", s / 60),
        s => format!("{s}s"),
    }
}

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::OffsetDateTime;
use tracing::debug;

use super::AuthError;

/// Verified token contents: the caller's payload plus issuance metadata.
///
/// The payload is flattened into the claim set, so it must not define its own
/// `iat` or `exp` fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims<P> {
    #[serde(flatten)]
    pub payload: P,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds. The token is valid strictly before this instant.
    pub exp: i64,
}

/// HS256 signer/verifier with a fixed lifetime applied at issuance.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        }
    }

    pub fn issue<P: Serialize>(&self, payload: P) -> Result<String, AuthError> {
        self.issue_at(payload, OffsetDateTime::now_utc().unix_timestamp())
    }

    pub(crate) fn issue_at<P: Serialize>(
        &self,
        payload: P,
        issued_at: i64,
    ) -> Result<String, AuthError> {
        let lifetime = i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX);
        let claims = TokenClaims {
            payload,
            iat: issued_at,
            exp: issued_at.saturating_add(lifetime),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    /// Decode and check a token. Every failure collapses to `None`.
    pub fn verify<P: DeserializeOwned>(&self, token: &str) -> Option<TokenClaims<P>> {
        self.verify_at(token, OffsetDateTime::now_utc().unix_timestamp())
    }

    pub(crate) fn verify_at<P: DeserializeOwned>(
        &self,
        token: &str,
        now: i64,
    ) -> Option<TokenClaims<P>> {
        let claims = match decode::<TokenClaims<P>>(token, &self.decoding, &self.validation) {
            Ok(data) => data.claims,
            Err(err) => {
                debug!(
                    target = "homeblog::auth::token",
                    error = %err,
                    "token rejected"
                );
                return None;
            }
        };

        if now >= claims.exp {
            debug!(
                target = "homeblog::auth::token",
                exp = claims.exp,
                now,
                "token expired"
            );
            return None;
        }

        Some(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Payload {
        role: String,
        note: String,
    }

    fn payload() -> Payload {
        Payload {
            role: "admin".into(),
            note: "hello".into(),
        }
    }

    #[test]
    fn issued_token_round_trips_payload_and_metadata() {
        let signer = TokenSigner::new("secret", Duration::from_secs(3600));
        let token = signer.issue(payload()).expect("token");

        let claims: TokenClaims<Payload> = signer.verify(&token).expect("valid token");
        assert_eq!(claims.payload, payload());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn zero_lifetime_token_is_already_expired() {
        let signer = TokenSigner::new("secret", Duration::ZERO);
        let token = signer.issue(payload()).expect("token");

        assert!(signer.verify::<Payload>(&token).is_none());
    }

    #[test]
    fn token_fails_once_clock_passes_expiry() {
        let signer = TokenSigner::new("secret", Duration::from_secs(60));
        let issued_at = OffsetDateTime::now_utc().unix_timestamp();
        let token = signer.issue_at(payload(), issued_at).expect("token");

        assert!(signer.verify_at::<Payload>(&token, issued_at + 59).is_some());
        assert!(signer.verify_at::<Payload>(&token, issued_at + 60).is_none());
        assert!(signer.verify_at::<Payload>(&token, issued_at + 3600).is_none());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = TokenSigner::new("secret-a", Duration::from_secs(60));
        let verifier = TokenSigner::new("secret-b", Duration::from_secs(60));
        let token = issuer.issue(payload()).expect("token");

        assert!(verifier.verify::<Payload>(&token).is_none());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let signer = TokenSigner::new("secret", Duration::from_secs(60));
        assert!(signer.verify::<Payload>("").is_none());
        assert!(signer.verify::<Payload>("not-a-token").is_none());
        assert!(signer.verify::<Payload>("a.b.c").is_none());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let signer = TokenSigner::new("secret", Duration::from_secs(60));
        let token = signer.issue(payload()).expect("token");
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = "eyJyb2xlIjoiYWRtaW4iLCJub3RlIjoiZm9yZ2VkIiwiaWF0IjowLCJleHAiOjk5OTk5OTk5OTl9";
        parts[1] = forged;

        assert!(signer.verify::<Payload>(&parts.join(".")).is_none());
    }
}

//! Session token issuance and verification (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use catalog_core::UserId;

use crate::{Identity, Role, SessionClaims, TokenValidationError, validate_claims};

/// Lifetime of a session token, in seconds, unless configured otherwise.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not match")]
    BadSignature,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error(transparent)]
    Window(#[from] TokenValidationError),

    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("failed to encode token: {0}")]
    Encode(String),
}

/// A freshly signed session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies signed, time-bounded session tokens.
///
/// Validity is purely a function of signature and expiry; nothing is stored
/// server-side.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &SecretString, ttl: Duration) -> Result<Self, TokenError> {
        let secret = secret.expose_secret().as_bytes();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        // Expiry is checked by `validate_claims` against an explicit clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: UserId, role: Role) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, role, Utc::now())
    }

    pub fn issue_at(&self, subject: UserId, role: Role, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.ttl;
        let claims = SessionClaims::new(subject, role, now, expires_at);

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))?;

        debug!(subject = %subject, role = %claims.role, "issued session token");

        Ok(IssuedToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        validate_claims(&data.claims, now)?;

        Ok(Identity::from_claims(data.claims))
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(
            &SecretString::from(secret.to_string()),
            Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        )
        .unwrap()
    }

    #[test]
    fn issue_then_verify_returns_subject_and_role() {
        let svc = service("test-secret");
        let subject = UserId::new();

        let issued = svc.issue(subject, Role::admin()).unwrap();
        let identity = svc.verify(&issued.token).unwrap();

        assert_eq!(identity.subject(), subject);
        assert_eq!(identity.role(), &Role::admin());
    }

    #[test]
    fn expiry_is_one_ttl_after_issue() {
        let svc = service("test-secret");
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let issued = svc.issue_at(UserId::new(), Role::user(), now).unwrap();
        assert_eq!(issued.expires_at, now + Duration::hours(1));
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service("test-secret");
        let issued_at = Utc::now() - Duration::hours(2);
        let issued = svc.issue_at(UserId::new(), Role::user(), issued_at).unwrap();

        let err = svc.verify(&issued.token).unwrap_err();
        assert_eq!(err, TokenError::Window(TokenValidationError::Expired));
    }

    #[test]
    fn token_is_valid_until_expiry_instant() {
        let svc = service("test-secret");
        let now = Utc::now();
        let issued = svc.issue_at(UserId::new(), Role::user(), now).unwrap();

        assert!(svc.verify_at(&issued.token, now + Duration::minutes(59)).is_ok());
        assert!(svc.verify_at(&issued.token, issued.expires_at).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = service("secret-one");
        let verifier = service("secret-two");
        let issued = issuer.issue(UserId::new(), Role::admin()).unwrap();

        assert_eq!(verifier.verify(&issued.token).unwrap_err(), TokenError::BadSignature);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let svc = service("test-secret");
        let user = svc.issue(UserId::new(), Role::user()).unwrap();
        let admin = svc.issue(UserId::new(), Role::admin()).unwrap();

        // Splice the admin payload onto the user's signature.
        let user_parts: Vec<&str> = user.token.split('.').collect();
        let admin_parts: Vec<&str> = admin.token.split('.').collect();
        let forged = format!("{}.{}.{}", user_parts[0], admin_parts[1], user_parts[2]);

        assert!(svc.verify(&forged).is_err());
    }

    #[test]
    fn garbage_is_malformed() {
        let svc = service("test-secret");
        assert!(matches!(svc.verify("invalid.token.here"), Err(TokenError::Malformed(_))));
        assert!(matches!(svc.verify(""), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn empty_secret_is_refused() {
        let err = TokenService::new(&SecretString::from(String::new()), Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
            .unwrap_err();
        assert_eq!(err, TokenError::EmptySecret);
    }
}

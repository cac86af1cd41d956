//! Bearer Token Service
//!
//! Signs and verifies time-bounded bearer tokens carrying a subject.
//!
//! ## Format
//! HS256/384/512 JWT via `jsonwebtoken`
//! - header: `{"alg": <configured>, "typ": "JWT"}`
//! - payload: `{"sub": <username>, "iat": <unix secs>, "exp": <unix secs>}`
//!
//! ## Failure mapping
//! - signature mismatch: `InvalidSignature`
//! - unparseable token, header naming another algorithm, missing `exp`: `Malformed`
//! - `sub` absent or empty: `MissingSubject`
//! - `exp <= now`: `Expired`
//!
//! Expiry is checked here against the caller's clock, with no leeway.
//! Tokens are stateless; there is no revocation list.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use derive_more::Display;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::config::AuthConfig;

// ============================================================================
// Algorithm
// ============================================================================

/// Symmetric signing algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum TokenAlgorithm {
    #[default]
    #[display("HS256")]
    Hs256,
    #[display("HS384")]
    Hs384,
    #[display("HS512")]
    Hs512,
}

impl TokenAlgorithm {
    fn jwt(self) -> Algorithm {
        match self {
            TokenAlgorithm::Hs256 => Algorithm::HS256,
            TokenAlgorithm::Hs384 => Algorithm::HS384,
            TokenAlgorithm::Hs512 => Algorithm::HS512,
        }
    }
}

/// Unsupported algorithm name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported token algorithm: {0} (expected HS256, HS384 or HS512)")]
pub struct UnsupportedAlgorithm(pub String);

impl FromStr for TokenAlgorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(TokenAlgorithm::Hs256),
            "HS384" => Ok(TokenAlgorithm::Hs384),
            "HS512" => Ok(TokenAlgorithm::Hs512),
            _ => Err(UnsupportedAlgorithm(s.to_string())),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Token verification failures
///
/// All are terminal; the caller must re-authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token signature does not match")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token is malformed")]
    Malformed,

    #[error("Token has no subject")]
    MissingSubject,
}

impl TokenError {
    /// Short reason code for logs
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
            TokenError::Malformed => "malformed_token",
            TokenError::MissingSubject => "missing_subject",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
            JwtErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

#[derive(Serialize)]
struct IssuedClaims<'a> {
    sub: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct ReceivedClaims {
    #[serde(default)]
    sub: Option<String>,
    exp: i64,
}

// ============================================================================
// Service
// ============================================================================

/// Token signer/verifier bound to the process-wide key
#[derive(Clone)]
pub struct TokenService {
    config: Arc<AuthConfig>,
}

impl TokenService {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    /// Issue a token for `subject` valid for `ttl`
    pub fn issue(
        &self,
        subject: &str,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Issue with an explicit clock
    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = now.timestamp();
        let exp = iat.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));

        encode(
            &Header::new(self.config.token_algorithm.jwt()),
            &IssuedClaims { sub: subject, iat, exp },
            &EncodingKey::from_secret(&self.config.token_secret),
        )
    }

    /// Verify a token and return its subject
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify with an explicit clock
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let mut validation = Validation::new(self.config.token_algorithm.jwt());
        validation.leeway = 0;
        // `exp` must be present; its comparison happens below against `now`
        validation.validate_exp = false;

        let data = decode::<ReceivedClaims>(
            token,
            &DecodingKey::from_secret(&self.config.token_secret),
            &validation,
        )?;

        let subject = data
            .claims
            .sub
            .filter(|s| !s.is_empty())
            .ok_or(TokenError::MissingSubject)?;

        if data.claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn service(secret: &str) -> TokenService {
        TokenService::new(Arc::new(AuthConfig::new(secret)))
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn sign_raw(claims: &serde_json::Value, algorithm: Algorithm, secret: &[u8]) -> String {
        encode(&Header::new(algorithm), claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service("secret");
        let token = tokens.issue("alice", Duration::from_secs(1800)).unwrap();
        assert_eq!(tokens.verify(&token), Ok("alice".to_string()));
    }

    #[test]
    fn test_structure() {
        let token = service("secret")
            .issue_at("alice", Duration::from_secs(60), fixed_now())
            .unwrap();
        assert_eq!(token.split('.').count(), 3);

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
        assert_eq!(header.typ.as_deref(), Some("JWT"));

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let payload = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &validation,
        )
        .unwrap()
        .claims;
        assert_eq!(payload["sub"], "alice");
        assert_eq!(payload["iat"], fixed_now().timestamp());
        assert_eq!(payload["exp"], fixed_now().timestamp() + 60);
    }

    #[test]
    fn test_expiry_boundary() {
        let tokens = service("secret");
        let now = fixed_now();
        let token = tokens
            .issue_at("alice", Duration::from_secs(1800), now)
            .unwrap();

        assert!(tokens.verify_at(&token, now + chrono::Duration::seconds(1799)).is_ok());
        assert_eq!(
            tokens.verify_at(&token, now + chrono::Duration::seconds(1800)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let tokens = service("secret");
        let token = tokens.issue_at("alice", Duration::ZERO, fixed_now()).unwrap();
        assert_eq!(
            tokens.verify_at(&token, fixed_now()),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_tampered_byte_is_invalid_signature() {
        let tokens = service("secret");
        let token = tokens.issue("alice", Duration::from_secs(600)).unwrap();

        // Flip one character of the signature segment
        let mut bytes = token.into_bytes();
        let target = bytes.len() - 2;
        bytes[target] = if bytes[target] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(tokens.verify(&tampered), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload_is_invalid_signature() {
        let tokens = service("secret");
        let token = tokens.issue("alice", Duration::from_secs(600)).unwrap();
        let forged = sign_raw(
            &json!({"sub": "mallory", "exp": 9_999_999_999i64}),
            Algorithm::HS256,
            b"other-secret",
        );

        // alice's header and signature around mallory's payload
        let parts: Vec<&str> = token.split('.').collect();
        let forged_payload = forged.split('.').nth(1).unwrap();
        let spliced = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(tokens.verify(&spliced), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_other_key_is_invalid_signature() {
        let token = service("key-one")
            .issue("alice", Duration::from_secs(600))
            .unwrap();
        assert_eq!(
            service("key-two").verify(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_wrong_segment_count_is_malformed() {
        let tokens = service("secret");
        assert_eq!(tokens.verify("abc.def"), Err(TokenError::Malformed));
        assert_eq!(tokens.verify(""), Err(TokenError::Malformed));
        assert_eq!(tokens.verify("a.b.c.d"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_garbage_segments_are_malformed() {
        let tokens = service("secret");
        assert_eq!(tokens.verify("abc.def.ghi"), Err(TokenError::Malformed));
        assert_eq!(tokens.verify("not a token"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_missing_expiry_is_malformed() {
        let token = sign_raw(&json!({"sub": "alice"}), Algorithm::HS256, b"secret");
        assert_eq!(service("secret").verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_missing_subject() {
        let token = sign_raw(&json!({"exp": 9_999_999_999i64}), Algorithm::HS256, b"secret");
        assert_eq!(
            service("secret").verify(&token),
            Err(TokenError::MissingSubject)
        );

        let empty = sign_raw(
            &json!({"sub": "", "exp": 9_999_999_999i64}),
            Algorithm::HS256,
            b"secret",
        );
        assert_eq!(
            service("secret").verify(&empty),
            Err(TokenError::MissingSubject)
        );
    }

    #[test]
    fn test_algorithm_mismatch_is_malformed() {
        let hs512 = TokenService::new(Arc::new(AuthConfig {
            token_algorithm: TokenAlgorithm::Hs512,
            ..AuthConfig::new("secret")
        }));
        let token = hs512.issue("alice", Duration::from_secs(60)).unwrap();
        assert_eq!(hs512.verify(&token), Ok("alice".to_string()));

        // Same key, different configured algorithm
        assert_eq!(service("secret").verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!("HS256".parse::<TokenAlgorithm>(), Ok(TokenAlgorithm::Hs256));
        assert_eq!("hs512".parse::<TokenAlgorithm>(), Ok(TokenAlgorithm::Hs512));
        assert!("RS256".parse::<TokenAlgorithm>().is_err());
        assert_eq!(TokenAlgorithm::Hs384.to_string(), "HS384");
    }
}

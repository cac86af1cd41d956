//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use crate::application::token::TokenAlgorithm;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Process-wide token signing key
    pub token_secret: Vec<u8>,
    /// HMAC algorithm for bearer tokens
    pub token_algorithm: TokenAlgorithm,
    /// Lifetime of tokens issued by `/token` (30 minutes)
    pub access_token_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: vec![0u8; 32],
            token_algorithm: TokenAlgorithm::default(),
            access_token_ttl: Duration::from_secs(30 * 60), // 30 minutes
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with a given signing key
    pub fn new(token_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            token_secret: token_secret.into(),
            ..Default::default()
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_algorithm", &self.token_algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .field(
                "password_pepper",
                &self.password_pepper.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_thirty_minutes() {
        assert_eq!(AuthConfig::default().access_token_ttl.as_secs(), 1800);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AuthConfig {
            password_pepper: Some(b"pepper-value".to_vec()),
            ..AuthConfig::new("super-secret-key")
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-key"));
        assert!(!debug.contains("pepper-value"));
        assert!(debug.contains("Hs256"));
    }
}

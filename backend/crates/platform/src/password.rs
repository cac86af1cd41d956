//! Password Hashing and Verification
//!
//! One-way credential hashing with:
//! - Argon2id hashing (memory-hard, salted, PHC string output)
//! - Zeroization of sensitive data
//! - Constant-time comparison (inside `argon2`)
//! - Optional application-wide pepper
//!
//! ## Failure model
//! A stored hash that cannot be parsed is data corruption, not a wrong
//! password. [`HashedPassword::verify`] reports it as
//! [`PasswordHashError::InvalidHashFormat`]; [`PasswordHasher::verify`]
//! logs it at error level and then answers `false`, so callers see the
//! same outcome as for a wrong password while operators can tell the two apart.

use std::fmt;
use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier, password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

// ============================================================================
// Constants
// ============================================================================

/// Maximum password length in Unicode code points
///
/// Bounds the hashing cost of a single request.
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password input violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    /// Password is too long
    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// Password is empty or contains only whitespace
    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Password contains control characters
    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored hash is not a parseable PHC string
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password with validation
    ///
    /// Unicode is normalized using NFKC before validation, so visually
    /// identical inputs hash identically.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let mut raw = raw;
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = normalized.chars().count();
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        // Control characters other than space/tab are rejected
        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != ' ' && ch != '\t')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(Self(normalized))
    }

    /// Get the password as bytes for hashing
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Password bytes with the pepper appended
    fn peppered(&self, pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
        let mut combined = self.as_bytes().to_vec();
        if let Some(p) = pepper {
            combined.extend_from_slice(p);
        }
        Zeroizing::new(combined)
    }

    /// Hash the password using Argon2id
    ///
    /// A fresh 128-bit salt is generated per call and embedded in the output,
    /// so hashing the same password twice yields different strings.
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let password_bytes = self.peppered(pepper);
        let salt = SaltString::generate(&mut OsRng);

        // OWASP recommended Argon2id parameters:
        // m=19456 (19 MiB), t=2, p=1
        let hash = Argon2::default()
            .hash_password(&password_bytes, &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The string carries algorithm, version, parameters, salt and digest.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from a PHC string, rejecting anything unparseable
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    /// Wrap a stored value without parsing it
    ///
    /// Stored hashes are opaque; a corrupt value surfaces at verification time.
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self { hash: s.into() }
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash
    ///
    /// `Ok(false)` means the password is wrong; `Err` means the stored hash is corrupt.
    pub fn verify(
        &self,
        password: &ClearTextPassword,
        pepper: Option<&[u8]>,
    ) -> Result<bool, PasswordHashError> {
        let parsed_hash =
            PasswordHash::new(&self.hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        let password_bytes = password.peppered(pepper);

        Ok(Argon2::default()
            .verify_password(&password_bytes, &parsed_hash)
            .is_ok())
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Password Hasher (pepper-bound service)
// ============================================================================

/// Hash/verify service bound to the process-wide pepper
#[derive(Clone, Default)]
pub struct PasswordHasher {
    pepper: Option<Zeroizing<Vec<u8>>>,
}

impl PasswordHasher {
    pub fn new(pepper: Option<Vec<u8>>) -> Self {
        Self {
            pepper: pepper.map(Zeroizing::new),
        }
    }

    fn pepper(&self) -> Option<&[u8]> {
        self.pepper.as_deref().map(Vec::as_slice)
    }

    /// Hash a password for storage
    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        password.hash(self.pepper())
    }

    /// Verify, keeping "corrupt hash" distinct from "wrong password"
    pub fn check(
        &self,
        password: &ClearTextPassword,
        stored: &HashedPassword,
    ) -> Result<bool, PasswordHashError> {
        stored.verify(password, self.pepper())
    }

    /// Spend one verification against a throwaway hash
    ///
    /// Lets a lookup miss cost the same as a wrong password.
    pub fn verify_dummy(&self, password: &ClearTextPassword) {
        if let Some(dummy) = DUMMY_HASH.as_ref() {
            let _ = self.check(password, dummy);
        }
    }

    /// Verify a password against a stored hash
    ///
    /// Corrupt hashes are logged and treated as a failed verification.
    pub fn verify(&self, password: &ClearTextPassword, stored: &HashedPassword) -> bool {
        match self.check(password, stored) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!(error = %e, "Stored password hash is corrupt");
                false
            }
        }
    }
}

static DUMMY_HASH: LazyLock<Option<HashedPassword>> = LazyLock::new(|| {
    ClearTextPassword::new("dummy-password".to_string())
        .ok()
        .and_then(|password| password.hash(None).ok())
});

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn password(raw: &str) -> ClearTextPassword {
        ClearTextPassword::new(raw.to_string()).unwrap()
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        let result = ClearTextPassword::new(long_password);
        assert!(matches!(result, Err(PasswordPolicyError::TooLong { .. })));
    }

    #[test]
    fn test_password_empty() {
        let result = ClearTextPassword::new("".to_string());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_password_whitespace_only() {
        let result = ClearTextPassword::new("        ".to_string());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_password_control_character() {
        let result = ClearTextPassword::new("pass\u{0}word".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::InvalidCharacter)));
    }

    #[test]
    fn test_short_password_accepted() {
        assert!(ClearTextPassword::new("pw123".to_string()).is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let password = password("TestPassword123!");
        let hashed = password.hash(None).unwrap();

        assert!(hashed.verify(&password, None).unwrap());

        let wrong_password = self::password("WrongPassword123!");
        assert!(!hashed.verify(&wrong_password, None).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let password = password("pw123");
        let first = password.hash(None).unwrap();
        let second = password.hash(None).unwrap();

        assert_ne!(first.as_phc_string(), second.as_phc_string());
        assert!(first.verify(&password, None).unwrap());
        assert!(second.verify(&password, None).unwrap());
    }

    #[test]
    fn test_hash_with_pepper() {
        let password = password("TestPassword123!");
        let pepper = b"my_secret_pepper";
        let hashed = password.hash(Some(pepper)).unwrap();

        assert!(hashed.verify(&password, Some(pepper)).unwrap());
        assert!(!hashed.verify(&password, None).unwrap());
        assert!(!hashed.verify(&password, Some(b"wrong_pepper")).unwrap());
    }

    #[test]
    fn test_nfkc_normalization() {
        // Fullwidth "ｐｗ" normalizes to ASCII "pw"
        let hashed = password("ｐｗ123").hash(None).unwrap();
        assert!(hashed.verify(&password("pw123"), None).unwrap());
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let password = password("TestPassword123!");
        let hashed = password.hash(None).unwrap();

        let phc_string = hashed.as_phc_string().to_string();
        let restored = HashedPassword::from_phc_string(phc_string).unwrap();

        assert!(restored.verify(&password, None).unwrap());
    }

    #[test]
    fn test_invalid_phc_string() {
        assert!(HashedPassword::from_phc_string("not_a_valid_hash").is_err());

        let stored = HashedPassword::from_stored("not_a_valid_hash");
        assert!(matches!(
            stored.verify(&password("pw123"), None),
            Err(PasswordHashError::InvalidHashFormat)
        ));
    }

    #[test]
    fn test_hasher_corrupt_hash_is_false() {
        let hasher = PasswordHasher::default();
        let stored = HashedPassword::from_stored("$argon2id$garbage");
        assert!(!hasher.verify(&password("pw123"), &stored));
    }

    #[test]
    fn test_verify_dummy_does_not_panic() {
        let hasher = PasswordHasher::new(Some(b"pepper".to_vec()));
        hasher.verify_dummy(&password("anything"));
        assert!(DUMMY_HASH.as_ref().is_some());
    }

    #[test]
    fn test_hasher_with_pepper() {
        let hasher = PasswordHasher::new(Some(b"pepper".to_vec()));
        let hashed = hasher.hash(&password("pw123")).unwrap();

        assert!(hasher.verify(&password("pw123"), &hashed));
        assert!(!PasswordHasher::default().verify(&password("pw123"), &hashed));
    }

    #[test]
    fn test_debug_redaction() {
        let password = password("secret");
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));

        let hasher = PasswordHasher::new(Some(b"pepper".to_vec()));
        assert!(!format!("{:?}", hasher).contains("pepper\""));
    }
}

//! User Password Value Object
//!
//! Domain wrappers around `platform::password`.
//!
//! ## Security Features
//! - Argon2id hashing (memory-hard)
//! - Automatic memory zeroization
//! - Constant-time comparison
//! - Unicode NFKC normalization

use platform::password::{ClearTextPassword, HashedPassword};
use std::fmt;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Memory is automatically zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Create a new raw password with validation
    ///
    /// ## Validation Rules
    /// - Not empty or whitespace-only
    /// - Maximum 128 characters
    /// - No control characters
    pub fn new(raw: String) -> AuthResult<Self> {
        ClearTextPassword::new(raw)
            .map(Self)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Hashed user password as stored on the credential
///
/// Opaque PHC string. A corrupt value is only detected at verification.
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Wrap a stored hash string
    pub fn from_stored(phc_string: impl Into<String>) -> Self {
        Self(HashedPassword::from_stored(phc_string))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub(crate) fn hashed(&self) -> &HashedPassword {
        &self.0
    }
}

impl From<HashedPassword> for UserPassword {
    fn from(hashed: HashedPassword) -> Self {
        Self(hashed)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_password_policy_errors() {
        assert!(matches!(
            RawPassword::new("   ".to_string()),
            Err(AuthError::PasswordValidation(_))
        ));
        assert!(RawPassword::new("pw123".to_string()).is_ok());
    }

    #[test]
    fn test_debug_redacted() {
        let raw = RawPassword::new("hunter2".to_string()).unwrap();
        assert!(!format!("{:?}", raw).contains("hunter2"));

        let stored = UserPassword::from_stored("$argon2id$v=19$secret");
        assert!(!format!("{:?}", stored).contains("secret"));
        assert_eq!(stored.as_phc_string(), "$argon2id$v=19$secret");
    }
}

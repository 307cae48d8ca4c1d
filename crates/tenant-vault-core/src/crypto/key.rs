//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! Parameters are fixed so blobs written by any implementation of the format
//! can be read by any other: 32-byte salt, 100,000 rounds, 32-byte key.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use super::{KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN};
use crate::error::{Result, VaultError};

/// A cryptographic key derived from a password.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive a 256-bit key from a password and salt.
///
/// Deterministic: the same password and salt always produce the same key.
/// Each call costs 100,000 HMAC-SHA256 rounds.
///
/// # Examples
///
/// ```
/// use tenant_vault_core::crypto::derive_key;
///
/// let salt = [7u8; 32];
/// let a = derive_key("correct horse", &salt);
/// let b = derive_key("correct horse", &salt);
/// assert_eq!(a.as_bytes(), b.as_bytes());
/// ```
pub fn derive_key(password: &str, salt: &[u8]) -> DerivedKey {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    DerivedKey { key }
}

/// Generate a fresh random salt from the operating system RNG.
///
/// # Errors
///
/// Returns `VaultError::Crypto` only if the randomness source is unavailable.
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    fill_random(&mut salt)?;
    Ok(salt)
}

pub(crate) fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| VaultError::Crypto(format!("Randomness unavailable: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_derivation_deterministic() {
        let salt = [0x11u8; SALT_LEN];

        let key1 = derive_key("test-password", &salt);
        let key2 = derive_key("test-password", &salt);

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_key("test-password", &[0x01u8; SALT_LEN]);
        let key2 = derive_key("test-password", &[0x02u8; SALT_LEN]);

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_password_different_key() {
        let salt = [0x33u8; SALT_LEN];

        let key1 = derive_key("password-one", &salt);
        let key2 = derive_key("password-two", &salt);

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_known_vector() {
        // PBKDF2-HMAC-SHA256("password", "salt", 100000, 32)
        let key = derive_key("password", b"salt");
        assert_eq!(
            hex::encode(key.as_bytes()),
            "0394a2ede332c9a13eb82e9b24631604c31df978b4e2f0fbd2c549944f9d79a5"
        );
    }

    #[test]
    fn test_generate_salt_is_random() {
        let salt1 = generate_salt().unwrap();
        let salt2 = generate_salt().unwrap();

        assert_eq!(salt1.len(), SALT_LEN);
        assert_ne!(salt1, salt2);
    }

    #[test]
    fn test_derived_key_debug_redacts() {
        let key = derive_key("test-password", &[0x44u8; SALT_LEN]);

        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));

        let key_hex = hex::encode(&key.as_bytes()[..4]);
        assert!(!debug_output.contains(&key_hex));
    }
}

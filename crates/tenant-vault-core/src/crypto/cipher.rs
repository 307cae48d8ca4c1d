//! AES-256-GCM encryption/decryption of whole database files.
//!
//! Plaintext is always fully buffered before sealing. The reader-based
//! variant exists for callers holding a stream, but it does not lower peak
//! memory use.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use zeroize::Zeroizing;

use super::key::{derive_key, fill_random, generate_salt};
use super::{MIN_BLOB_LEN, NONCE_LEN, SALT_LEN};
use crate::error::{Result, VaultError};
use crate::fs::write_private;

/// Encrypt `plaintext` under `password`.
///
/// Returns `salt || nonce || ciphertext || tag`. Salt and nonce are freshly
/// random on every call, so encrypting the same input twice never yields the
/// same blob.
///
/// # Examples
///
/// ```
/// use tenant_vault_core::crypto::{decrypt, encrypt};
///
/// let blob = encrypt(b"secret data", "my-password").unwrap();
/// assert_eq!(decrypt(&blob, "my-password").unwrap(), b"secret data");
/// ```
pub fn encrypt(plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
    let salt = generate_salt()?;
    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce)?;

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("Failed to create cipher: {}", e)))?;
    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| VaultError::Crypto(format!("Encryption failed: {}", e)))?;

    let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + sealed.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&sealed);
    Ok(blob)
}

/// Read `reader` to the end, then encrypt the buffered contents.
pub fn encrypt_reader<R: Read>(mut reader: R, password: &str) -> Result<Vec<u8>> {
    let mut plaintext = Zeroizing::new(Vec::new());
    reader.read_to_end(&mut plaintext)?;
    encrypt(&plaintext, password)
}

/// Decrypt a blob produced by [`encrypt`].
///
/// # Errors
///
/// - `VaultError::TooShort` if the blob cannot hold salt, nonce and tag
/// - `VaultError::AuthenticationFailure` if the tag does not verify. A wrong
///   password and tampered data are indistinguishable here.
pub fn decrypt(blob: &[u8], password: &str) -> Result<Vec<u8>> {
    if blob.len() < MIN_BLOB_LEN {
        return Err(VaultError::TooShort { len: blob.len() });
    }

    let (salt, rest) = blob.split_at(SALT_LEN);
    let (nonce, sealed) = rest.split_at(NONCE_LEN);

    let key = derive_key(password, salt);
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("Failed to create cipher: {}", e)))?;
    cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| VaultError::AuthenticationFailure)
}

/// Encrypt the file at `source` into `destination` (mode 0600 on Unix).
pub fn encrypt_file(source: &Path, destination: &Path, password: &str) -> Result<()> {
    let file = File::open(source)?;
    let blob = encrypt_reader(file, password)?;
    write_private(destination, &blob)?;
    Ok(())
}

/// Decrypt the blob at `source` into `destination`.
///
/// Nothing is written unless decryption succeeds.
pub fn decrypt_file(source: &Path, destination: &Path, password: &str) -> Result<()> {
    let blob = std::fs::read(source)?;
    let plaintext = Zeroizing::new(decrypt(&blob, password)?);
    write_private(destination, &plaintext)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::TAG_LEN;

    const PASSWORD: &str = "test-password-secure-123";

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let plaintext = b"Hello, World! This is secret data.";

        let encrypted = encrypt(plaintext, PASSWORD).unwrap();
        let decrypted = decrypt(&encrypted, PASSWORD).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_empty_data_round_trip() {
        let encrypted = encrypt(b"", PASSWORD).unwrap();
        assert_eq!(encrypted.len(), MIN_BLOB_LEN);

        let decrypted = decrypt(&encrypted, PASSWORD).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_blob_layout_length() {
        let plaintext = vec![0x42u8; 1000];
        let encrypted = encrypt(&plaintext, PASSWORD).unwrap();
        assert_eq!(encrypted.len(), SALT_LEN + NONCE_LEN + plaintext.len() + TAG_LEN);
    }

    #[test]
    fn test_wrong_password_fails_authentication() {
        let encrypted = encrypt(b"secret data", "correct-password-123").unwrap();

        let result = decrypt(&encrypted, "wrong-password-456");
        assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
    }

    #[test]
    fn test_any_flipped_byte_fails_for_correct_password() {
        let encrypted = encrypt(b"secret", PASSWORD).unwrap();
        assert_eq!(encrypted.len(), MIN_BLOB_LEN + 6);

        for index in 0..encrypted.len() {
            for bit in [0x01u8, 0x80] {
                let mut tampered = encrypted.clone();
                tampered[index] ^= bit;
                let result = decrypt(&tampered, PASSWORD);
                assert!(
                    matches!(result, Err(VaultError::AuthenticationFailure)),
                    "flip of bit {:#04x} at {} was not detected",
                    bit,
                    index
                );
            }
        }
    }

    #[test]
    fn test_tampered_salt_or_nonce_fails() {
        let encrypted = encrypt(b"secret data", PASSWORD).unwrap();

        let mut bad_salt = encrypted.clone();
        bad_salt[0] ^= 0x80;
        assert!(matches!(
            decrypt(&bad_salt, PASSWORD),
            Err(VaultError::AuthenticationFailure)
        ));

        let mut bad_nonce = encrypted;
        bad_nonce[SALT_LEN] ^= 0x80;
        assert!(matches!(
            decrypt(&bad_nonce, PASSWORD),
            Err(VaultError::AuthenticationFailure)
        ));
    }

    #[test]
    fn test_same_input_yields_different_blobs() {
        let encrypted1 = encrypt(b"same plaintext", PASSWORD).unwrap();
        let encrypted2 = encrypt(b"same plaintext", PASSWORD).unwrap();

        assert_ne!(encrypted1[..SALT_LEN], encrypted2[..SALT_LEN]);
        assert_ne!(
            encrypted1[SALT_LEN..SALT_LEN + NONCE_LEN],
            encrypted2[SALT_LEN..SALT_LEN + NONCE_LEN]
        );
    }

    #[test]
    fn test_short_input_is_rejected() {
        for len in [0, 1, 32, 44, MIN_BLOB_LEN - 1] {
            let input = vec![0u8; len];
            let result = decrypt(&input, PASSWORD);
            assert!(
                matches!(result, Err(VaultError::TooShort { len: reported }) if reported == len),
                "length {} was not rejected as too short",
                len
            );
        }
    }

    #[test]
    fn test_decrypts_externally_produced_blob() {
        // salt = 00..1f, nonce = 64..6f, password "rightpw", plaintext "tenant fixture"
        let blob = hex::decode(concat!(
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
            "6465666768696a6b6c6d6e6f",
            "eab41d3d1dcc3e1d1cdc14eeeda35486192b62ee5e1669d09c724c29e992"
        ))
        .unwrap();

        assert_eq!(decrypt(&blob, "rightpw").unwrap(), b"tenant fixture");
        assert!(matches!(
            decrypt(&blob, "wrongpw"),
            Err(VaultError::AuthenticationFailure)
        ));
    }

    #[test]
    fn test_encrypt_reader_matches_buffer_semantics() {
        let data = vec![0x5au8; 64 * 1024];
        let encrypted = encrypt_reader(std::io::Cursor::new(data.clone()), PASSWORD).unwrap();
        assert_eq!(decrypt(&encrypted, PASSWORD).unwrap(), data);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("tenant.db");
        let sealed = dir.path().join("tenant.db.encrypted");
        let restored = dir.path().join("restored.db");
        std::fs::write(&plain, b"sqlite bytes").unwrap();

        encrypt_file(&plain, &sealed, PASSWORD).unwrap();
        decrypt_file(&sealed, &restored, PASSWORD).unwrap();

        assert_eq!(std::fs::read(&restored).unwrap(), b"sqlite bytes");
    }

    #[test]
    fn test_decrypt_file_wrong_password_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("tenant.db");
        let sealed = dir.path().join("tenant.db.encrypted");
        let restored = dir.path().join("restored.db");
        std::fs::write(&plain, b"sqlite bytes").unwrap();
        encrypt_file(&plain, &sealed, PASSWORD).unwrap();

        let result = decrypt_file(&sealed, &restored, "not-the-password");
        assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
        assert!(!restored.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_encrypted_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("tenant.db");
        let sealed = dir.path().join("tenant.db.encrypted");
        std::fs::write(&plain, b"sqlite bytes").unwrap();

        encrypt_file(&plain, &sealed, PASSWORD).unwrap();

        let mode = std::fs::metadata(&sealed).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

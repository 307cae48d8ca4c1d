//! Cryptographic operations for tenant databases.
//!
//! - **PBKDF2-HMAC-SHA256** (100,000 rounds) turns a password into a 256-bit key
//! - **AES-256-GCM** seals the whole database file with a 128-bit tag
//!
//! ## Blob layout
//!
//! ```text
//! [0, 32)    salt
//! [32, 44)   nonce
//! [44, end)  ciphertext || 16-byte tag
//! ```
//!
//! There is no version byte. Every encryption draws a fresh salt and nonce.
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of an encrypted blob from the object store
//! - Offline brute-force of the password (one slow derivation per guess)
//! - Tampering with a stored blob
//!
//! We do NOT defend against:
//! - Access to process memory (passwords live there while a tenant is loaded)
//! - Access to the local cache directory (plaintext databases live there)

pub mod cipher;
pub mod key;

pub use cipher::{decrypt, decrypt_file, encrypt, encrypt_file, encrypt_reader};
pub use key::{derive_key, generate_salt, DerivedKey};

/// Salt length in bytes.
pub const SALT_LEN: usize = 32;

/// AES-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// Derived key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Smallest well-formed blob: salt, nonce and tag around an empty plaintext.
pub const MIN_BLOB_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

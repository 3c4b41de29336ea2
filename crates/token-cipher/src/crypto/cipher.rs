//! AES-256-GCM encryption and decryption of individual tokens.
//!
//! Every call draws a fresh 96-bit nonce from the OS CSPRNG, so encrypting the
//! same token twice yields two different payloads. Compare tokens only after
//! decrypting.

use std::sync::Arc;

use aes_gcm::{
    aead::{rand_core::RngCore, AeadInPlace, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce, Tag,
};
use cipher_common::{
    payload::{NONCE_LEN, TAG_LEN},
    CipherError, EncryptedPayload,
};
use tracing::{debug, warn};

use crate::key::{EnvKeySource, KeySource, MasterKey, StaticKeySource};

/// Encrypt `plaintext` under `key` with a random nonce.
///
/// # Errors
///
/// Returns [`CipherError::EmptyPlaintext`] if `plaintext` is empty,
/// [`CipherError::EntropyUnavailable`] if the OS random source fails and
/// [`CipherError::EncryptionFailed`] if the plaintext exceeds the AES-GCM limit.
pub fn seal(plaintext: &[u8], key: &MasterKey) -> Result<EncryptedPayload, CipherError> {
    if plaintext.is_empty() {
        return Err(CipherError::EmptyPlaintext);
    }
    let cipher = build_cipher(key);

    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| CipherError::EntropyUnavailable)?;

    let mut ciphertext = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut ciphertext)
        .map_err(|_| CipherError::EncryptionFailed)?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok(EncryptedPayload {
        nonce,
        tag: tag_bytes,
        ciphertext,
    })
}

/// Verify and decrypt `payload` under `key`.
///
/// The tag is checked before any plaintext is released; on failure nothing
/// but the error is returned.
///
/// # Errors
///
/// Returns [`CipherError::AuthenticationFailed`] if the tag does not verify
/// (tampered data, corrupted data, or the wrong key).
pub fn open(payload: &EncryptedPayload, key: &MasterKey) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key);
    let mut buffer = payload.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(&payload.nonce),
            b"",
            &mut buffer,
            Tag::from_slice(&payload.tag),
        )
        .map_err(|_| CipherError::AuthenticationFailed)?;
    Ok(buffer)
}

fn build_cipher(key: &MasterKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypts and decrypts tokens for storage, loading the master key per call.
///
/// Cheap to clone; clones share the same [`KeySource`]. Safe to use from many
/// threads at once: each call loads its own key copy and owns its buffers.
#[derive(Clone)]
pub struct TokenCipher {
    keys: Arc<dyn KeySource>,
}

impl TokenCipher {
    /// Create a cipher that loads its key from `keys`.
    pub fn new(keys: Arc<dyn KeySource>) -> Self {
        Self { keys }
    }

    /// Create a cipher that reads the hex key from environment variable `var`
    /// on every operation.
    pub fn from_env(var: impl Into<String>) -> Self {
        Self::new(Arc::new(EnvKeySource::new(var)))
    }

    /// Create a cipher over a fixed hex key.
    pub fn with_static_key(hex_key: impl Into<String>) -> Self {
        Self::new(Arc::new(StaticKeySource::new(hex_key)))
    }

    /// Encrypt a token into its `nonce:tag:ciphertext` string form.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::EmptyPlaintext`] for an empty token (checked before
    /// the key is loaded), [`CipherError::KeyConfiguration`] if the key cannot
    /// be loaded, or an internal error from [`seal`].
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let payload = self.encrypt_payload(plaintext.as_bytes())?;
        Ok(payload.to_string())
    }

    /// Encrypt raw bytes into a structured [`EncryptedPayload`].
    ///
    /// # Errors
    ///
    /// Same as [`TokenCipher::encrypt`].
    pub fn encrypt_payload(&self, plaintext: &[u8]) -> Result<EncryptedPayload, CipherError> {
        if plaintext.is_empty() {
            return Err(CipherError::EmptyPlaintext);
        }
        let key = self.load_key()?;
        let payload = seal(plaintext, &key)?;
        debug!(ciphertext_len = payload.ciphertext.len(), "token encrypted");
        Ok(payload)
    }

    /// Decrypt a `nonce:tag:ciphertext` string back to the original token.
    ///
    /// The payload is parsed before the key is loaded, so malformed input is
    /// rejected without touching key material.
    ///
    /// # Errors
    ///
    /// - [`CipherError::MalformedPayload`] if `payload` does not parse, or the
    ///   verified plaintext is not UTF-8.
    /// - [`CipherError::KeyConfiguration`] if the key cannot be loaded.
    /// - [`CipherError::AuthenticationFailed`] if the tag does not verify.
    pub fn decrypt(&self, payload: &str) -> Result<String, CipherError> {
        let parsed: EncryptedPayload = payload.parse()?;
        let plaintext = self.decrypt_payload(&parsed)?;
        String::from_utf8(plaintext)
            .map_err(|_| CipherError::MalformedPayload("plaintext is not valid UTF-8"))
    }

    /// Decrypt a structured [`EncryptedPayload`] to raw bytes.
    ///
    /// # Errors
    ///
    /// [`CipherError::KeyConfiguration`] or [`CipherError::AuthenticationFailed`].
    pub fn decrypt_payload(&self, payload: &EncryptedPayload) -> Result<Vec<u8>, CipherError> {
        let key = self.load_key()?;
        open(payload, &key).inspect_err(|e| warn!(error = %e, "token decryption failed"))
    }

    /// Drop any cached key so the next operation reloads it.
    pub fn invalidate_key(&self) {
        self.keys.invalidate();
    }

    fn load_key(&self) -> Result<MasterKey, CipherError> {
        self.keys.load().map_err(|problem| {
            warn!(error = %problem, "master key unavailable");
            CipherError::from(problem)
        })
    }
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCipher").finish_non_exhaustive()
    }
}

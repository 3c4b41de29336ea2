//! Error taxonomy for the token cipher.

use thiserror::Error;

/// Why the master key could not be loaded.
///
/// None of these carry key material; `Missing` names the variable, and
/// `WrongLength` reports only the decoded byte count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyProblem {
    /// No key is configured.
    #[error("{var} is not set")]
    Missing {
        /// Name of the setting that should hold the key.
        var: String,
    },

    /// The configured value is not a hexadecimal string.
    #[error("master key is not valid hex")]
    NotHex,

    /// The configured value decodes to the wrong number of bytes.
    #[error("master key must decode to 32 bytes, got {bytes}")]
    WrongLength {
        /// Decoded length in bytes.
        bytes: usize,
    },
}

/// Coarse classification of a [`CipherError`].
///
/// Callers branch on this instead of matching message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Master key missing or malformed. Not retryable without fixing configuration.
    KeyConfiguration,
    /// Stored payload does not follow the `nonce:tag:ciphertext` grammar.
    MalformedPayload,
    /// Tag verification failed: tampering, corruption, or the wrong key.
    AuthenticationFailed,
    /// The AEAD primitive or the OS random source failed.
    Internal,
}

/// Top-level cipher error type.
///
/// Variants map to stable codes returned by [`CipherError::code`]:
/// - [`CipherError::KeyConfiguration`] → `key_configuration`
/// - [`CipherError::MalformedPayload`], [`CipherError::EmptyPlaintext`] → `malformed_payload`
/// - [`CipherError::AuthenticationFailed`] → `authentication_failed`
/// - [`CipherError::EncryptionFailed`], [`CipherError::EntropyUnavailable`] → `internal`
#[derive(Debug, Error)]
pub enum CipherError {
    /// The master key could not be loaded.
    #[error("key configuration error: {0}")]
    KeyConfiguration(#[from] KeyProblem),

    /// The payload is not a well-formed `nonce:tag:ciphertext` string.
    #[error("malformed payload: {0}")]
    MalformedPayload(&'static str),

    /// An empty plaintext has no ciphertext segment and cannot be stored.
    #[error("plaintext must not be empty")]
    EmptyPlaintext,

    /// The authentication tag did not verify.
    ///
    /// Deliberately carries no detail about why.
    #[error("decryption failed")]
    AuthenticationFailed,

    /// AES-256-GCM refused to encrypt (plaintext beyond the cipher's limit).
    #[error("encryption failed")]
    EncryptionFailed,

    /// The OS random source could not produce a nonce.
    #[error("random source unavailable")]
    EntropyUnavailable,
}

impl CipherError {
    /// Returns the [`ErrorKind`] this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CipherError::KeyConfiguration(_) => ErrorKind::KeyConfiguration,
            CipherError::MalformedPayload(_) | CipherError::EmptyPlaintext => {
                ErrorKind::MalformedPayload
            }
            CipherError::AuthenticationFailed => ErrorKind::AuthenticationFailed,
            CipherError::EncryptionFailed | CipherError::EntropyUnavailable => ErrorKind::Internal,
        }
    }

    /// Returns a short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::KeyConfiguration => "key_configuration",
            ErrorKind::MalformedPayload => "malformed_payload",
            ErrorKind::AuthenticationFailed => "authentication_failed",
            ErrorKind::Internal => "internal",
        }
    }
}

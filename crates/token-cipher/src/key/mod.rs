//! Master key material and the sources it is loaded from.
//!
//! # Security invariants
//!
//! - Key bytes are **never** logged, included in error messages, or printed by `Debug`.
//! - [`MasterKey`] zeroes its buffer on drop.
//! - [`EnvKeySource`] and [`StaticKeySource`] decode the key on every call; only
//!   [`CachedKeySource`] keeps a decoded copy between calls.

pub mod cache;

pub use cache::CachedKeySource;

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use cipher_common::{CipherError, KeyProblem};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Environment variable read by [`EnvKeySource::default`].
pub const DEFAULT_KEY_VAR: &str = "ENCRYPTION_KEY";

/// A decoded 256-bit master key.
#[derive(Clone)]
pub struct MasterKey(Box<[u8; KEY_LEN]>);

impl MasterKey {
    /// Decode a key from its 64-character hexadecimal form.
    ///
    /// The value is taken as-is; surrounding whitespace makes it invalid.
    ///
    /// # Errors
    ///
    /// Returns [`KeyProblem::NotHex`] if `hex_key` is not hexadecimal (including
    /// odd-length input) and [`KeyProblem::WrongLength`] if it does not decode
    /// to [`KEY_LEN`] bytes.
    pub fn from_hex(hex_key: &str) -> Result<Self, KeyProblem> {
        let mut decoded = hex::decode(hex_key).map_err(|_| KeyProblem::NotHex)?;
        let key = Self::from_slice(&decoded);
        decoded.iter_mut().for_each(|b| *b = 0);
        key
    }

    /// Copy a key out of raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyProblem::WrongLength`] if `bytes` is not [`KEY_LEN`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyProblem> {
        if bytes.len() != KEY_LEN {
            return Err(KeyProblem::WrongLength { bytes: bytes.len() });
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// Anything that can produce the master key on demand.
///
/// [`TokenCipher`](crate::TokenCipher) calls [`KeySource::load`] once per
/// operation.
#[cfg_attr(test, mockall::automock)]
pub trait KeySource: Send + Sync {
    /// Load and decode the current master key.
    fn load(&self) -> Result<MasterKey, KeyProblem>;

    /// Drop any decoded key held between calls. No-op for uncached sources.
    fn invalidate(&self) {}
}

/// Reads the hex-encoded key from an environment variable on every load.
#[derive(Debug, Clone)]
pub struct EnvKeySource {
    var: String,
}

impl EnvKeySource {
    /// Read the key from the environment variable `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Name of the variable this source reads.
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvKeySource {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_VAR)
    }
}

impl KeySource for EnvKeySource {
    fn load(&self) -> Result<MasterKey, KeyProblem> {
        match std::env::var(&self.var) {
            Ok(value) if !value.is_empty() => MasterKey::from_hex(&value),
            Ok(_) | Err(std::env::VarError::NotPresent) => Err(KeyProblem::Missing {
                var: self.var.clone(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(KeyProblem::NotHex),
        }
    }
}

/// Holds a hex-encoded key supplied at construction and decodes it on every load.
#[derive(Clone)]
pub struct StaticKeySource {
    hex_key: String,
}

impl StaticKeySource {
    /// Wrap a hex-encoded key. Validation happens on [`KeySource::load`].
    pub fn new(hex_key: impl Into<String>) -> Self {
        Self {
            hex_key: hex_key.into(),
        }
    }
}

impl std::fmt::Debug for StaticKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticKeySource([REDACTED])")
    }
}

impl KeySource for StaticKeySource {
    fn load(&self) -> Result<MasterKey, KeyProblem> {
        if self.hex_key.is_empty() {
            return Err(KeyProblem::Missing {
                var: "static key".into(),
            });
        }
        MasterKey::from_hex(&self.hex_key)
    }
}

/// Generate a fresh master key from the OS CSPRNG, hex-encoded.
///
/// The result is 64 lowercase hex characters, ready for `ENCRYPTION_KEY`.
///
/// # Errors
///
/// Returns [`CipherError::EntropyUnavailable`] if the OS random source fails.
pub fn generate_master_key() -> Result<String, CipherError> {
    let mut key = [0u8; KEY_LEN];
    OsRng
        .try_fill_bytes(&mut key)
        .map_err(|_| CipherError::EntropyUnavailable)?;
    let encoded = hex::encode(key);
    key.iter_mut().for_each(|b| *b = 0);
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn from_hex_decodes_64_chars() {
        let key = MasterKey::from_hex(HEX_KEY).unwrap();
        assert_eq!(key.as_bytes()[0], 0x01);
        assert_eq!(key.as_bytes()[7], 0xef);
        assert_eq!(key.as_bytes()[31], 0xef);
    }

    #[test]
    fn from_hex_rejects_surrounding_whitespace() {
        assert_eq!(
            MasterKey::from_hex(&format!("  {HEX_KEY}\n")).unwrap_err(),
            KeyProblem::NotHex
        );
        assert!(StaticKeySource::new(format!("{HEX_KEY} ")).load().is_err());
    }

    #[test]
    fn from_hex_rejects_short_key() {
        let err = MasterKey::from_hex(&HEX_KEY[..62]).unwrap_err();
        assert_eq!(err, KeyProblem::WrongLength { bytes: 31 });
    }

    #[test]
    fn from_hex_rejects_long_key() {
        let err = MasterKey::from_hex(&format!("{HEX_KEY}00")).unwrap_err();
        assert_eq!(err, KeyProblem::WrongLength { bytes: 33 });
    }

    #[test]
    fn from_hex_rejects_odd_length_and_non_hex() {
        assert_eq!(MasterKey::from_hex(&HEX_KEY[..63]).unwrap_err(), KeyProblem::NotHex);
        assert_eq!(
            MasterKey::from_hex(&"zz".repeat(32)).unwrap_err(),
            KeyProblem::NotHex
        );
    }

    #[test]
    fn master_key_redacted_in_debug() {
        let key = MasterKey::from_hex(HEX_KEY).unwrap();
        let printed = format!("{key:?}");
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("01"));
    }

    #[test]
    fn static_source_redacted_in_debug() {
        let source = StaticKeySource::new(HEX_KEY);
        assert!(!format!("{source:?}").contains("0123"));
    }

    #[test]
    fn static_source_validates_on_every_load() {
        let source = StaticKeySource::new("abcd");
        assert!(source.load().is_err());
        assert!(source.load().is_err());
        assert!(matches!(
            StaticKeySource::new("").load(),
            Err(KeyProblem::Missing { .. })
        ));
    }

    #[test]
    fn env_source_reports_missing_variable() {
        let source = EnvKeySource::new("TOKEN_CIPHER_TEST_KEY_THAT_IS_NEVER_SET");
        assert_eq!(
            source.load().unwrap_err(),
            KeyProblem::Missing {
                var: "TOKEN_CIPHER_TEST_KEY_THAT_IS_NEVER_SET".into()
            }
        );
    }

    #[test]
    fn env_source_defaults_to_encryption_key() {
        assert_eq!(EnvKeySource::default().var(), "ENCRYPTION_KEY");
    }

    #[test]
    fn generated_keys_are_valid_and_distinct() {
        let a = generate_master_key().unwrap();
        let b = generate_master_key().unwrap();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
        assert!(MasterKey::from_hex(&a).is_ok());
    }
}

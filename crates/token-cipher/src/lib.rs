//! Authenticated encryption at rest for OAuth access and refresh tokens.
//!
//! A [`TokenCipher`] turns a token into an opaque `nonce:tag:ciphertext`
//! string suitable for a text column, and back. The master key comes from a
//! [`KeySource`] chosen by the caller; by default it is re-read on every
//! operation so a configuration change applies without a restart.
//!
//! ```no_run
//! use token_cipher::TokenCipher;
//!
//! let cipher = TokenCipher::from_env("ENCRYPTION_KEY");
//! let stored = cipher.encrypt("ya29.a0Af...")?;
//! assert_eq!(cipher.decrypt(&stored)?, "ya29.a0Af...");
//! # Ok::<(), token_cipher::CipherError>(())
//! ```

pub mod bench;
pub mod config;
pub mod crypto;
pub mod key;
pub mod tokens;

pub use cipher_common::{CipherError, EncryptedPayload, ErrorKind, KeyProblem};
pub use crate::config::CipherConfig;
pub use crypto::TokenCipher;
pub use key::{
    generate_master_key, CachedKeySource, EnvKeySource, KeySource, MasterKey, StaticKeySource,
};
pub use tokens::{OAuthTokens, SealedOAuthTokens};

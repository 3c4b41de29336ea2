//! Error types and the encrypted payload grammar shared across `token-cipher` crates.
//!
//! Nothing in this crate touches key material or performs cryptography.

pub mod error;
pub mod payload;

pub use error::{CipherError, ErrorKind, KeyProblem};
pub use payload::EncryptedPayload;

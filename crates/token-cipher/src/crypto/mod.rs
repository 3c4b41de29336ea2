//! AES-256-GCM token encryption primitives.
//!
//! This module is free of configuration and I/O. [`cipher`] holds the
//! low-level seal/open functions over a [`MasterKey`](crate::MasterKey) and the
//! [`TokenCipher`] that pairs them with a [`KeySource`](crate::KeySource).
//!
//! # Ciphertext format
//!
//! ```text
//! <base64(nonce)>:<base64(tag)>:<base64(ciphertext)>
//! ```
//!
//! See [`cipher_common::payload`] for the grammar.

pub mod cipher;

pub use cipher::TokenCipher;

//! Sealing the OAuth token set an integration persists after a code exchange.
//!
//! The access token and the optional refresh token are encrypted separately;
//! the expiry stays in clear so refresh scheduling can query it.

use serde::{Deserialize, Serialize};

use crate::crypto::TokenCipher;
use cipher_common::CipherError;

/// OAuth tokens in plaintext, as returned by the identity provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokens {
    /// Bearer token sent to the provider's API.
    pub access_token: String,
    /// Long-lived token used to mint new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Access token expiry, Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl std::fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// The at-rest form of [`OAuthTokens`]: each token is a `nonce:tag:ciphertext` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedOAuthTokens {
    /// Encrypted access token.
    pub access_token: String,
    /// Encrypted refresh token, if the provider issued one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Access token expiry, Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl TokenCipher {
    /// Encrypt both tokens of `tokens` for storage.
    ///
    /// # Errors
    ///
    /// Any error from [`TokenCipher::encrypt`].
    pub fn seal_tokens(&self, tokens: &OAuthTokens) -> Result<SealedOAuthTokens, CipherError> {
        Ok(SealedOAuthTokens {
            access_token: self.encrypt(&tokens.access_token)?,
            refresh_token: tokens
                .refresh_token
                .as_deref()
                .map(|t| self.encrypt(t))
                .transpose()?,
            expires_at: tokens.expires_at,
        })
    }

    /// Decrypt a stored token set.
    ///
    /// Fails as a whole if either token fails; callers typically treat that as
    /// a revoked connection and send the user through OAuth again.
    ///
    /// # Errors
    ///
    /// Any error from [`TokenCipher::decrypt`].
    pub fn open_tokens(&self, sealed: &SealedOAuthTokens) -> Result<OAuthTokens, CipherError> {
        Ok(OAuthTokens {
            access_token: self.decrypt(&sealed.access_token)?,
            refresh_token: sealed
                .refresh_token
                .as_deref()
                .map(|t| self.decrypt(t))
                .transpose()?,
            expires_at: sealed.expires_at,
        })
    }
}

//! Key source configuration for embedding applications.
//!
//! Values are read from environment variables. The master key itself is never
//! part of this struct; only the name of the variable that holds it.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::TokenCipher;
use crate::key::{CachedKeySource, EnvKeySource, KeySource, DEFAULT_KEY_VAR};

/// Validated cipher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CipherConfig {
    /// Name of the environment variable holding the 64-hex-character master key.
    #[serde(default = "default_encryption_key_var")]
    pub encryption_key_var: String,

    /// Keep the decoded key between operations until explicitly invalidated.
    #[serde(default)]
    pub cache_master_key: bool,
}

fn default_encryption_key_var() -> String {
    DEFAULT_KEY_VAR.into()
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            encryption_key_var: default_encryption_key_var(),
            cache_master_key: false,
        }
    }
}

impl CipherConfig {
    /// Load and validate configuration from environment variables
    /// (`ENCRYPTION_KEY_VAR`, `CACHE_MASTER_KEY`).
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or validation fails.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build cipher configuration from environment")?;

        let c: CipherConfig = cfg
            .try_deserialize()
            .context("failed to deserialise cipher configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.encryption_key_var.trim().is_empty() {
            anyhow::bail!("ENCRYPTION_KEY_VAR must not be empty");
        }
        Ok(())
    }

    /// Build the key source described by this configuration.
    pub fn key_source(&self) -> Arc<dyn KeySource> {
        let env = EnvKeySource::new(self.encryption_key_var.clone());
        if self.cache_master_key {
            Arc::new(CachedKeySource::new(env))
        } else {
            Arc::new(env)
        }
    }

    /// Build a [`TokenCipher`] over [`CipherConfig::key_source`].
    pub fn build_cipher(&self) -> TokenCipher {
        TokenCipher::new(self.key_source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipher_common::{ErrorKind, KeyProblem};

    #[test]
    fn defaults_are_correct() {
        let cfg = CipherConfig::default();
        assert_eq!(cfg.encryption_key_var, "ENCRYPTION_KEY");
        assert!(!cfg.cache_master_key);
    }

    #[test]
    fn validate_rejects_empty_key_var() {
        let cfg = CipherConfig {
            encryption_key_var: "  ".into(),
            cache_master_key: false,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_default() {
        assert!(CipherConfig::default().validate().is_ok());
    }

    #[test]
    fn key_source_reads_configured_variable() {
        let cfg = CipherConfig {
            encryption_key_var: "TOKEN_CIPHER_CONFIG_TEST_UNSET".into(),
            cache_master_key: true,
        };
        let err = cfg.key_source().load().unwrap_err();
        assert!(matches!(
            err,
            KeyProblem::Missing { ref var } if var == "TOKEN_CIPHER_CONFIG_TEST_UNSET"
        ));

        let err = cfg.build_cipher().encrypt("x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyConfiguration);
    }
}

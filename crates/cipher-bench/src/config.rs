//! Configuration loading and validation for the benchmark binary.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated benchmark configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Number of encrypt/decrypt round trips.
    #[serde(default = "default_bench_iterations")]
    pub bench_iterations: u32,

    /// Plaintext pushed through every round trip.
    #[serde(default = "default_bench_sample")]
    pub bench_sample: String,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bench_iterations() -> u32 {
    1000
}
fn default_bench_sample() -> String {
    "my super secret".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build cipher-bench configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise cipher-bench configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.bench_iterations == 0 {
            anyhow::bail!("BENCH_ITERATIONS must be > 0");
        }
        if self.bench_sample.is_empty() {
            anyhow::bail!("BENCH_SAMPLE must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            bench_iterations: default_bench_iterations(),
            bench_sample: default_bench_sample(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(default_bench_iterations(), 1000);
        assert_eq!(default_bench_sample(), "my super secret");
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_rejects_zero_iterations() {
        let cfg = Config {
            bench_iterations: 0,
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_sample() {
        let cfg = Config {
            bench_sample: String::new(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_valid_config() {
        assert!(valid().validate().is_ok());
    }
}

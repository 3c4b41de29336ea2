//! `cipher-bench`: round-trip benchmark and self-test for `token-cipher`.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`](config::Config) and the cipher's key settings
//!    from environment variables.
//! 2. Initialise structured JSON logging. The library is held at `warn` unless
//!    `RUST_LOG` says otherwise, so per-call debug events stay out of the timed loop.
//! 3. Run the benchmark and log the report. Exits non-zero on any failure.

mod config;

use anyhow::{Context, Result};
use token_cipher::{bench, CipherConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: cipher-bench configuration invalid: {e}");
        e
    })?;
    let cipher_cfg = CipherConfig::from_env().map_err(|e| {
        eprintln!("ERROR: cipher configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    init_tracing(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        iterations = cfg.bench_iterations,
        key_var = %cipher_cfg.encryption_key_var,
        cache_master_key = cipher_cfg.cache_master_key,
        "cipher-bench starting"
    );

    // -----------------------------------------------------------------------
    // 3. Benchmark
    // -----------------------------------------------------------------------
    let cipher = cipher_cfg.build_cipher();
    let report = bench::run(&cipher, cfg.bench_iterations, &cfg.bench_sample)
        .context("benchmark aborted")?;

    info!(
        iterations = report.iterations,
        elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
        mean_us = report.mean().as_secs_f64() * 1_000_000.0,
        "benchmark complete"
    );
    Ok(())
}

/// Directive used when `RUST_LOG` is unset: the binary at `log_level`, the
/// cipher library at `warn`.
fn default_directive(log_level: &str) -> String {
    format!("cipher_bench={log_level},token_cipher=warn")
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive(log_level))
            .with_context(|| format!("invalid LOG_LEVEL {log_level:?}"))?,
    };

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber already set: {e}"))
}

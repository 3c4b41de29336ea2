//! Round-trip benchmark and self-test.
//!
//! Encrypts and decrypts a fixed sample repeatedly and times the loop. A round
//! trip that does not give back the sample means this crate is broken, so the
//! run stops at the first mismatch.

use std::time::{Duration, Instant};

use cipher_common::CipherError;
use thiserror::Error;

use crate::crypto::TokenCipher;

/// Errors that abort a benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Zero iterations were requested.
    #[error("iterations must be > 0")]
    NoIterations,

    /// Encryption or decryption failed.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// Decrypting a fresh payload did not reproduce the sample.
    #[error("round trip {iteration} did not reproduce the sample")]
    RoundTripMismatch {
        /// Zero-based index of the failing round trip.
        iteration: u32,
    },
}

/// Timing for a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchReport {
    /// Number of encrypt/decrypt round trips performed.
    pub iterations: u32,
    /// Wall-clock time for the whole loop.
    pub elapsed: Duration,
}

impl BenchReport {
    /// Mean wall-clock time per round trip.
    pub fn mean(&self) -> Duration {
        self.elapsed / self.iterations.max(1)
    }
}

/// Run `iterations` encrypt/decrypt round trips of `sample` through `cipher`.
///
/// # Errors
///
/// - [`BenchError::NoIterations`] if `iterations` is zero.
/// - [`BenchError::Cipher`] on any cipher failure (typically a key problem).
/// - [`BenchError::RoundTripMismatch`] if a round trip changes the sample.
pub fn run(
    cipher: &TokenCipher,
    iterations: u32,
    sample: &str,
) -> Result<BenchReport, BenchError> {
    measure(iterations, sample, |s| {
        let payload = cipher.encrypt(s)?;
        cipher.decrypt(&payload)
    })
}

fn measure<F>(iterations: u32, sample: &str, mut round_trip: F) -> Result<BenchReport, BenchError>
where
    F: FnMut(&str) -> Result<String, CipherError>,
{
    if iterations == 0 {
        return Err(BenchError::NoIterations);
    }

    let started = Instant::now();
    for iteration in 0..iterations {
        if round_trip(sample)? != sample {
            return Err(BenchError::RoundTripMismatch { iteration });
        }
    }

    Ok(BenchReport {
        iterations,
        elapsed: started.elapsed(),
    })
}

//! Random sources for weighted selection.
//!
//! Selection draws come from the operating system's entropy source. When
//! that source fails the draw degrades to a coarse timestamp value and the
//! failure is logged; callers never see an error.

use rand::rngs::OsRng;
use rand::RngCore;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of uniform draws used by the selector.
pub trait RandomSource: Send + Sync {
    /// Uniform float in [0, 1).
    fn next_f64(&self) -> f64;

    /// Uniform index in [0, n). Returns 0 when `n == 0`.
    fn next_index(&self, n: usize) -> usize;
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&self) -> f64 {
        (**self).next_f64()
    }

    fn next_index(&self, n: usize) -> usize {
        (**self).next_index(n)
    }
}

/// Cryptographically strong source backed by the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureRandom;

impl RandomSource for SecureRandom {
    fn next_f64(&self) -> f64 {
        let mut bytes = [0u8; 8];
        match OsRng.try_fill_bytes(&mut bytes) {
            // Top 53 bits keep the result strictly below 1.0.
            Ok(()) => (u64::from_be_bytes(bytes) >> 11) as f64 / (1u64 << 53) as f64,
            Err(e) => {
                tracing::warn!(error = %e, "Secure random unavailable, using timestamp fallback");
                (timestamp_nanos() % 1000) as f64 / 1000.0
            }
        }
    }

    fn next_index(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let mut bytes = [0u8; 4];
        match OsRng.try_fill_bytes(&mut bytes) {
            Ok(()) => u32::from_be_bytes(bytes) as usize % n,
            Err(e) => {
                tracing::warn!(error = %e, "Secure random unavailable, using timestamp fallback");
                (timestamp_nanos() % n as u128) as usize
            }
        }
    }
}

fn timestamp_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
}

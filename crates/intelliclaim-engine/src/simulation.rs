//! Simulated presentation metrics.
//!
//! Page counts, extraction confidence and per-item processing times shown to
//! clients are not measured by anything. They are drawn here so that every
//! fabricated number has one obvious source.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SimulatedMetrics {
    rng: Mutex<StdRng>,
}

impl Default for SimulatedMetrics {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl SimulatedMetrics {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible metrics for tests and demo runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// `"{x:.1}s"` with `x` uniform in `[base, base + spread)`.
    pub fn processing_time(&self, base: f64, spread: f64) -> String {
        let jitter: f64 = self.with_rng(|rng| rng.gen_range(0.0..1.0));
        format!("{:.1}s", base + jitter * spread.max(0.0))
    }

    /// Processing time of one batch item or document.
    pub fn item_processing_time(&self) -> String {
        self.processing_time(0.5, 2.0)
    }

    /// Page count in `1..=50`.
    pub fn page_count(&self) -> u32 {
        self.with_rng(|rng| rng.gen_range(1..=50))
    }

    /// Extraction confidence in `[0.95, 1.0)`.
    pub fn extraction_confidence(&self) -> f64 {
        self.with_rng(|rng| rng.gen_range(0.95..1.0))
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

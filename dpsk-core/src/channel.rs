//! Channel impairment: additive white Gaussian noise.
//!
//! The noise source is deliberately minimal — the modem treats it as an
//! external service. The RNG is supplied by the caller, so reproducibility
//! (seeded) versus entropy (thread RNG) is the caller's choice.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::errors::{ChannelError, Result};

/// Add independent N(mean, std_dev^2) draws to every sample in place.
pub fn add_gaussian_noise<R: Rng + ?Sized>(
    samples: &mut [f64],
    std_dev: f64,
    mean: f64,
    rng: &mut R,
) -> Result<()> {
    if !(std_dev.is_finite() && std_dev >= 0.0) {
        return Err(ChannelError::InvalidStandardDeviation { std_dev }.into());
    }
    let distribution = Normal::new(mean, std_dev)
        .map_err(|_| ChannelError::InvalidStandardDeviation { std_dev })?;
    for sample in samples.iter_mut() {
        *sample += distribution.sample(rng);
    }
    Ok(())
}

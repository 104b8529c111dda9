//! DPSK demodulator: passband samples in, decoded symbol values out.
//!
//! Each symbol window is projected onto one cached period of reference
//! cos/sin oscillation, the phase difference between adjacent windows is
//! taken, and the difference is mapped to a Gray value through the sector
//! table. When the carrier does not divide the sampling rate the reference
//! basis is not orthogonal over a window; the inverse of its Gram matrix
//! restores the true (I, Q) coordinates, and the reference phase is
//! re-advanced between windows to stay coherent with the received signal.

use std::f64::consts::TAU;

use num_complex::Complex64;

use crate::config::ModemConfig;
use crate::errors::{DemodulationError, Result};
use crate::gray;
use crate::matrix::Matrix2;
use crate::numerics::wrap_phase;

#[derive(Debug, Clone)]
pub struct Demodulator {
    config: ModemConfig,
    /// Start phase of the next oscillator refill.
    oscillator_phase: f64,
    /// One symbol period of reference carrier at the current phase.
    cos_table: Vec<f64>,
    sin_table: Vec<f64>,
    /// Sector boundaries B[i] = pi/M + psi + i * 2*pi/M.
    sector_bounds: Vec<f64>,
    /// Gray values in circle order; sector i decodes to entry (i + 1) mod M.
    circle_sequence: Vec<u32>,
    /// Gram-matrix inverse; present only for fractional carriers.
    decorrelation: Option<Matrix2>,
}

impl Demodulator {
    pub fn new(config: ModemConfig) -> Result<Self> {
        config.validate()?;
        let circle_sequence = gray::gray_sequence(u32::from(config.positionality))?;
        let sector_bounds = build_sector_bounds(config.positionality, config.phase_shift);
        let mut demodulator = Self {
            oscillator_phase: wrap_phase(config.phase),
            cos_table: Vec::new(),
            sin_table: Vec::new(),
            sector_bounds,
            circle_sequence,
            decorrelation: None,
            config,
        };
        demodulator.rebuild_oscillator()?;
        Ok(demodulator)
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    /// Sector boundaries of the phase-difference decision rule.
    pub fn sector_bounds(&self) -> &[f64] {
        &self.sector_bounds
    }

    /// Gray values in counter-clockwise circle order.
    pub fn circle_sequence(&self) -> &[u32] {
        &self.circle_sequence
    }

    /// Decorrelation matrix, present only when the carrier does not divide
    /// the sampling frequency.
    pub fn decorrelation_matrix(&self) -> Option<&Matrix2> {
        self.decorrelation.as_ref()
    }

    /// Demodulate a capture into symbols.
    ///
    /// The sample count must be a positive multiple of the symbol period;
    /// the first window is the pivot and is consumed without emission, so
    /// `samples.len() / N - 1` symbols come back. Every call re-arms the
    /// reference oscillator at the configured base phase, making the result
    /// a pure function of the input.
    pub fn demodulate(&mut self, samples: &[f64]) -> Result<Vec<u32>> {
        let samples_per_symbol = self.config.samples_per_symbol();
        if samples.is_empty() {
            return Err(DemodulationError::EmptyInput.into());
        }
        if samples.len() % samples_per_symbol != 0 {
            return Err(DemodulationError::SampleCountNotMultiple {
                samples: samples.len(),
                samples_per_symbol,
            }
            .into());
        }
        let fractional = !self.config.carrier_divides_sampling();
        if fractional {
            self.oscillator_phase = wrap_phase(self.config.phase);
            self.rebuild_oscillator()?;
        }

        let mut symbols = Vec::with_capacity(samples.len() / samples_per_symbol - 1);
        let mut previous_phase = None;
        for (index, window) in samples.chunks_exact(samples_per_symbol).enumerate() {
            if index > 0 && fractional {
                self.rebuild_oscillator()?;
            }
            let mut iq = self.extract_iq(window)?;
            if let Some(correction) = self.decorrelation {
                iq = correction.apply(iq);
            }
            let phase = extract_phase(iq);
            if let Some(previous) = previous_phase {
                symbols.push(self.define_symbol(phase - previous));
            }
            previous_phase = Some(phase);
        }
        Ok(symbols)
    }

    /// Demodulate per-symbol complex values (the ideal-channel form).
    pub fn demodulate_iq(&self, iq: &[Complex64]) -> Result<Vec<u32>> {
        let Some((first, rest)) = iq.split_first() else {
            return Err(DemodulationError::EmptyInput.into());
        };
        let mut symbols = Vec::with_capacity(rest.len());
        let mut previous = extract_phase(*first);
        for value in rest {
            let phase = extract_phase(*value);
            symbols.push(self.define_symbol(phase - previous));
            previous = phase;
        }
        Ok(symbols)
    }

    /// Project one symbol window onto the cached reference oscillation,
    /// returning the 2/N-scaled (I, Q) pair.
    pub fn extract_iq(&self, window: &[f64]) -> Result<Complex64> {
        if window.len() != self.cos_table.len() {
            return Err(DemodulationError::OscillatorLengthMismatch {
                window: window.len(),
                table: self.cos_table.len(),
            }
            .into());
        }
        let mut inphase = 0.0;
        let mut quadrature = 0.0;
        for ((&sample, &cos), &sin) in window
            .iter()
            .zip(&self.cos_table)
            .zip(&self.sin_table)
        {
            inphase += sample * cos;
            quadrature += sample * sin;
        }
        let scale = 2.0 / window.len() as f64;
        Ok(Complex64::new(inphase * scale, quadrature * scale))
    }

    /// Decode a phase difference to its Gray value in O(1): the sector
    /// index is the difference's distance past B[0] in 2*pi/M steps. A
    /// difference sitting exactly on a boundary belongs to the higher
    /// sector.
    pub fn define_symbol(&self, phase_difference: f64) -> u32 {
        let positionality = self.circle_sequence.len();
        let step = TAU / positionality as f64;
        let relative = wrap_phase(wrap_phase(phase_difference) - self.sector_bounds[0]);
        let sector = ((relative / step) as usize).min(positionality - 1);
        self.circle_sequence[(sector + 1) % positionality]
    }

    /// Fill one symbol period of reference carrier at the current phase,
    /// then advance the phase by a window so consecutive refills stay
    /// coherent with the received signal. For fractional carriers the
    /// Gram-matrix inverse is rebuilt alongside: it depends on the table
    /// phase. When the carrier divides the sampling rate the basis is
    /// orthogonal and no matrix is kept.
    fn rebuild_oscillator(&mut self) -> Result<()> {
        let samples_per_symbol = self.config.samples_per_symbol();
        let coefficient = self.config.carrier_cyclic_frequency() * self.config.sample_period();
        let amplitude = self.config.amplitude;
        self.cos_table.clear();
        self.sin_table.clear();
        self.cos_table.reserve(samples_per_symbol);
        self.sin_table.reserve(samples_per_symbol);
        for sample in 0..samples_per_symbol {
            let angle = coefficient * sample as f64 + self.oscillator_phase;
            self.cos_table.push(amplitude * angle.cos());
            self.sin_table.push(amplitude * angle.sin());
        }
        self.oscillator_phase =
            wrap_phase(self.oscillator_phase + coefficient * samples_per_symbol as f64);
        if !self.config.carrier_divides_sampling() {
            self.decorrelation = Some(self.gram_inverse()?);
        }
        Ok(())
    }

    fn gram_inverse(&self) -> Result<Matrix2> {
        let mut cos_cos = 0.0;
        let mut cos_sin = 0.0;
        let mut sin_sin = 0.0;
        for (&cos, &sin) in self.cos_table.iter().zip(&self.sin_table) {
            cos_cos += cos * cos;
            cos_sin += cos * sin;
            sin_sin += sin * sin;
        }
        let scale = 2.0 / self.cos_table.len() as f64;
        let gram = Matrix2::new([
            [cos_cos * scale, cos_sin * scale],
            [cos_sin * scale, sin_sin * scale],
        ]);
        Ok(gram.invert()?)
    }
}

/// Phase angle of an (I, Q) pair, wrapped to [0, 2*pi).
pub fn extract_phase(iq: Complex64) -> f64 {
    wrap_phase(iq.im.atan2(iq.re))
}

fn build_sector_bounds(positionality: u16, phase_shift: f64) -> Vec<f64> {
    let step = TAU / f64::from(positionality);
    let mut bounds = Vec::with_capacity(usize::from(positionality));
    bounds.push(step / 2.0 + phase_shift);
    for index in 1..usize::from(positionality) {
        bounds.push(bounds[index - 1] + step);
    }
    bounds
}

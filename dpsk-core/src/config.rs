//! Shared signal-parameter record for modulator, demodulator and
//! synchronizer.
//!
//! The configuration is built once, validated eagerly, and then embedded in
//! each consumer; derived tables are rebuilt at construction, so they can
//! never go stale behind a mutated parameter.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::numerics::is_power_of_two;

/// Waveform emitted per sample; the orthogonal partner is implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ModulationFunction {
    #[default]
    Sin,
    Cos,
}

/// Complete parameter set of one DPSK link direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemConfig {
    /// Sampling frequency Fs, Hz.
    pub sampling_frequency: u32,
    /// Symbol rate Rs, Bd. Must divide `sampling_frequency`.
    pub symbol_rate: u32,
    /// Constellation size M, a power of two >= 2.
    pub positionality: u16,
    /// Carrier frequency Fc, Hz. At least 4x oversampled.
    pub carrier_frequency: u32,
    /// Intermediate frequency for the single-sideband mix used when the
    /// carrier does not divide the sampling frequency.
    pub intermediate_frequency: Option<u32>,
    /// Peak amplitude, volts.
    pub amplitude: f64,
    /// Base phase of the running accumulator / reference oscillator,
    /// radians.
    pub phase: f64,
    /// Extra constellation rotation, radians. Only the value mod 2*pi is
    /// observable.
    pub phase_shift: f64,
    pub modulation_function: ModulationFunction,
    /// Permit falling back to the nearest divisor of Fs below Fc when
    /// neither Fc nor an intermediate frequency divides Fs. The fallback
    /// silently retunes the carrier, so it is off unless asked for.
    pub allow_surrogate_carrier: bool,
}

impl ModemConfig {
    /// Start from a sampling frequency and symbol rate; the carrier
    /// defaults to the symbol rate, positionality to binary DPSK.
    pub fn new(sampling_frequency: u32, symbol_rate: u32) -> Self {
        Self {
            sampling_frequency,
            symbol_rate,
            positionality: 2,
            carrier_frequency: symbol_rate,
            intermediate_frequency: None,
            amplitude: 1.0,
            phase: 0.0,
            phase_shift: 0.0,
            modulation_function: ModulationFunction::default(),
            allow_surrogate_carrier: false,
        }
    }

    pub fn with_positionality(mut self, positionality: u16) -> Self {
        self.positionality = positionality;
        self
    }

    pub fn with_carrier_frequency(mut self, carrier_frequency: u32) -> Self {
        self.carrier_frequency = carrier_frequency;
        self
    }

    pub fn with_intermediate_frequency(mut self, intermediate_frequency: u32) -> Self {
        self.intermediate_frequency = Some(intermediate_frequency);
        self
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_phase_shift(mut self, phase_shift: f64) -> Self {
        self.phase_shift = phase_shift;
        self
    }

    pub fn with_modulation_function(mut self, function: ModulationFunction) -> Self {
        self.modulation_function = function;
        self
    }

    pub fn with_surrogate_carrier(mut self, allow: bool) -> Self {
        self.allow_surrogate_carrier = allow;
        self
    }

    /// Check every structural invariant, naming the first violated one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling_frequency == 0 {
            return Err(ConfigError::SamplingFrequencyZero);
        }
        if self.symbol_rate == 0 {
            return Err(ConfigError::SymbolRateZero);
        }
        if self.sampling_frequency % self.symbol_rate != 0 {
            return Err(ConfigError::SymbolRateNotDivisor {
                sampling_frequency: self.sampling_frequency,
                symbol_rate: self.symbol_rate,
            });
        }
        if self.positionality < 2 || !is_power_of_two(u32::from(self.positionality)) {
            return Err(ConfigError::InvalidPositionality {
                positionality: self.positionality,
            });
        }
        if self.carrier_frequency == 0 {
            return Err(ConfigError::CarrierFrequencyZero);
        }
        if 4 * u64::from(self.carrier_frequency) > u64::from(self.sampling_frequency) {
            return Err(ConfigError::NyquistViolation {
                carrier_frequency: self.carrier_frequency,
                sampling_frequency: self.sampling_frequency,
            });
        }
        if !(self.amplitude.is_finite() && self.amplitude > 0.0) {
            return Err(ConfigError::InvalidAmplitude {
                amplitude: self.amplitude,
            });
        }
        if !self.phase.is_finite() {
            return Err(ConfigError::NonFinitePhase {
                field: "phase",
                value: self.phase,
            });
        }
        if !self.phase_shift.is_finite() {
            return Err(ConfigError::NonFinitePhase {
                field: "phase_shift",
                value: self.phase_shift,
            });
        }
        if let Some(intermediate) = self.intermediate_frequency {
            if intermediate == 0 {
                return Err(ConfigError::IntermediateFrequencyZero);
            }
            if 4 * u64::from(intermediate) > u64::from(self.sampling_frequency) {
                return Err(ConfigError::IntermediateNyquistViolation {
                    intermediate_frequency: intermediate,
                    sampling_frequency: self.sampling_frequency,
                });
            }
            if self.sampling_frequency % intermediate != 0 {
                return Err(ConfigError::IntermediateFrequencyNotDivisor {
                    intermediate_frequency: intermediate,
                    sampling_frequency: self.sampling_frequency,
                });
            }
        }
        Ok(())
    }

    /// Samples per symbol N = Fs / Rs.
    pub fn samples_per_symbol(&self) -> usize {
        (self.sampling_frequency / self.symbol_rate) as usize
    }

    /// Bits per symbol k = log2 M.
    pub fn bits_per_symbol(&self) -> u32 {
        u32::from(self.positionality).trailing_zeros()
    }

    /// Sample period 1 / Fs, seconds.
    pub fn sample_period(&self) -> f64 {
        1.0 / f64::from(self.sampling_frequency)
    }

    /// Angular carrier frequency 2*pi*Fc, rad/s.
    pub fn carrier_cyclic_frequency(&self) -> f64 {
        TAU * f64::from(self.carrier_frequency)
    }

    /// True when a whole number of carrier periods fits the sampling grid.
    pub fn carrier_divides_sampling(&self) -> bool {
        self.sampling_frequency % self.carrier_frequency == 0
    }
}

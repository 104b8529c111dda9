//! DPSK modulator: bit stream in, real passband samples out.
//!
//! Information rides on the phase *change* between consecutive symbols.
//! Each symbol advances the running phase by its Gray-ranked step, then one
//! symbol period of carrier is emitted with that phase. When the carrier
//! does not divide the sampling rate, the waveform is produced by a
//! single-sideband mix around an intermediate frequency that does.

use std::f64::consts::TAU;

use num_complex::Complex64;
use tracing::warn;

use crate::config::{ModemConfig, ModulationFunction};
use crate::errors::{ConfigError, ModulationError, Result};
use crate::gray;
use crate::numerics::{self, Direction};

/// Whether the caller's bit stream already contains the reference symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotMode {
    /// The first symbol of the stream is the phase reference.
    WithPivot,
    /// Prepend a zero reference symbol before the data.
    #[default]
    WithoutPivot,
}

/// Carrier actually used for sample generation.
enum CarrierPlan {
    /// Fc divides Fs; modulate on the carrier directly.
    Direct,
    /// Mix around the configured intermediate frequency.
    Intermediate(u32),
    /// Opt-in fallback divisor of Fs below Fc.
    Surrogate(u32),
}

#[derive(Debug, Clone)]
pub struct Modulator {
    config: ModemConfig,
    /// Running phase accumulator, kept in [0, 2*pi).
    phase: f64,
    /// Symbol value -> assigned phase step, Gray-ranked around the circle.
    phase_map: Vec<f64>,
}

impl Modulator {
    pub fn new(config: ModemConfig) -> Result<Self> {
        config.validate()?;
        let phase_map = build_phase_map(config.positionality, config.phase_shift)?;
        Ok(Self {
            phase: numerics::wrap_phase(config.phase),
            phase_map,
            config,
        })
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    /// Current value of the running phase accumulator.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Re-anchor the running phase, e.g. between transmissions.
    pub fn set_phase(&mut self, phase: f64) {
        self.phase = numerics::wrap_phase(phase);
    }

    /// Phase step assigned to each symbol value.
    pub fn phase_map(&self) -> &[f64] {
        &self.phase_map
    }

    /// Modulate a bit stream into `N * symbols` real passband samples.
    ///
    /// Bits are packed MSB-first into `log2 M`-bit symbols; a short leading
    /// group is implicitly zero-padded on the left. An empty stream without
    /// a pivot still emits the lone reference symbol.
    pub fn modulate(&mut self, bits: &[u8], pivot: PivotMode) -> Result<Vec<f64>> {
        let symbols = self.symbols_for(bits, pivot)?;
        let samples_per_symbol = self.config.samples_per_symbol();
        let mut samples = Vec::with_capacity(samples_per_symbol * symbols.len());
        match self.resolve_carrier()? {
            CarrierPlan::Direct => {
                let carrier = self.config.carrier_frequency;
                self.emit_classical(&symbols, carrier, &mut samples);
            }
            CarrierPlan::Surrogate(carrier) => {
                warn!(
                    carrier_frequency = self.config.carrier_frequency,
                    surrogate = carrier,
                    "carrier does not divide the sampling frequency; using surrogate carrier"
                );
                self.emit_classical(&symbols, carrier, &mut samples);
            }
            CarrierPlan::Intermediate(intermediate) => {
                self.emit_intermediate(&symbols, intermediate, &mut samples);
            }
        }
        Ok(samples)
    }

    /// Emit one unit phasor per symbol instead of passband samples.
    ///
    /// The complex-baseband form skips the carrier entirely and is the
    /// ideal-channel counterpart of [`Demodulator::demodulate_iq`].
    ///
    /// [`Demodulator::demodulate_iq`]: crate::demodulator::Demodulator::demodulate_iq
    pub fn complex_modulate(&mut self, bits: &[u8], pivot: PivotMode) -> Result<Vec<Complex64>> {
        let symbols = self.symbols_for(bits, pivot)?;
        let mut output = Vec::with_capacity(symbols.len());
        for &symbol in &symbols {
            self.advance_phase(symbol);
            output.push(Complex64::new(self.phase.cos(), self.phase.sin()));
        }
        Ok(output)
    }

    fn symbols_for(&self, bits: &[u8], pivot: PivotMode) -> Result<Vec<u32>> {
        if bits.is_empty() && pivot == PivotMode::WithPivot {
            return Err(ModulationError::EmptyBitStream.into());
        }
        let mut symbols = numerics::bits_to_symbols(bits, self.config.bits_per_symbol());
        if pivot == PivotMode::WithoutPivot {
            symbols.insert(0, 0);
        }
        Ok(symbols)
    }

    fn resolve_carrier(&self) -> Result<CarrierPlan> {
        if self.config.carrier_divides_sampling() {
            return Ok(CarrierPlan::Direct);
        }
        if let Some(intermediate) = self.config.intermediate_frequency {
            return Ok(CarrierPlan::Intermediate(intermediate));
        }
        if self.config.allow_surrogate_carrier {
            let surrogate = numerics::nearest_divisor(
                self.config.carrier_frequency,
                self.config.sampling_frequency,
                Direction::Below,
            )?;
            return Ok(CarrierPlan::Surrogate(surrogate));
        }
        Err(ConfigError::IntermediateFrequencyMissing {
            carrier_frequency: self.config.carrier_frequency,
            sampling_frequency: self.config.sampling_frequency,
        }
        .into())
    }

    fn advance_phase(&mut self, symbol: u32) {
        self.phase = numerics::wrap_phase(self.phase + self.phase_map[symbol as usize]);
    }

    /// Whole carrier periods fit one symbol: the sample clock restarts with
    /// every symbol and the phase enters with a minus sign (counter-clockwise
    /// rotation on the constellation circle).
    fn emit_classical(&mut self, symbols: &[u32], carrier_frequency: u32, out: &mut Vec<f64>) {
        let waveform = waveform_of(self.config.modulation_function);
        let samples_per_symbol = self.config.samples_per_symbol();
        let amplitude = self.config.amplitude;
        let coefficient = TAU * f64::from(carrier_frequency) * self.config.sample_period();
        for &symbol in symbols {
            self.advance_phase(symbol);
            for sample in 0..samples_per_symbol {
                out.push(amplitude * waveform(coefficient * sample as f64 - self.phase));
            }
        }
    }

    /// Single-sideband mix: f(w_if*t - phi) * g(dw*t) - g(w_if*t - phi) * f(dw*t)
    /// collapses to a clean carrier at Fc over the absolute sample index t,
    /// even though only the intermediate frequency divides Fs.
    fn emit_intermediate(&mut self, symbols: &[u32], intermediate_frequency: u32, out: &mut Vec<f64>) {
        let waveform = waveform_of(self.config.modulation_function);
        let orthogonal = orthogonal_of(self.config.modulation_function);
        let samples_per_symbol = self.config.samples_per_symbol();
        let amplitude = self.config.amplitude;
        let period = self.config.sample_period();
        let intermediate_coefficient = TAU * f64::from(intermediate_frequency) * period;
        let difference_coefficient =
            TAU * (f64::from(intermediate_frequency) - f64::from(self.config.carrier_frequency)) * period;
        for (index, &symbol) in symbols.iter().enumerate() {
            self.advance_phase(symbol);
            for sample in 0..samples_per_symbol {
                let t = (index * samples_per_symbol + sample) as f64;
                let inphase = amplitude * waveform(intermediate_coefficient * t - self.phase);
                let quadrature = amplitude * orthogonal(intermediate_coefficient * t - self.phase);
                out.push(
                    inphase * orthogonal(difference_coefficient * t)
                        - quadrature * waveform(difference_coefficient * t),
                );
            }
        }
    }
}

/// Resolve the tagged selector to a plain function pointer once per call;
/// the per-sample loops stay branch-free.
fn waveform_of(function: ModulationFunction) -> fn(f64) -> f64 {
    match function {
        ModulationFunction::Sin => f64::sin,
        ModulationFunction::Cos => f64::cos,
    }
}

fn orthogonal_of(function: ModulationFunction) -> fn(f64) -> f64 {
    match function {
        ModulationFunction::Sin => f64::cos,
        ModulationFunction::Cos => f64::sin,
    }
}

/// Assign each symbol value its absolute phase step around the circle:
/// the i-th Gray code sits at i * 2*pi/M, plus the constellation shift.
fn build_phase_map(positionality: u16, phase_shift: f64) -> Result<Vec<f64>> {
    let sequence = gray::gray_sequence(u32::from(positionality))?;
    let step = TAU / f64::from(positionality);
    let mut map = vec![0.0; usize::from(positionality)];
    for (rank, &symbol) in sequence.iter().enumerate() {
        map[symbol as usize] = step * rank as f64 + phase_shift;
    }
    Ok(map)
}

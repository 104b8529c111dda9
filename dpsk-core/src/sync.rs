//! Clock-phase synchronization: locating symbol boundaries in a capture.
//!
//! A pure sinusoid of angular frequency wc obeys the second-order linear
//! recurrence x[n] = 2*cos(wc/Fs) * x[n-1] - x[n-2]. Phase jumps at symbol
//! transitions break the recurrence, so every sample whose prediction
//! misses by more than a threshold marks a candidate boundary. Candidate
//! positions are averaged as unit phasors on the symbol-period circle:
//! angles live on a circle, and outliers must cancel instead of dragging a
//! linear mean.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use num_complex::Complex64;
use tracing::debug;

use crate::config::ModemConfig;
use crate::errors::{Result, SyncError};
use crate::numerics::wrap_phase;

/// Default ring capacity, in symbol periods.
const DEFAULT_CAPACITY_SYMBOLS: usize = 64;

#[derive(Debug, Clone)]
pub struct ClockSynchronizer {
    samples_per_symbol: usize,
    /// 2 * cos(wc / Fs), the recurrence coefficient of the clean carrier.
    recurrence_coefficient: f64,
    /// Prediction deviations above this mark a candidate boundary.
    threshold: f64,
    /// Collect at most this many candidates per estimate.
    candidate_budget: usize,
    /// Recent samples for streaming use; oldest fall off when full.
    buffer: VecDeque<f64>,
    capacity: usize,
}

impl ClockSynchronizer {
    pub fn new(config: &ModemConfig, threshold: f64, candidate_budget: usize) -> Result<Self> {
        config.validate()?;
        if !(threshold > 0.0) {
            return Err(SyncError::ThresholdNotPositive { threshold }.into());
        }
        if candidate_budget == 0 {
            return Err(SyncError::CandidateBudgetZero.into());
        }
        let samples_per_symbol = config.samples_per_symbol();
        Ok(Self {
            samples_per_symbol,
            recurrence_coefficient: 2.0
                * (config.carrier_cyclic_frequency() * config.sample_period()).cos(),
            threshold,
            candidate_budget,
            buffer: VecDeque::new(),
            capacity: DEFAULT_CAPACITY_SYMBOLS * samples_per_symbol,
        })
    }

    pub fn samples_per_symbol(&self) -> usize {
        self.samples_per_symbol
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn candidate_budget(&self) -> usize {
        self.candidate_budget
    }

    pub fn buffer_capacity(&self) -> usize {
        self.capacity
    }

    /// Resize the ring; it must hold at least one symbol. Shrinking drops
    /// the oldest samples.
    pub fn set_buffer_capacity(&mut self, capacity: usize) -> Result<()> {
        if capacity < self.samples_per_symbol {
            return Err(SyncError::CapacityTooSmall {
                capacity,
                samples_per_symbol: self.samples_per_symbol,
            }
            .into());
        }
        self.capacity = capacity;
        while self.buffer.len() > capacity {
            self.buffer.pop_front();
        }
        Ok(())
    }

    /// Estimate the sample offset of the first whole symbol, in [0, N).
    ///
    /// A capture whose symbols start at sample zero reports 0; a capture
    /// preceded by K extra samples reports K mod N. Fewer candidates than
    /// the budget is fine; a capture with no recurrence break at all (a
    /// clean unbroken carrier) reports 0.
    pub fn find_clock_phase(&self, samples: &[f64]) -> Result<usize> {
        let period = self.samples_per_symbol;
        if samples.len() < period {
            return Err(SyncError::CaptureTooShort {
                samples: samples.len(),
                samples_per_symbol: period,
            }
            .into());
        }
        let mut accumulator = Complex64::new(0.0, 0.0);
        let mut found = 0usize;
        let mut index = 2usize;
        while index < samples.len() && found < self.candidate_budget {
            let predicted =
                self.recurrence_coefficient * samples[index - 1] - samples[index - 2];
            if (predicted - samples[index]).abs() > self.threshold {
                let position = index % period;
                accumulator += Complex64::from_polar(1.0, TAU * position as f64 / period as f64);
                found += 1;
                // the prediction straddling a boundary fails twice; count it once
                index += 2;
            } else {
                index += 1;
            }
        }
        debug!(candidates = found, "clock-phase candidates collected");
        if found == 0 {
            return Ok(0);
        }
        let argument = wrap_phase(accumulator.im.atan2(accumulator.re));
        Ok((argument * period as f64 / TAU).round() as usize % period)
    }

    /// Append a capture chunk to the ring, dropping the oldest samples when
    /// the capacity is exceeded.
    pub fn push_samples(&mut self, samples: &[f64]) {
        for &sample in samples {
            if self.buffer.len() == self.capacity {
                self.buffer.pop_front();
            }
            self.buffer.push_back(sample);
        }
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Locate the clock phase in the buffered capture and hand back the
    /// aligned whole-symbol run, keeping the tail for the next call.
    ///
    /// Returns an empty vector while the ring holds less than one full
    /// symbol past the boundary.
    pub fn take_aligned(&mut self) -> Result<Vec<f64>> {
        let period = self.samples_per_symbol;
        if self.buffer.len() < period {
            return Ok(Vec::new());
        }
        let window: Vec<f64> = self.buffer.iter().copied().collect();
        let offset = self.find_clock_phase(&window)?;
        let whole = (window.len() - offset) / period * period;
        if whole == 0 {
            return Ok(Vec::new());
        }
        self.buffer.drain(..offset);
        Ok(self.buffer.drain(..whole).collect())
    }
}

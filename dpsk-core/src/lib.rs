//! dpsk-core
//!
//! Software implementation of an M-ary differential phase-shift keying
//! (DPSK) modem: Gray-coded symbol mapping, a modulator with classical and
//! intermediate-frequency modes, a demodulator with I/Q extraction and
//! basis decorrelation, and a clock-phase synchronizer that locates symbol
//! boundaries in a captured sample stream.
//!
//! The modem is single-threaded by design: every instance owns its derived
//! tables, and running a modulator and demodulator concurrently means
//! giving each thread its own instance.

pub mod channel;
pub mod config;
pub mod demodulator;
pub mod errors;
pub mod gray;
pub mod matrix;
pub mod modulator;
pub mod numerics;
pub mod sync;

// Re-export the canonical modem interface
pub use config::{ModemConfig, ModulationFunction};
pub use demodulator::{extract_phase, Demodulator};
pub use errors::{ModemError, Result};
pub use matrix::Matrix2;
pub use modulator::{Modulator, PivotMode};
pub use sync::ClockSynchronizer;

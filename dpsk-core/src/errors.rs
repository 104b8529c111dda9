//! Modem error types with granular categories

use thiserror::Error;

/// Top-level error type for all modem operations
#[derive(Debug, Error)]
pub enum ModemError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Modulation error: {0}")]
    Modulation(#[from] ModulationError),

    #[error("Demodulation error: {0}")]
    Demodulation(#[from] DemodulationError),

    #[error("Clock synchronization error: {0}")]
    Sync(#[from] SyncError),

    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),

    #[error("Numeric error: {0}")]
    Numerics(#[from] NumericsError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Signal-parameter validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Sampling frequency must be positive")]
    SamplingFrequencyZero,

    #[error("Symbol rate must be positive")]
    SymbolRateZero,

    #[error("Sampling frequency {sampling_frequency} Hz is not a multiple of the symbol rate {symbol_rate} Bd")]
    SymbolRateNotDivisor {
        sampling_frequency: u32,
        symbol_rate: u32,
    },

    #[error("Positionality {positionality} is not a power of two >= 2")]
    InvalidPositionality { positionality: u16 },

    #[error("Carrier frequency must be positive")]
    CarrierFrequencyZero,

    #[error("Nyquist violation: 4 * {carrier_frequency} Hz exceeds the sampling frequency {sampling_frequency} Hz")]
    NyquistViolation {
        carrier_frequency: u32,
        sampling_frequency: u32,
    },

    #[error("Amplitude {amplitude} must be positive and finite")]
    InvalidAmplitude { amplitude: f64 },

    #[error("{field} must be finite, got {value}")]
    NonFinitePhase { field: &'static str, value: f64 },

    #[error("Intermediate frequency must be positive")]
    IntermediateFrequencyZero,

    #[error("Nyquist violation: 4 * {intermediate_frequency} Hz exceeds the sampling frequency {sampling_frequency} Hz")]
    IntermediateNyquistViolation {
        intermediate_frequency: u32,
        sampling_frequency: u32,
    },

    #[error("Sampling frequency {sampling_frequency} Hz is not a multiple of the intermediate frequency {intermediate_frequency} Hz")]
    IntermediateFrequencyNotDivisor {
        intermediate_frequency: u32,
        sampling_frequency: u32,
    },

    #[error("Carrier {carrier_frequency} Hz does not divide the sampling frequency {sampling_frequency} Hz and no intermediate frequency is configured")]
    IntermediateFrequencyMissing {
        carrier_frequency: u32,
        sampling_frequency: u32,
    },
}

/// Modulation input errors
#[derive(Debug, Error)]
pub enum ModulationError {
    #[error("Bit stream is empty; modulation with an explicit pivot requires at least one bit")]
    EmptyBitStream,
}

/// Demodulation input errors
#[derive(Debug, Error)]
pub enum DemodulationError {
    #[error("Sample stream is empty")]
    EmptyInput,

    #[error("Sample count {samples} is not a positive multiple of {samples_per_symbol} samples per symbol")]
    SampleCountNotMultiple {
        samples: usize,
        samples_per_symbol: usize,
    },

    /// Internal contract violation: indicates a configuration-ordering bug,
    /// not a recoverable input condition.
    #[error("Symbol window of {window} samples does not match the {table}-sample oscillator table")]
    OscillatorLengthMismatch { window: usize, table: usize },
}

/// Clock-phase synchronizer errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Capture of {samples} samples is shorter than one symbol of {samples_per_symbol} samples")]
    CaptureTooShort {
        samples: usize,
        samples_per_symbol: usize,
    },

    #[error("Deviation threshold {threshold} must be positive")]
    ThresholdNotPositive { threshold: f64 },

    #[error("Candidate budget must be positive")]
    CandidateBudgetZero,

    #[error("Buffer capacity {capacity} is smaller than one symbol of {samples_per_symbol} samples")]
    CapacityTooSmall {
        capacity: usize,
        samples_per_symbol: usize,
    },
}

/// 2x2 matrix errors
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("Matrix is singular (determinant {determinant}); cannot invert")]
    Singular { determinant: f64 },
}

/// Numeric helper errors
#[derive(Debug, Error)]
pub enum NumericsError {
    #[error("Value {value} is not a power of two")]
    NotPowerOfTwo { value: u32 },

    #[error("No divisor of {of} found {direction} {value}")]
    NoDivisor {
        value: u32,
        of: u32,
        direction: &'static str,
    },

    #[error("{name} must be positive")]
    ZeroArgument { name: &'static str },
}

/// Noise-source errors
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Standard deviation {std_dev} must be non-negative and finite")]
    InvalidStandardDeviation { std_dev: f64 },
}

/// Result type alias for modem operations
pub type Result<T> = std::result::Result<T, ModemError>;

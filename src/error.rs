use serde::{Deserialize, Serialize};

use crate::Phase;

/// Invalid filter, rate or loop parameters.
///
/// These are detected eagerly, before any sample is processed.
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// The filter needs at least one tap
    #[error("tap count must be positive")]
    TapCount,
    /// Sampling frequency is zero, negative or not finite
    #[error("invalid sampling frequency {0}")]
    SampleRate(f64),
    /// Cutoff is not inside `(0, fs/2)`
    #[error("cutoff {cutoff} not below Nyquist frequency {nyquist}")]
    Cutoff {
        /// Requested cutoff frequency
        cutoff: f64,
        /// Half the sampling frequency
        nyquist: f64,
    },
    /// The bit rate is not an integer multiple of the audio rate
    #[error("bit rate {bit_rate} is not an integer multiple of audio rate {audio_rate}")]
    Ratio {
        /// Oversampled bit rate
        bit_rate: u32,
        /// Audio sample rate
        audio_rate: u32,
    },
    /// Modulator order other than 1 or 2
    #[error("unsupported modulator order {0}")]
    Order(u8),
    /// Moving average window must be non-empty
    #[error("smoothing window must be positive")]
    Window,
    /// Tolerance must be positive and finite
    #[error("invalid tolerance {0}")]
    Tolerance(f64),
}

/// Crate error
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid configuration
    #[error("configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    /// Oversampling factor below 1
    #[error("invalid oversampling factor {factor}")]
    InvalidFactor {
        /// The offending factor
        factor: usize,
    },
    /// Scoreboard operation not valid in the current phase
    #[error("scoreboard is {actual:?}, expected {expected:?}")]
    Phase {
        /// Phase required by the operation
        expected: Phase,
        /// Phase the scoreboard is in
        actual: Phase,
    },
}

/// Non-fatal runtime findings attached to results.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// Captured and reference streams differ in length.
    ///
    /// Both were truncated to the shorter one before comparison.
    LengthMismatch {
        /// Captured implementation bits
        captured: usize,
        /// Model reference bits
        reference: usize,
    },
    /// A modulator integrator exceeded the sane magnitude bound.
    ///
    /// The loop has no saturation. This usually means unscaled or
    /// out-of-range input or a loop that has lost stability.
    AccumulatorOverflow {
        /// First sample index at which the bound was exceeded
        index: usize,
        /// Peak integrator magnitude seen during the run
        magnitude: u128,
        /// The configured bound
        bound: u64,
    },
    /// Too few bits for a single smoothing window
    InsufficientData {
        /// Compared length after truncation
        len: usize,
        /// Smoothing window
        window: usize,
    },
}

//! Upload validation errors.

use thiserror::Error;

/// Errors reported when a wavetable upload is refused.
///
/// All of these leave the oscillator untouched: the previously uploaded
/// wavetable keeps playing.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WavetableError {
    /// Supplied buffer does not match the expected sample count.
    #[error("wavetable length {got} does not match the expected {expected} samples")]
    LengthMismatch {
        /// Sample count the oscillator was configured for.
        expected: usize,
        /// Sample count actually supplied.
        got: usize,
    },

    /// Cycle length must be a power of two for mask-based looping.
    #[error("frame length {0} is not a power of two")]
    FrameLenNotPowerOfTwo(usize),

    /// Frame count outside the supported range.
    #[error("frame count {0} must be a power of two between 1 and 256")]
    BadFrameCount(usize),
}

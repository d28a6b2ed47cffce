//! Ondas Analysis - spectral measurement helpers
//!
//! Small measurement kit used by the engine's integration tests, benches
//! and demos:
//!
//! - [`Fft`]: forward/inverse FFT with cached plans and window functions
//! - [`magnitude_db`]: complex spectrum to dB magnitudes
//! - [`goertzel`]: single-bin DFT amplitude, O(N) without a full transform
//! - [`rms`] / [`amplitude_db`]: level measurements
//!
//! Everything here runs offline; nothing is meant for the audio thread.

pub mod fft;
pub mod spectrum;

pub use fft::{bin_amplitudes, Fft, Window};
pub use spectrum::{amplitude_db, goertzel, magnitude_db, rms};

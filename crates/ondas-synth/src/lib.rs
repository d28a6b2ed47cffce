//! Ondas Synth - wavetable oscillator node
//!
//! The thin host-facing shell around the [`ondas_core`] resampling engine:
//!
//! - [`WavetableOscillator`] - single voice playing an uploaded wavetable
//!   (one cycle or a pack of morphable frames) at a pitch expressed in
//!   octaves, fanned out to stereo
//! - [`waveform`] - single-cycle generators for demos and tests
//! - [`WavetableError`] - upload validation errors
//!
//! ```rust
//! use ondas_synth::{waveform, WavetableOscillator};
//!
//! let mut osc = WavetableOscillator::new(2048);
//! osc.prepare(512);
//! osc.upload_wavetable(&waveform::sine_cycle(2048)).unwrap();
//! osc.set_pitch_octaves(1.5);
//! osc.set_volume(0.8);
//!
//! let mut left = [0.0f32; 256];
//! let mut right = [0.0f32; 256];
//! osc.render_stereo(&mut left, &mut right);
//! ```

pub mod error;
pub mod waveform;
pub mod wavetable_oscillator;

pub use error::WavetableError;
pub use wavetable_oscillator::{WavetableOscillator, MAX_FRAMES, PITCH_MAX_OCT, PITCH_MIN_OCT};

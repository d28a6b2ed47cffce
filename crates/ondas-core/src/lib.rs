//! Ondas Core - band-limited wavetable resampling engine
//!
//! This crate implements a pitch-shifting resampler for periodic waveforms
//! that stays free of aliasing across a wide upward transposition range:
//!
//! - [`MipMap`] / [`MipMapSet`]: dyadic hierarchies of progressively
//!   low-passed copies of a source cycle
//! - [`InterpPack`]: polyphase windowed-FIR fractional interpolators
//!   (12-tap normal rate, 24-tap oversampled) with linear inter-phase blend
//! - [`Downsampler2`]: 2-path all-pass IIR half-band filter that folds the
//!   2x oversampled stream back to output rate
//! - [`VoiceState`]: 32.32 fixed-point phase accumulator with per-voice
//!   cycle masking for single-cycle looping
//! - [`Resampler`]: the block renderer tying it together, hiding mip-level,
//!   path and frame switches behind a 64-sample crossfade
//!
//! Pitch is relative to the source cycle, expressed in 1/65536 octave steps
//! (`0x10000` = one octave up). The render path performs no allocation and
//! no locking; wavetable uploads build a mip hierarchy off-thread and are
//! handed over by swapping an `Arc`.
//!
//! ## no_std Support
//!
//! This crate is `no_std` compatible (it allocates only at build/setup
//! time). Use `default-features = false` in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! ondas-core = { version = "0.1", default-features = false }
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use ondas_core::{InterpPack, MipMap, BuildMode, Resampler, tables};
//! use alloc::sync::Arc;
//!
//! let mut mip = MipMap::new();
//! mip.init_sample(2048, InterpPack::len_pre(), InterpPack::len_post(),
//!                 12, &tables::MIP_FIR, BuildMode::Cyclic);
//! mip.fill_sample(&cycle);
//!
//! let mut voice = Resampler::new();
//! voice.set_interp(Arc::new(InterpPack::new()));
//! voice.set_cycle(2048);
//! voice.set_sample(Arc::new(mip));
//! voice.set_pitch(0x18000); // +1.5 octaves
//! voice.interpolate_block(&mut out);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod downsampler;
pub mod fixed;
pub mod interp;
pub mod mipmap;
pub mod mipmap_set;
pub mod resampler;
pub mod tables;
pub mod voice;

// Re-export main types at crate root
pub use downsampler::Downsampler2;
pub use interp::InterpPack;
pub use mipmap::{BuildMode, MipMap, MipSource};
pub use mipmap_set::MipMapSet;
pub use resampler::{Resampler, BUF_LEN};
pub use voice::{VoiceState, FADE_LEN, NBR_BITS_PER_OCT};

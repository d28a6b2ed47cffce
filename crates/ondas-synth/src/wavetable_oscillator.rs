//! Host-facing wavetable oscillator voice.

use std::sync::Arc;

use ondas_core::{fixed, tables, InterpPack, MipMapSet, Resampler};

use crate::error::WavetableError;

/// Lowest accepted pitch, in octaves relative to the base cycle.
pub const PITCH_MIN_OCT: f32 = -2.0;

/// Highest accepted pitch, in octaves relative to the base cycle.
pub const PITCH_MAX_OCT: f32 = 10.0;

/// Upper bound on morphable frames per wavetable.
pub const MAX_FRAMES: usize = 256;

/// Mip levels built per frame; pitches up to [`PITCH_MAX_OCT`] stay well
/// inside the hierarchy.
const NBR_TABLES: usize = 12;

/// One wavetable voice: upload a cycle (or a pack of frames), set volume,
/// pitch and frame, render stereo blocks.
///
/// The render path performs no allocation once [`WavetableOscillator::prepare`]
/// has sized the scratch buffer; wavetable uploads build the mip hierarchy
/// and are meant to happen off the audio thread.
///
/// Parameter changes take effect at the start of the next rendered block.
/// Volume is de-zippered with a linear ramp across the block; pitch and
/// frame switches crossfade inside the resampler.
pub struct WavetableOscillator {
    resampler: Resampler<MipMapSet>,
    scratch: Vec<f32>,
    frame_len: usize,
    loaded: bool,
    volume: f32,
    volume_target: f32,
    pitch_oct: f32,
    frame: u32,
}

impl WavetableOscillator {
    /// Create a voice for cycles of `frame_len` samples (a power of two,
    /// typically 2048; anything else is rejected at upload time).
    pub fn new(frame_len: usize) -> Self {
        let mut resampler = Resampler::new();
        resampler.set_interp(Arc::new(InterpPack::new()));
        Self {
            resampler,
            scratch: Vec::new(),
            frame_len,
            loaded: false,
            volume: 1.0,
            volume_target: 1.0,
            pitch_oct: 0.0,
            frame: 0,
        }
    }

    /// Size the scratch buffer for the largest block the host will request.
    pub fn prepare(&mut self, max_block_len: usize) {
        self.scratch.resize(max_block_len, 0.0);
    }

    /// Upload a single-cycle wavetable of exactly `frame_len` samples.
    ///
    /// On error the previous wavetable (if any) keeps playing.
    pub fn upload_wavetable(&mut self, cycle: &[f32]) -> Result<(), WavetableError> {
        self.upload_wavetable_frames(cycle, 1, 0)
    }

    /// Upload a packed multi-frame wavetable:
    /// `nbr_frames * (frame_len + frame_pad)` samples, each pad region
    /// conventionally repeating the head of its frame.
    pub fn upload_wavetable_frames(
        &mut self,
        wavetable: &[f32],
        nbr_frames: usize,
        frame_pad: usize,
    ) -> Result<(), WavetableError> {
        if !self.frame_len.is_power_of_two() {
            return Err(WavetableError::FrameLenNotPowerOfTwo(self.frame_len));
        }
        if nbr_frames == 0 || nbr_frames > MAX_FRAMES || !nbr_frames.is_power_of_two() {
            return Err(WavetableError::BadFrameCount(nbr_frames));
        }
        let expected = nbr_frames * (self.frame_len + frame_pad);
        if wavetable.len() != expected {
            return Err(WavetableError::LengthMismatch {
                expected,
                got: wavetable.len(),
            });
        }

        let set = MipMapSet::build(
            wavetable,
            self.frame_len,
            frame_pad,
            nbr_frames,
            InterpPack::len_pre(),
            InterpPack::len_post(),
            NBR_TABLES,
            &tables::MIP_FIR,
        );

        self.resampler.clear_buffers();
        self.resampler.set_cycle(self.frame_len as u32);
        self.resampler.set_sample(Arc::new(set));
        self.frame = 0;
        self.loaded = true;
        Ok(())
    }

    /// Target output gain in [0, 1]; ramped linearly across the next block.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume_target = volume.clamp(0.0, 1.0);
    }

    /// Current (smoothed) volume.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Pitch in octaves relative to the base cycle, clamped to
    /// [`PITCH_MIN_OCT`, `PITCH_MAX_OCT`].
    pub fn set_pitch_octaves(&mut self, pitch: f32) {
        self.pitch_oct = pitch.clamp(PITCH_MIN_OCT, PITCH_MAX_OCT);
    }

    /// Current pitch in octaves.
    pub fn pitch_octaves(&self) -> f32 {
        self.pitch_oct
    }

    /// Select the wavetable frame to play (wrapped into the frame count).
    pub fn set_frame(&mut self, frame: u32) {
        self.frame = frame;
    }

    /// Currently requested frame.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Rewind playback state (crossfades, filter tails). Parameters and the
    /// wavetable stay.
    pub fn reset(&mut self) {
        if self.loaded {
            self.resampler.clear_buffers();
        }
        self.volume = self.volume_target;
    }

    /// Render one block into both channels (same signal on each).
    ///
    /// Without an uploaded wavetable the block is silence.
    ///
    /// # Panics
    /// Panics if the block is longer than [`WavetableOscillator::prepare`]
    /// allowed for.
    pub fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        assert_eq!(left.len(), right.len());
        let nbr_spl = left.len();
        if nbr_spl == 0 {
            return;
        }
        assert!(
            nbr_spl <= self.scratch.len(),
            "block longer than prepare() allowed for"
        );

        if !self.loaded {
            left.fill(0.0);
            right.fill(0.0);
            self.volume = self.volume_target;
            return;
        }

        let fixed_pitch = fixed::round_long(f64::from(self.pitch_oct) * 65536.0);
        self.resampler.set_pitch(fixed_pitch);
        self.resampler.set_frame(self.frame);
        self.resampler.interpolate_block(&mut self.scratch[..nbr_spl]);

        let vol_step = (self.volume_target - self.volume) / nbr_spl as f32;
        let mut vol = self.volume;
        for (i, (l, r)) in left.iter_mut().zip(right.iter_mut()).enumerate() {
            vol += vol_step;
            let sample = self.scratch[i] * vol;
            *l = sample;
            *r = sample;
        }
        self.volume = self.volume_target;
    }

    /// Playback position in 32.32 base-cycle sample units.
    pub fn playback_pos(&self) -> i64 {
        self.resampler.get_playback_pos()
    }
}

//! Per-voice playback state: 32.32 phase, step and mip-level bookkeeping.

use crate::fixed;

/// Fractional bits of the pitch encoding (1/65536 octave per unit).
pub const NBR_BITS_PER_OCT: u32 = 16;

/// Length of the crossfade hiding mip-level, path and frame switches,
/// in output samples.
pub const FADE_LEN: usize = 64;

/// Playback state of one voice inside one mip level.
///
/// `pos` and `step` are 32.32 fixed point *in the current level's sample
/// space*: moving the voice to another level shifts them by the level
/// difference. When the oversampled path is active the interpolator advances
/// the position twice per output sample, so `step` holds half the per-output
/// increment.
///
/// A non-zero `cycle_len` puts the voice in single-cycle mode: tap indices
/// wrap within the power-of-two cycle through `cycle_mask` and the level's
/// guard pads are never read.
#[derive(Clone, Copy, Debug)]
pub struct VoiceState {
    /// 32.32 position within the current mip level.
    pub pos: u64,
    /// 32.32 per-interpolation-step increment at the current mip level.
    pub step: u64,
    /// Current mip-level index.
    pub table: usize,
    /// Payload length of that level.
    pub table_len: usize,
    /// Wavetable frame this voice reads (0 for single-frame sources).
    pub frame: usize,
    /// True when the 2x interpolator + downsampler path is in use
    /// (pitch >= 0); false selects the normal-rate path.
    pub ovrspl_flag: bool,
    /// Cycle length at the current mip level; 0 disables masking.
    pub cycle_len: u32,
    /// `cycle_len - 1` when masking is active.
    pub cycle_mask: u32,
}

impl Default for VoiceState {
    fn default() -> Self {
        Self {
            pos: 0,
            step: 1 << 31,
            table: 0,
            table_len: 0,
            frame: 0,
            ovrspl_flag: true,
            cycle_len: 0,
            cycle_mask: 0,
        }
    }
}

impl VoiceState {
    /// Advance the phase by one interpolation step (wraps modulo 2^64).
    #[inline(always)]
    pub fn advance(&mut self) {
        self.pos = self.pos.wrapping_add(self.step);
    }

    /// Recompute `step` for the given pitch at the voice's current mip level
    /// and rate path.
    ///
    /// The fractional octave scales an exact power of two: the mantissa
    /// `exp2(frac / 65536) * 2^31` always sits in `[2^31, 2^32)`, and the
    /// octave part plus level/path corrections reduce to one bidirectional
    /// shift. Negative pitches shift right, which is why downward pitch
    /// costs no extra table.
    pub fn compute_step(&mut self, pitch: i64) {
        let mut shift = if pitch < 0 {
            (-1 - ((!pitch) >> NBR_BITS_PER_OCT)) as i32
        } else {
            (pitch >> NBR_BITS_PER_OCT) as i32 - self.table as i32
        };
        if !self.ovrspl_flag {
            // normal path produces one sample per step instead of two
            shift += 1;
        }

        let frac = (pitch & ((1 << NBR_BITS_PER_OCT) - 1)) as f64;
        let mantissa = libm::floor(
            libm::exp(frac * (core::f64::consts::LN_2 / 65536.0)) * 2_147_483_648.0,
        ) as u64;
        debug_assert!(mantissa >= 1 << 31);
        self.step = fixed::shift_bidi(mantissa, shift);
    }
}

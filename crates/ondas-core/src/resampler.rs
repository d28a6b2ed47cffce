//! Block resampler: mip-level selection, path switching and crossfades.
//!
//! One [`Resampler`] renders one voice. It owns two [`VoiceState`]s:
//! CURRENT plays steadily; when a pitch, frame or rate-path change moves the
//! voice to a different mip level, CURRENT is copied into FADEOUT and the
//! two are mixed with complementary linear ramps for [`FADE_LEN`] samples,
//! which hides the spectral step between levels.
//!
//! Steady rendering picks one of two paths per block:
//!
//! - pitch >= 0: the 24-tap interpolator writes a 2x stream into the
//!   intermediate buffer and the half-band downsampler folds it to output
//!   rate,
//! - pitch < 0: the 12-tap interpolator writes at output rate and
//!   [`Downsampler2::phase_block`] applies the matching group delay so both
//!   paths stay time-aligned.
//!
//! The render path never allocates: the intermediate buffer is sized at
//! construction and mip data is shared through [`Arc`]s installed by
//! [`Resampler::set_sample`] / [`Resampler::set_interp`] outside the audio
//! thread.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::downsampler::Downsampler2;
use crate::fixed;
use crate::interp::{InterpPack, TableView};
use crate::mipmap::MipSource;
use crate::voice::{VoiceState, FADE_LEN, NBR_BITS_PER_OCT};

/// Output samples rendered per inner work chunk; the intermediate 2x buffer
/// holds twice this.
pub const BUF_LEN: usize = 128;

/// Pitch-shifting block renderer over a shared mip source.
pub struct Resampler<S: MipSource> {
    buf: Vec<f32>,
    mip: Option<Arc<S>>,
    interp: Option<Arc<InterpPack>>,
    dwnspl: Downsampler2,
    cur: VoiceState,
    old: VoiceState,
    pitch: i64,
    cycle_len: u32,
    frame: usize,
    fade_pos: usize,
    fade_flag: bool,
    fade_needed_flag: bool,
}

impl<S: MipSource> Default for Resampler<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MipSource> Resampler<S> {
    /// A resampler with no sample or interpolator attached.
    pub fn new() -> Self {
        Self {
            buf: vec![0.0; BUF_LEN * 2],
            mip: None,
            interp: None,
            dwnspl: Downsampler2::default(),
            cur: VoiceState::default(),
            old: VoiceState::default(),
            pitch: 0,
            cycle_len: 0,
            frame: 0,
            fade_pos: 0,
            fade_flag: false,
            fade_needed_flag: false,
        }
    }

    /// Attach the interpolator pack. Must happen before the first
    /// [`Resampler::interpolate_block`].
    pub fn set_interp(&mut self, interp: Arc<InterpPack>) {
        self.interp = Some(interp);
    }

    /// Attach a ready mip source and rewind to base pitch, frame 0,
    /// position 0.
    ///
    /// The previous source (if any) is released; any crossfade in flight is
    /// dropped with it, since the FADEOUT voice would otherwise keep
    /// reading the replaced data.
    pub fn set_sample(&mut self, mip: Arc<S>) {
        assert!(mip.is_ready());
        self.pitch = 0;
        self.frame = 0;
        self.cur.pos = 0;
        self.fade_flag = false;
        self.fade_needed_flag = false;
        self.reset_pitch_cur_voice(&mip);
        self.mip = Some(mip);
    }

    /// Detach the mip source. Rendering requires a new
    /// [`Resampler::set_sample`] afterwards.
    pub fn remove_sample(&mut self) {
        self.mip = None;
    }

    /// Enable single-cycle looping over a power-of-two cycle length, or
    /// disable it with 0. Applies to the playing voice immediately when a
    /// sample is attached.
    ///
    /// # Panics
    /// Panics if `cycle_len` is neither 0 nor a power of two, or if a
    /// crossfade is in flight.
    pub fn set_cycle(&mut self, cycle_len: u32) {
        assert!(cycle_len == 0 || cycle_len.is_power_of_two());
        assert!(!self.fade_flag);
        self.cycle_len = cycle_len;
        if let Some(mip) = self.mip.clone() {
            self.reset_pitch_cur_voice(&mip);
        }
    }

    /// Set the pitch in 1/65536-octave units (`0x10000` = one octave up).
    ///
    /// Arms a crossfade when the new pitch lands on another mip level or
    /// switches the rate path; the fade begins at the next
    /// [`Resampler::interpolate_block`]. While a fade is in flight both
    /// voices are retuned so they stay in tune with each other.
    ///
    /// # Panics
    /// Panics without a sample attached, or when
    /// `pitch >= nbr_tables << 16`.
    pub fn set_pitch(&mut self, pitch: i64) {
        let mip = self.mip.as_ref().expect("set_pitch() without a sample");
        assert!(
            pitch < (mip.nbr_tables() as i64) << NBR_BITS_PER_OCT,
            "pitch {pitch:#x} beyond the mip hierarchy"
        );

        self.pitch = pitch;
        let new_table = compute_table(pitch);
        let new_ovrspl = pitch >= 0;
        self.fade_needed_flag = new_table != self.cur.table
            || new_ovrspl != self.cur.ovrspl_flag
            || self.frame != self.cur.frame;

        self.cur.compute_step(pitch);
        if self.fade_flag {
            self.old.compute_step(pitch);
        }
    }

    /// Current pitch.
    pub fn get_pitch(&self) -> i64 {
        self.pitch
    }

    /// Select a wavetable frame (masked modulo the source's frame count).
    /// A change arms the same crossfade as a mip-level switch.
    pub fn set_frame(&mut self, frame: u32) {
        let mip = self.mip.as_ref().expect("set_frame() without a sample");
        let frame = frame as usize & (mip.nbr_frames() - 1);
        if frame != self.frame {
            self.frame = frame;
            self.fade_needed_flag = true;
        }
    }

    /// Currently selected frame.
    pub fn get_frame(&self) -> u32 {
        self.frame as u32
    }

    /// Playback position in 32.32 level-0 sample units.
    pub fn get_playback_pos(&self) -> i64 {
        (self.cur.pos << self.cur.table) as i64
    }

    /// Move the playback position (32.32, level-0 units). The low `table`
    /// bits fall below the current level's resolution and are dropped.
    pub fn set_playback_pos(&mut self, pos: i64) {
        let mip = self.mip.as_ref().expect("set_playback_pos() without a sample");
        assert!(pos >= 0);
        assert!(((pos >> 32) as usize) < mip.sample_len());
        self.cur.pos = (pos as u64) >> self.cur.table;
        if self.fade_flag {
            self.old.pos = (pos as u64) >> self.old.table;
        }
    }

    /// True while a crossfade is rendering.
    pub fn is_fading(&self) -> bool {
        self.fade_flag
    }

    /// True when a parameter change has armed a crossfade that has not
    /// started yet.
    pub fn fade_pending(&self) -> bool {
        self.fade_needed_flag
    }

    /// Render `dst.len()` output samples.
    ///
    /// # Panics
    /// Panics on an empty block or when no sample / interpolator is
    /// attached.
    pub fn interpolate_block(&mut self, dst: &mut [f32]) {
        assert!(!dst.is_empty(), "zero-length block");
        let mip = self
            .mip
            .as_ref()
            .expect("interpolate_block() without set_sample()")
            .clone();
        let interp = self
            .interp
            .as_ref()
            .expect("interpolate_block() without set_interp()")
            .clone();

        if self.fade_needed_flag && !self.fade_flag {
            self.begin_fade(&mip);
        }

        let mut block_pos = 0;
        while block_pos < dst.len() {
            let mut work = dst.len() - block_pos;
            if self.fade_flag {
                work = work.min(BUF_LEN).min(FADE_LEN - self.fade_pos);
                self.fade_block(&mut dst[block_pos..block_pos + work], &*mip, &interp);
            } else if self.cur.ovrspl_flag {
                work = work.min(BUF_LEN);
                let (data, pad) = mip.table_with_pads(self.cur.table, self.cur.frame);
                interp.interp_ovrspl(
                    &mut self.buf[..work * 2],
                    &mut self.cur,
                    TableView { data, pad },
                );
                self.dwnspl.downsample_block(
                    &mut dst[block_pos..block_pos + work],
                    &self.buf[..work * 2],
                );
            } else {
                let (data, pad) = mip.table_with_pads(self.cur.table, self.cur.frame);
                interp.interp_norm(
                    &mut dst[block_pos..block_pos + work],
                    &mut self.cur,
                    TableView { data, pad },
                );
                self.dwnspl.phase_block(&mut dst[block_pos..block_pos + work]);
            }
            block_pos += work;
        }
    }

    /// Reset the downsampler state and rebuild the CURRENT voice; any armed
    /// or running fade is dropped.
    pub fn clear_buffers(&mut self) {
        self.dwnspl.clear_buffers();
        if let Some(mip) = self.mip.clone() {
            self.reset_pitch_cur_voice(&mip);
        }
        self.fade_needed_flag = false;
        self.fade_flag = false;
    }

    /// Rebuild CURRENT for the present pitch / frame / cycle settings.
    fn reset_pitch_cur_voice(&mut self, mip: &S) {
        let table = compute_table(self.pitch);
        self.cur.table = table;
        self.cur.table_len = mip.lev_len(table);
        self.cur.frame = self.frame;
        self.cur.ovrspl_flag = self.pitch >= 0;
        if self.cycle_len != 0 {
            let len = (self.cycle_len >> table).max(1);
            self.cur.cycle_len = len;
            self.cur.cycle_mask = len - 1;
        } else {
            self.cur.cycle_len = 0;
            self.cur.cycle_mask = 0;
        }
        self.cur.compute_step(self.pitch);
    }

    /// Snapshot CURRENT into FADEOUT, rebuild CURRENT for the new target
    /// and translate the position into the new level's sample space.
    fn begin_fade(&mut self, mip: &S) {
        self.old = self.cur;
        self.reset_pitch_cur_voice(mip);
        let table_dif = self.old.table as i32 - self.cur.table as i32;
        self.cur.pos = fixed::shift_bidi(self.old.pos, table_dif);
        self.fade_needed_flag = false;
        self.fade_flag = true;
        self.fade_pos = 0;
    }

    /// Render one crossfade chunk: both voices accumulate into the zeroed
    /// 2x buffer under complementary ramps, then one downsampling pass
    /// produces the output.
    fn fade_block(&mut self, dst: &mut [f32], mip: &S, interp: &InterpPack) {
        let nbr_spl_ovr = dst.len() * 2;
        let vol_step = 1.0 / (FADE_LEN as f32 * 2.0);
        let vol = self.fade_pos as f32 * (vol_step * 2.0);

        self.buf[..nbr_spl_ovr].fill(0.0);

        // a fade away from the normal path towards the normal path never
        // happens: it would mean pitch changed sign twice within one call
        debug_assert!(self.cur.ovrspl_flag || self.old.ovrspl_flag);

        let (cur_data, cur_pad) = mip.table_with_pads(self.cur.table, self.cur.frame);
        let (old_data, old_pad) = mip.table_with_pads(self.old.table, self.old.frame);
        let cur_view = TableView {
            data: cur_data,
            pad: cur_pad,
        };
        let old_view = TableView {
            data: old_data,
            pad: old_pad,
        };

        let buf = &mut self.buf[..nbr_spl_ovr];
        match (self.cur.ovrspl_flag, self.old.ovrspl_flag) {
            (true, true) => {
                interp.interp_ovrspl_ramp_add(buf, &mut self.cur, cur_view, vol, vol_step);
                interp.interp_ovrspl_ramp_add(buf, &mut self.old, old_view, 1.0 - vol, -vol_step);
            }
            (false, true) => {
                interp.interp_norm_ramp_add(buf, &mut self.cur, cur_view, vol, vol_step);
                interp.interp_ovrspl_ramp_add(buf, &mut self.old, old_view, 1.0 - vol, -vol_step);
            }
            _ => {
                interp.interp_ovrspl_ramp_add(buf, &mut self.cur, cur_view, vol, vol_step);
                interp.interp_norm_ramp_add(buf, &mut self.old, old_view, 1.0 - vol, -vol_step);
            }
        }

        self.dwnspl.downsample_block(dst, &self.buf[..nbr_spl_ovr]);

        self.fade_pos += dst.len();
        self.fade_flag = self.fade_pos < FADE_LEN;
    }
}

/// Mip level for a pitch: one level per full octave above base, level 0 for
/// anything below.
#[inline]
fn compute_table(pitch: i64) -> usize {
    if pitch >= 0 {
        (pitch >> NBR_BITS_PER_OCT) as usize
    } else {
        0
    }
}

//! Per-frame mip-maps for morphing wavetables.
//!
//! A morphing wavetable is a pack of up to 256 independent single-cycle
//! frames. Each frame gets its own cyclic [`MipMap`] so the oscillator can
//! jump between frames at any mip level and crossfade the switch like any
//! other voice transition.
//!
//! The packed source layout is `nbr_frames * stride` floats with
//! `stride = frame_len + frame_pad`; a non-zero `frame_pad` region
//! conventionally repeats the head of the same frame so that plain readers
//! can run FIR taps past the cycle end. The builder itself only consumes
//! `frame_len` samples per frame; the cyclic build regenerates the
//! continuation at every level anyway.

use alloc::vec::Vec;

use crate::mipmap::{BuildMode, MipMap, MipSource};

/// An array of independent per-frame mip-maps sharing one geometry.
#[derive(Clone, Debug)]
pub struct MipMapSet {
    frames: Vec<MipMap>,
    frame_len: usize,
}

impl MipMapSet {
    /// Build every frame's mip-map from a packed wavetable.
    ///
    /// * `wavetable` - `nbr_frames * (frame_len + frame_pad)` floats
    /// * `frame_len` - cycle length, must be a power of two
    /// * `nbr_frames` - number of frames, a power of two >= 1
    /// * `add_len_pre` / `add_len_post` - reader guard requirement,
    ///   typically [`crate::InterpPack::len_pre`] / `len_post`
    /// * `nbr_tables` - mip levels per frame
    /// * `fir` - decimation impulse (odd, symmetric)
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        wavetable: &[f32],
        frame_len: usize,
        frame_pad: usize,
        nbr_frames: usize,
        add_len_pre: usize,
        add_len_post: usize,
        nbr_tables: usize,
        fir: &[f64],
    ) -> Self {
        assert!(frame_len.is_power_of_two());
        assert!(nbr_frames >= 1 && nbr_frames.is_power_of_two());
        let stride = frame_len + frame_pad;
        assert_eq!(wavetable.len(), nbr_frames * stride);

        let mut frames = Vec::with_capacity(nbr_frames);
        for frame in 0..nbr_frames {
            let src = &wavetable[frame * stride..frame * stride + frame_len];
            let mut mip = MipMap::new();
            mip.init_sample(
                frame_len,
                add_len_pre,
                add_len_post,
                nbr_tables,
                fir,
                BuildMode::Cyclic,
            );
            mip.fill_sample(src);
            debug_assert!(mip.is_ready());
            frames.push(mip);
        }
        Self { frames, frame_len }
    }

    /// Cycle length shared by all frames.
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Number of frames.
    pub fn nbr_frames(&self) -> usize {
        self.frames.len()
    }

    /// Payload view of one frame's level.
    pub fn use_table(&self, table: usize, frame: usize) -> &[f32] {
        self.frames[frame].use_table(table)
    }
}

impl MipSource for MipMapSet {
    fn is_ready(&self) -> bool {
        self.frames.iter().all(MipMap::is_ready)
    }
    fn nbr_tables(&self) -> usize {
        self.frames[0].nbr_tables()
    }
    fn sample_len(&self) -> usize {
        self.frame_len
    }
    fn lev_len(&self, table: usize) -> usize {
        self.frames[0].lev_len(table)
    }
    fn table_with_pads(&self, table: usize, frame: usize) -> (&[f32], usize) {
        self.frames[frame].table_with_pads(table)
    }
    fn nbr_frames(&self) -> usize {
        self.frames.len()
    }
}

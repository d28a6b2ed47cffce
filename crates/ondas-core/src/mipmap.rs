//! Dyadic mip-map of progressively low-passed copies of a source sample.
//!
//! Level 0 holds the sample as supplied; level k holds a half-rate copy of
//! level k-1, decimated through a symmetric FIR whose cutoff sits at a
//! quarter of the pre-decimation Nyquist. Every level is band-limited to
//! half its own Nyquist, so a voice transposed anywhere inside one octave of
//! a level never unfolds energy above the output half-band.
//!
//! Each level buffer carries guard pads on both sides, at least as long as
//! the larger of the caller's requirement and the decimation filter support,
//! so FIR taps can read past the payload without bounds checks.
//!
//! Two build modes:
//!
//! - [`BuildMode::ZeroPad`]: pads stay zero. The right choice for one-shot
//!   sample playback, where positions never wrap.
//! - [`BuildMode::Cyclic`]: pads are refreshed with the periodic
//!   continuation of the payload after each level is built, and the
//!   decimation reads wrap through them. Single-cycle wavetables need this:
//!   the filter has to see the cycle as periodic or every level carries
//!   edge transients that read as aliasing at high transpositions.

use alloc::vec;
use alloc::vec::Vec;

/// Pad treatment during the mip-map build.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BuildMode {
    /// Zero-filled pads; levels built with an extra margin so the next
    /// level's filter support stays inside valid data.
    ZeroPad,
    /// Pads hold the periodic continuation of the payload at every level.
    Cyclic,
}

/// Read access shared by [`MipMap`] and [`crate::MipMapSet`]: everything the
/// resampler needs to walk a level. Static dispatch only.
pub trait MipSource {
    /// True once every level is populated.
    fn is_ready(&self) -> bool;
    /// Number of mip levels.
    fn nbr_tables(&self) -> usize;
    /// Level-0 payload length.
    fn sample_len(&self) -> usize;
    /// Payload length of `table`: exactly `ceil(sample_len / 2^table)`.
    fn lev_len(&self, table: usize) -> usize;
    /// Full level buffer plus the index of its first payload sample.
    fn table_with_pads(&self, table: usize, frame: usize) -> (&[f32], usize);
    /// Number of independent frames (1 unless backed by a set).
    fn nbr_frames(&self) -> usize {
        1
    }
}

/// Mip-map builder and storage for a single sample.
///
/// Filling is incremental: [`MipMap::init_sample`] sizes the buffers, then
/// [`MipMap::fill_sample`] accepts chunks until the payload is complete, at
/// which point all levels are built and the filter impulse is released.
#[derive(Clone, Debug, Default)]
pub struct MipMap {
    tables: Vec<Vec<f32>>,
    /// Decimation FIR, centre to edge; emptied once the build is done.
    filter: Vec<f32>,
    len: usize,
    pre: usize,
    post: usize,
    filled: usize,
    nbr_tables: usize,
    mode: BuildMode,
    init_flag: bool,
}

impl Default for BuildMode {
    fn default() -> Self {
        BuildMode::ZeroPad
    }
}

impl MipMap {
    /// Empty, uninitialised mip-map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the level buffers and store the decimation filter.
    ///
    /// * `len` - full sample length, > 0
    /// * `add_len_pre` / `add_len_post` - extra guard samples the reader
    ///   needs around each level; the effective pad is the max of these and
    ///   the filter support
    /// * `nbr_tables` - number of mip levels, >= 1
    /// * `fir` - symmetric decimation impulse, odd length
    ///
    /// Returns true while more data is needed (always, for `len > 0`).
    pub fn init_sample(
        &mut self,
        len: usize,
        add_len_pre: usize,
        add_len_post: usize,
        nbr_tables: usize,
        fir: &[f64],
        mode: BuildMode,
    ) -> bool {
        assert!(len > 0);
        assert!(nbr_tables > 0);
        assert!(!fir.is_empty());
        assert!(fir.len() % 2 == 1, "decimation FIR length must be odd");

        let half_fir_len = (fir.len() - 1) / 2;
        self.filter = fir[half_fir_len..].iter().map(|&c| c as f32).collect();
        let filter_sup = half_fir_len * 2;

        self.len = len;
        self.pre = add_len_pre.max(filter_sup);
        self.post = add_len_post.max(filter_sup);
        self.filled = 0;
        self.nbr_tables = nbr_tables;
        self.mode = mode;
        self.init_flag = true;

        self.tables = (0..nbr_tables)
            .map(|table| {
                let lev_len = ceil_len(len, table);
                vec![0.0f32; self.pre + lev_len + self.post]
            })
            .collect();

        self.filled < self.len
    }

    /// Supply the next chunk of level-0 data. Returns true while more data
    /// is needed; the final chunk triggers the level build and returns
    /// false.
    pub fn fill_sample(&mut self, data: &[f32]) -> bool {
        assert!(self.init_flag);
        assert!(!data.is_empty());
        assert!(data.len() <= self.len - self.filled);

        let offset = self.pre + self.filled;
        self.tables[0][offset..offset + data.len()].copy_from_slice(data);
        self.filled += data.len();

        if self.filled == self.len {
            self.build_mip_map();
        }
        self.filled < self.len
    }

    /// Drop all sample data and return to the uninitialised state.
    pub fn clear_sample(&mut self) {
        *self = Self::default();
    }

    /// True once the sample is complete and every level is built.
    pub fn is_ready(&self) -> bool {
        self.init_flag && self.filled == self.len
    }

    /// Full sample length.
    pub fn sample_len(&self) -> usize {
        assert!(self.is_ready());
        self.len
    }

    /// Number of mip levels.
    pub fn nbr_tables(&self) -> usize {
        assert!(self.is_ready());
        self.nbr_tables
    }

    /// Payload length of a level: `ceil(len / 2^table)`.
    pub fn lev_len(&self, table: usize) -> usize {
        assert!(self.init_flag);
        assert!(table < self.nbr_tables);
        ceil_len(self.len, table)
    }

    /// Payload view of a level, starting at its first real sample.
    pub fn use_table(&self, table: usize) -> &[f32] {
        assert!(self.is_ready());
        let lev_len = self.lev_len(table);
        &self.tables[table][self.pre..self.pre + lev_len]
    }

    /// Full level buffer including pads, plus the payload offset.
    pub fn table_with_pads(&self, table: usize) -> (&[f32], usize) {
        assert!(self.is_ready());
        (&self.tables[table], self.pre)
    }

    fn build_mip_map(&mut self) {
        if self.mode == BuildMode::Cyclic {
            self.refresh_pads(0);
        }
        for level in 1..self.nbr_tables {
            self.build_level(level);
            if self.mode == BuildMode::Cyclic {
                self.refresh_pads(level);
            }
        }
        // the impulse is only needed during the build
        self.filter = Vec::new();
    }

    /// Build level `level` from level `level - 1` by filtering at stride 2.
    ///
    /// In zero-pad mode the output range is widened by a quarter of the
    /// filter support on both sides so that the *next* level's filter reads
    /// valid data inside the pads.
    fn build_level(&mut self, level: usize) {
        debug_assert!(level > 0 && level < self.nbr_tables);
        let lev_len = self.lev_len(level);
        let pre = self.pre;
        let margin = match self.mode {
            BuildMode::ZeroPad => (self.filter.len() / 2) as isize,
            BuildMode::Cyclic => 0,
        };

        let (head, tail) = self.tables.split_at_mut(level);
        let ref_spl: &[f32] = &head[level - 1];
        let new_spl: &mut [f32] = &mut tail[0];

        for pos in -margin..lev_len as isize + margin {
            let pos_ref = (pre as isize + pos * 2) as usize;
            let val = filter_sample(&self.filter, ref_spl, pos_ref);
            new_spl[(pre as isize + pos) as usize] = val;
        }
    }

    /// Rewrite a level's pads with the periodic continuation of its payload.
    fn refresh_pads(&mut self, level: usize) {
        let n = self.lev_len(level) as isize;
        let (pre, post) = (self.pre, self.post);
        let buf = &mut self.tables[level];
        for i in 0..pre {
            let src = (i as isize - pre as isize).rem_euclid(n) as usize;
            buf[i] = buf[pre + src];
        }
        for i in 0..post {
            let src = (i as isize).rem_euclid(n) as usize;
            buf[pre + n as usize + i] = buf[pre + src];
        }
    }
}

impl MipSource for MipMap {
    fn is_ready(&self) -> bool {
        MipMap::is_ready(self)
    }
    fn nbr_tables(&self) -> usize {
        MipMap::nbr_tables(self)
    }
    fn sample_len(&self) -> usize {
        MipMap::sample_len(self)
    }
    fn lev_len(&self, table: usize) -> usize {
        MipMap::lev_len(self, table)
    }
    fn table_with_pads(&self, table: usize, frame: usize) -> (&[f32], usize) {
        debug_assert_eq!(frame, 0);
        MipMap::table_with_pads(self, table)
    }
}

#[inline]
fn ceil_len(len: usize, table: usize) -> usize {
    let scale = 1usize << table;
    (len + scale - 1) >> table
}

/// Apply the symmetric half-impulse around `pos`.
#[inline]
fn filter_sample(filter: &[f32], table: &[f32], pos: usize) -> f32 {
    let half_len = filter.len() - 1;
    let mut sum = table[pos] * filter[0];
    for fir_pos in 1..=half_len {
        sum += (table[pos - fir_pos] + table[pos + fir_pos]) * filter[fir_pos];
    }
    sum
}

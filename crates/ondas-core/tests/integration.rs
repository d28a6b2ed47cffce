//! End-to-end scenarios for the resampling engine.
//!
//! Each scenario renders through the full chain (mip-map -> interpolator ->
//! downsampler -> resampler) and measures the output spectrally. Tolerances
//! carry at least 4x margin over the behaviour measured during filter
//! design.

use std::sync::Arc;

use ondas_analysis::{bin_amplitudes, goertzel, rms, Fft, Window};
use ondas_core::{
    tables, BuildMode, InterpPack, MipMap, MipMapSet, MipSource, Resampler, FADE_LEN,
};

const CYCLE: usize = 2048;
const N_LEVELS: usize = 12;
const OCT: i64 = 1 << 16;

fn sine_cycle(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (2.0 * std::f64::consts::PI * i as f64 / len as f64).sin() as f32)
        .collect()
}

fn saw_cycle(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.8 * (2.0 * i as f32 / (len - 1) as f32 - 1.0))
        .collect()
}

fn cyclic_mip(wave: &[f32]) -> Arc<MipMap> {
    let mut mip = MipMap::new();
    mip.init_sample(
        wave.len(),
        InterpPack::len_pre(),
        InterpPack::len_post(),
        N_LEVELS,
        &tables::MIP_FIR,
        BuildMode::Cyclic,
    );
    mip.fill_sample(wave);
    Arc::new(mip)
}

fn cycle_resampler(wave: &[f32]) -> Resampler<MipMap> {
    let mut rs = Resampler::new();
    rs.set_interp(Arc::new(InterpPack::new()));
    rs.set_cycle(wave.len() as u32);
    rs.set_sample(cyclic_mip(wave));
    rs.clear_buffers();
    rs
}

fn render(rs: &mut Resampler<impl MipSource>, n: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; n];
    rs.interpolate_block(&mut out);
    out
}

/// A 2048-point unit sine at base pitch comes back as the same sine.
///
/// The half-band stage is IIR, so the output carries a fixed group delay;
/// the comparison fits amplitude and phase from the fundamental bin and
/// checks the sample-wise residual against that fitted sine.
#[test]
fn unity_pitch_reproduces_the_sine() {
    let mut rs = cycle_resampler(&sine_cycle(CYCLE));
    render(&mut rs, CYCLE); // settle the IIR
    let out = render(&mut rs, CYCLE);

    let fft = Fft::new(CYCLE);
    let spectrum = fft.forward(&out, Window::Rectangular);
    let amp = 2.0 * spectrum[1].norm() / CYCLE as f32;
    let phase = spectrum[1].arg();
    assert!((amp - 1.0).abs() < 1e-3, "fundamental amplitude {amp}");

    let mut worst = 0.0f32;
    for (i, &v) in out.iter().enumerate() {
        let fitted = amp * (2.0 * std::f32::consts::PI * i as f32 / CYCLE as f32 + phase).cos();
        worst = worst.max((v - fitted).abs());
    }
    assert!(worst < 1e-4, "residual vs fitted sine: {worst}");

    let amps = bin_amplitudes(&spectrum, CYCLE);
    for (k, &a) in amps.iter().enumerate().skip(2) {
        assert!(a < 1e-4, "spurious content in bin {k}: {a}");
    }
}

/// One octave up yields exactly two cycles, same RMS, nothing else.
#[test]
fn one_octave_up_doubles_the_frequency() {
    let input = sine_cycle(CYCLE);
    let mut rs = cycle_resampler(&input);
    rs.set_pitch(OCT);
    render(&mut rs, 512); // crossfade + settle
    let out = render(&mut rs, CYCLE);

    let fft = Fft::new(CYCLE);
    let amps = bin_amplitudes(&fft.forward(&out, Window::Rectangular), CYCLE);
    let peak = amps
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(k, _)| k)
        .unwrap();
    assert_eq!(peak, 2, "peak must sit at bin 2");

    let ratio = rms(&out) / rms(&input);
    assert!((ratio - 1.0).abs() < 0.01, "rms ratio {ratio}");

    for (k, &a) in amps.iter().enumerate() {
        if k != 2 {
            assert!(a < 1e-4, "content above the cutoff at bin {k}: {a}");
        }
    }
}

/// A sawtooth transposed 7 octaves up must keep everything above
/// Nyquist/2 at least 60 dB under the fundamental.
#[test]
fn seven_octaves_up_stays_alias_free() {
    let mut rs = cycle_resampler(&saw_cycle(CYCLE));
    rs.set_pitch(7 * OCT);
    render(&mut rs, 512);
    let out = render(&mut rs, 4096);

    let fft = Fft::new(4096);
    let amps = bin_amplitudes(&fft.forward(&out, Window::Rectangular), 4096);
    let fundamental = amps[256]; // 2048-sample cycle at +7 oct: 16-sample period
    let worst = amps[1025..]
        .iter()
        .fold(0.0f32, |acc, &a| acc.max(a));
    let margin_db = 20.0 * (fundamental / worst.max(1e-12)).log10();
    assert!(
        margin_db > 60.0,
        "alias margin {margin_db:.1} dB (fundamental {fundamental}, worst {worst})"
    );
}

/// Detuned variant: at +7.05 octaves aliases land off the harmonic grid where
/// they cannot hide under real partials.
#[test]
fn detuned_seven_octaves_keeps_aliases_off_grid() {
    let mut rs = cycle_resampler(&saw_cycle(CYCLE));
    rs.set_pitch(7 * OCT + 0x0CCC);
    render(&mut rs, 512);
    let out = render(&mut rs, 4096);

    let fft = Fft::new(4096);
    let amps = bin_amplitudes(&fft.forward(&out, Window::Hann), 4096);
    let peak = amps[1..].iter().fold(0.0f32, |acc, &a| acc.max(a));
    let worst_hi = amps[1100..].iter().fold(0.0f32, |acc, &a| acc.max(a));
    let margin_db = 20.0 * (peak / worst_hi.max(1e-12)).log10();
    assert!(margin_db > 60.0, "detuned alias margin {margin_db:.1} dB");
}

/// A pitch jump across a mip boundary stays continuous through the
/// crossfade.
#[test]
fn fade_across_mip_boundary_is_continuous() {
    let mut rs = cycle_resampler(&sine_cycle(CYCLE));
    rs.set_pitch(OCT / 2);
    let mut seq = render(&mut rs, 64);
    rs.set_pitch(3 * OCT / 2);
    seq.extend(render(&mut rs, 128));

    let worst = seq
        .windows(2)
        .fold(0.0f32, |acc, w| acc.max((w[1] - w[0]).abs()));
    assert!(worst < 0.5, "discontinuity {worst} across the fade");
}

/// The same continuity holds when the rate path flips sign.
#[test]
fn fade_across_the_path_switch_is_continuous() {
    let mut rs = cycle_resampler(&sine_cycle(CYCLE));
    rs.set_pitch(-OCT / 2);
    let mut seq = render(&mut rs, 100);
    rs.set_pitch(OCT / 4);
    seq.extend(render(&mut rs, 200));

    let worst = seq
        .windows(2)
        .fold(0.0f32, |acc, w| acc.max((w[1] - w[0]).abs()));
    assert!(worst < 0.1, "discontinuity {worst} across the path switch");
}

/// Masked single-cycle playback at base pitch is bit-exact periodic
/// once the filter state has converged.
#[test]
fn cycle_wrap_is_bit_exact_periodic() {
    let mut rs = cycle_resampler(&sine_cycle(CYCLE));
    let out = render(&mut rs, 10 * CYCLE);
    let p8 = &out[8 * CYCLE..9 * CYCLE];
    let p9 = &out[9 * CYCLE..10 * CYCLE];
    assert_eq!(p8, p9, "periods 8 and 9 must be identical");
}

/// An all-zero wavetable renders exact zeros at any pitch.
#[test]
fn silence_is_preserved_exactly() {
    let zeros = vec![0.0f32; CYCLE];
    let mut rs = cycle_resampler(&zeros);
    for pitch in [0, 3 * OCT + 0x1234, -OCT, 9 * OCT] {
        rs.set_pitch(pitch);
        let out = render(&mut rs, 512);
        assert!(out.iter().all(|&v| v == 0.0), "non-zero at pitch {pitch:#x}");
    }
}

/// A DC wavetable comes through at its own level.
#[test]
fn dc_is_preserved_at_base_pitch() {
    let dc = vec![0.25f32; CYCLE];
    let mut rs = cycle_resampler(&dc);
    render(&mut rs, 4096);
    let out = render(&mut rs, 256);
    let err = (out[255] - 0.25).abs();
    assert!(err < 1e-5, "DC error {err:e}");
}

#[test]
fn dc_survives_the_normal_rate_path() {
    let dc = vec![0.25f32; CYCLE];
    let mut rs = cycle_resampler(&dc);
    rs.set_pitch(-OCT);
    render(&mut rs, 4096);
    let out = render(&mut rs, 256);
    let err = (out[255] - 0.25).abs();
    assert!(err < 1e-5, "DC error {err:e} on the normal path");
}

/// Complementary fade ramps must sum to one, so a DC
/// input sails through a mip transition without a dip.
#[test]
fn fade_ramps_are_complementary() {
    let dc = vec![0.25f32; CYCLE];
    let mut rs = cycle_resampler(&dc);
    render(&mut rs, 4096);
    rs.set_pitch(2 * OCT);
    let out = render(&mut rs, 80);
    let worst = out
        .iter()
        .fold(0.0f32, |acc, &v| acc.max((v - 0.25).abs()));
    assert!(worst < 1e-4, "fade ramp mismatch {worst:e}");
}

/// The playback position advances by exactly
/// `n * step << table` per sample (twice that on the oversampled path).
#[test]
fn playback_position_is_monotonic_and_exact() {
    for (pitch, mult) in [(9 * OCT / 4, 2u64), (-3 * OCT / 2, 1u64)] {
        let mut rs = cycle_resampler(&sine_cycle(CYCLE));
        rs.set_pitch(pitch);
        render(&mut rs, FADE_LEN + 8); // complete any fade

        let table = if pitch >= 0 { (pitch >> 16) as usize } else { 0 };
        let mut probe = ondas_core::VoiceState {
            table,
            ovrspl_flag: pitch >= 0,
            ..Default::default()
        };
        probe.compute_step(pitch);

        let p0 = rs.get_playback_pos() as u64;
        let n = 100u64;
        render(&mut rs, n as usize);
        let p1 = rs.get_playback_pos() as u64;
        let expected = p0.wrapping_add(n * mult * (probe.step << table));
        assert_eq!(p1, expected, "position law broken at pitch {pitch:#x}");
    }
}

/// Frame morphing: the transition completes in exactly FADE_LEN samples and
/// the output is the ramped mix of the two frames.
#[test]
fn frame_morph_is_a_linear_crossfade() {
    let frame_len = CYCLE;
    let mut packed = saw_cycle(frame_len);
    packed.extend(sine_cycle(frame_len));
    let set = Arc::new(MipMapSet::build(
        &packed,
        frame_len,
        0,
        2,
        InterpPack::len_pre(),
        InterpPack::len_post(),
        N_LEVELS,
        &tables::MIP_FIR,
    ));

    let make = |frame: u32| {
        let mut rs: Resampler<MipMapSet> = Resampler::new();
        rs.set_interp(Arc::new(InterpPack::new()));
        rs.set_cycle(frame_len as u32);
        rs.set_sample(Arc::clone(&set));
        rs.clear_buffers();
        if frame != 0 {
            rs.set_frame(frame);
        }
        rs
    };

    let mut morph = make(0);
    let mut ref_a = make(0);
    let mut ref_b = make(1);

    render(&mut morph, 512);
    render(&mut ref_a, 512);
    render(&mut ref_b, 512); // includes its own initial frame fade
    let pos = morph.get_playback_pos();
    ref_a.set_playback_pos(pos);
    ref_b.set_playback_pos(pos);

    morph.set_frame(1);
    let fade = render(&mut morph, FADE_LEN);
    assert!(!morph.is_fading(), "fade must finish within FADE_LEN");
    let a = render(&mut ref_a, FADE_LEN);
    let b = render(&mut ref_b, FADE_LEN);

    // sample-wise reconstruction from the references; alpha covers the two
    // 2x sub-steps of each output sample
    let mut worst = 0.0f32;
    for i in 0..FADE_LEN {
        let alpha = (4 * i + 1) as f32 / 256.0;
        let rec = (1.0 - alpha) * a[i] + alpha * b[i];
        worst = worst.max((fade[i] - rec).abs());
    }
    assert!(worst < 0.1, "fade reconstruction error {worst}");

    // the blend coefficient must rise monotonically chunk over chunk
    let mut last_alpha = -1.0f32;
    for chunk in 0..4 {
        let r = chunk * 16..chunk * 16 + 16;
        let mut num = 0.0f32;
        let mut den = 0.0f32;
        for i in r {
            let d = b[i] - a[i];
            num += (fade[i] - a[i]) * d;
            den += d * d;
        }
        let alpha = num / den;
        assert!(
            alpha > last_alpha,
            "blend not increasing: chunk {chunk} alpha {alpha}"
        );
        last_alpha = alpha;
    }

    // after the fade the morph engine tracks the pure frame-1 reference
    let post = render(&mut morph, FADE_LEN);
    let b2 = render(&mut ref_b, FADE_LEN);
    let worst_post = post
        .iter()
        .zip(&b2)
        .fold(0.0f32, |acc, (&x, &y)| acc.max((x - y).abs()));
    assert!(worst_post < 0.05, "post-fade divergence {worst_post}");
}

/// During a saw -> sine morph the upper saw harmonics
/// decay monotonically.
#[test]
fn frame_morph_sheds_saw_harmonics_monotonically() {
    let frame_len = CYCLE;
    let mut packed = saw_cycle(frame_len);
    packed.extend(sine_cycle(frame_len));
    let set = Arc::new(MipMapSet::build(
        &packed,
        frame_len,
        0,
        2,
        InterpPack::len_pre(),
        InterpPack::len_post(),
        N_LEVELS,
        &tables::MIP_FIR,
    ));

    let mut rs: Resampler<MipMapSet> = Resampler::new();
    rs.set_interp(Arc::new(InterpPack::new()));
    rs.set_cycle(frame_len as u32);
    rs.set_sample(Arc::clone(&set));
    rs.clear_buffers();
    // +6 octaves: one cycle spans exactly 32 output samples, so a 32-sample
    // rectangular window measures harmonics leakage-free
    rs.set_pitch(6 * OCT);
    render(&mut rs, 512);

    let pre = render(&mut rs, FADE_LEN);
    rs.set_frame(1);
    let fade = render(&mut rs, FADE_LEN);
    let post = render(&mut rs, FADE_LEN);

    let f0 = 1.0 / 32.0;
    let band_energy = |x: &[f32], lo: usize, hi: usize| -> f64 {
        (lo..=hi)
            .map(|h| f64::from(goertzel(x, f0 * h as f64)).powi(2))
            .sum()
    };

    // the whole upper-harmonic band decays through the fade; the amplitude
    // ramp smears individual partials by about one bin inside 32-sample
    // windows, so the band aggregate is the stable observable
    let before = band_energy(&pre[32..], 2, 8);
    let mid = band_energy(&fade[16..48], 2, 8);
    let after = band_energy(&post[32..], 2, 8);
    assert!(
        before > 2.0 * mid,
        "band energy not falling into the fade: {before:.5} -> {mid:.5}"
    );
    assert!(
        mid > 100.0 * after,
        "band energy not gone after the fade: {mid:.5} -> {after:.5}"
    );

    // harmonics above the 5th vanish entirely with the saw frame
    let hi_before = band_energy(&pre[32..], 6, 8);
    let hi_after = band_energy(&post[32..], 6, 8);
    assert!(
        hi_before > 100.0 * hi_after,
        "upper saw harmonics survived the morph: {hi_before:.6} -> {hi_after:.6}"
    );
}

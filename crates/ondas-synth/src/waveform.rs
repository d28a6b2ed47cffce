//! Single-cycle waveform generators.
//!
//! Deterministic test and demo material; the oscillator itself accepts any
//! float buffer of the right length.

/// One cycle of a unit sine.
pub fn sine_cycle(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| libm::sin(2.0 * std::f64::consts::PI * i as f64 / len as f64) as f32)
        .collect()
}

/// One rising sawtooth cycle from `-headroom` to `+headroom`.
///
/// A little headroom below full scale keeps the band-limited overshoot of
/// the interpolation chain out of clipping range.
pub fn saw_cycle(len: usize, headroom: f32) -> Vec<f32> {
    let step = 2.0 / (len - 1) as f64;
    (0..len)
        .map(|i| (f64::from(headroom) * (-1.0 + step * i as f64)) as f32)
        .collect()
}

/// Pack frames into the `nbr_frames * (frame_len + frame_pad)` layout the
/// mip-map set builder consumes; each pad region repeats the head of its
/// own frame.
pub fn pack_frames(frames: &[Vec<f32>], frame_pad: usize) -> Vec<f32> {
    let frame_len = frames[0].len();
    let mut packed = Vec::with_capacity(frames.len() * (frame_len + frame_pad));
    for frame in frames {
        assert_eq!(frame.len(), frame_len, "all frames must share one length");
        packed.extend_from_slice(frame);
        packed.extend_from_slice(&frame[..frame_pad]);
    }
    packed
}

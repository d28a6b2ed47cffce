//! Level and single-bin measurements.

/// Root-mean-square level of a signal.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum: f64 = signal.iter().map(|&v| f64::from(v) * f64::from(v)).sum();
    (sum / signal.len() as f64).sqrt() as f32
}

/// Amplitude in dB (1.0 -> 0 dB), floored at -300 dB.
pub fn amplitude_db(amplitude: f32) -> f32 {
    20.0 * f64::from(amplitude).max(1e-15).log10() as f32
}

/// Convert a slice of linear amplitudes to dB.
pub fn magnitude_db(amplitudes: &[f32]) -> Vec<f32> {
    amplitudes.iter().map(|&a| amplitude_db(a)).collect()
}

/// Amplitude of one frequency via Goertzel's algorithm.
///
/// `freq` is in cycles per sample (not Hz). O(N) for a single bin, which
/// beats a full FFT when a test only cares about a handful of harmonics.
/// Accumulates in f64: the recurrence is numerically touchy in f32 for
/// long windows.
pub fn goertzel(signal: &[f32], freq: f64) -> f32 {
    let w = 2.0 * std::f64::consts::PI * freq;
    let coeff = 2.0 * w.cos();
    let mut s0 = 0.0f64;
    let mut s1 = 0.0f64;
    for &x in signal {
        let s2 = s1;
        s1 = s0;
        s0 = f64::from(x) + coeff * s1 - s2;
    }
    let re = s0 - s1 * w.cos();
    let im = s1 * w.sin();
    ((re * re + im * im).sqrt() * 2.0 / signal.len() as f64) as f32
}

//! FFT wrapper with windowing functions.

use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    Hann,
    /// Blackman-Harris window (better sidelobe suppression)
    BlackmanHarris,
}

impl Window {
    /// Apply the window to a buffer in place.
    pub fn apply(&self, buffer: &mut [f32]) {
        let n = buffer.len();
        match self {
            Window::Rectangular => {}
            Window::Hann => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos());
                    *sample *= w;
                }
            }
            Window::BlackmanHarris => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let x = 2.0 * PI * i as f32 / n as f32;
                    let w = 0.35875 - 0.48829 * x.cos() + 0.14128 * (2.0 * x).cos()
                        - 0.01168 * (3.0 * x).cos();
                    *sample *= w;
                }
            }
        }
    }
}

/// FFT processor with cached plans.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    ifft: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
}

impl Fft {
    /// Create an FFT processor for the given size.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);
        Self { fft, ifft, size }
    }

    /// Get the FFT size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward FFT of real input, optionally windowed.
    ///
    /// Returns the positive-frequency half of the spectrum
    /// (`size / 2 + 1` bins, DC to Nyquist).
    pub fn forward(&self, input: &[f32], window: Window) -> Vec<Complex<f32>> {
        let mut windowed: Vec<f32> = input.to_vec();
        windowed.resize(self.size, 0.0);
        window.apply(&mut windowed);

        let mut buffer: Vec<Complex<f32>> =
            windowed.iter().map(|&x| Complex::new(x, 0.0)).collect();
        self.fft.process(&mut buffer);
        buffer.truncate(self.size / 2 + 1);
        buffer
    }

    /// Inverse FFT of a full complex spectrum, returning the real part.
    pub fn inverse(&self, spectrum: &mut [Complex<f32>]) -> Vec<f32> {
        assert_eq!(spectrum.len(), self.size);
        self.ifft.process(spectrum);
        let scale = 1.0 / self.size as f32;
        spectrum.iter().map(|c| c.re * scale).collect()
    }
}

/// Normalised bin amplitudes: `2 |X[k]| / N`, so a full-scale sine reads 1.0
/// at its bin.
pub fn bin_amplitudes(spectrum: &[Complex<f32>], fft_size: usize) -> Vec<f32> {
    spectrum
        .iter()
        .map(|c| 2.0 * c.norm() / fft_size as f32)
        .collect()
}

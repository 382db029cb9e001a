//! Signal analysis for captured audio.

use std::f64::consts::PI;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Smallest power used when converting to decibels.
const DB_FLOOR: f64 = 1e-20;

/// One-sided power spectral density estimate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    /// Bin centre frequencies in Hz, from 0 to the Nyquist frequency.
    pub frequencies: Vec<f64>,
    /// Power per bin, in units²/Hz.
    pub power: Vec<f64>,
}

impl Spectrum {
    /// Returns the power in decibels (`10 * log10(power)`).
    pub fn power_db(&self) -> Vec<f64> {
        self.power
            .iter()
            .map(|p| 10.0 * p.max(DB_FLOOR).log10())
            .collect()
    }

    /// Returns the index of the strongest bin.
    #[cfg(test)]
    pub fn peak_bin(&self) -> Option<usize> {
        self.power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }

    /// Returns the number of bins.
    pub fn len(&self) -> usize {
        self.power.len()
    }

    /// Returns true if the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }
}

/// Root-mean-square amplitude of the samples. Empty input gives `0.0`.
pub fn rms(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples
        .iter()
        .map(|&s| {
            let s = f64::from(s);
            s * s
        })
        .sum();
    (sum / samples.len() as f64).sqrt()
}

/// Rounds to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Symmetric Hann window of length `n`.
fn hann(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    let denom = (n - 1) as f64;
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / denom).cos())
        .collect()
}

/// Welch power spectral density estimate.
///
/// Non-overlapping segments of `nfft` samples are Hann windowed, transformed
/// and averaged. The result is one-sided and scaled by `1 / (fs * Σw²)`.
/// Input shorter than `nfft` is zero padded to a single segment.
pub fn power_spectral_density(samples: &[i16], sample_rate: u32, nfft: usize) -> Spectrum {
    let nfft = nfft.max(2);
    let fs = f64::from(sample_rate);
    let window = hann(nfft);
    let window_power: f64 = window.iter().map(|w| w * w).sum();

    let segments = (samples.len() / nfft).max(1);
    let bins = nfft / 2 + 1;

    let fft = FftPlanner::<f64>::new().plan_fft_forward(nfft);
    let mut buffer = vec![Complex::new(0.0, 0.0); nfft];
    let mut power = vec![0.0; bins];

    for segment in 0..segments {
        let start = segment * nfft;
        for (i, slot) in buffer.iter_mut().enumerate() {
            let sample = samples.get(start + i).copied().map_or(0.0, f64::from);
            *slot = Complex::new(sample * window[i], 0.0);
        }
        fft.process(&mut buffer);
        for (acc, bin) in power.iter_mut().zip(&buffer) {
            *acc += bin.norm_sqr();
        }
    }

    let scale = 1.0 / (fs * window_power * segments as f64);
    // Nyquist only has its own bin for even lengths
    let last_doubled = if nfft % 2 == 0 { bins - 1 } else { bins };
    for (k, p) in power.iter_mut().enumerate() {
        *p *= scale;
        if k > 0 && k < last_doubled {
            *p *= 2.0;
        }
    }

    let frequencies = (0..bins).map(|k| k as f64 * fs / nfft as f64).collect();

    Spectrum { frequencies, power }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_zero_buffer() {
        assert_eq!(rms(&[0; 88_200]), 0.0);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_rms_constant_buffer() {
        assert_eq!(round2(rms(&[1200; 4410])), 1200.0);
        assert_eq!(round2(rms(&[-37; 100])), 37.0);
    }

    #[test]
    fn test_rms_does_not_overflow() {
        assert_eq!(rms(&[i16::MAX; 16]), f64::from(i16::MAX));
        assert_eq!(rms(&[i16::MIN; 16]), 32768.0);
    }

    #[test]
    fn test_rms_mixed() {
        // sqrt((9 + 16) / 2)
        assert!((rms(&[3, -4]) - (12.5f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(2.675001), 2.68);
        assert_eq!(round2(10.0), 10.0);
        assert_eq!(round2(-1.234), -1.23);
    }

    #[test]
    fn test_hann_window() {
        let w = hann(5);
        assert_eq!(w.len(), 5);
        assert!(w[0].abs() < 1e-12);
        assert!((w[2] - 1.0).abs() < 1e-12);
        assert!(w[4].abs() < 1e-12);
    }

    #[test]
    fn test_psd_frequencies() {
        let spectrum = power_spectral_density(&[0; 1024], 44_100, 256);
        assert_eq!(spectrum.len(), 129);
        assert_eq!(spectrum.frequencies[0], 0.0);
        assert_eq!(spectrum.frequencies[128], 22_050.0);
        assert!(spectrum.power.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_psd_sine_peak() {
        let fs = 44_100.0;
        let freq = 32.0 * fs / 256.0;
        let samples: Vec<i16> = (0..8192)
            .map(|n| (10_000.0 * (2.0 * PI * freq * n as f64 / fs).sin()) as i16)
            .collect();

        let spectrum = power_spectral_density(&samples, 44_100, 256);
        assert_eq!(spectrum.peak_bin(), Some(32));
        assert!(spectrum.power[32] > 100.0 * spectrum.power[40]);
    }

    #[test]
    fn test_psd_short_input_is_padded() {
        let spectrum = power_spectral_density(&[100; 10], 8_000, 256);
        assert_eq!(spectrum.len(), 129);
        assert!(spectrum.power[0] > 0.0);
    }

    #[test]
    fn test_power_db_floor() {
        let spectrum = Spectrum {
            frequencies: vec![0.0, 1.0],
            power: vec![0.0, 100.0],
        };
        let db = spectrum.power_db();
        assert_eq!(db[0], -200.0);
        assert!((db[1] - 20.0).abs() < 1e-12);
    }
}

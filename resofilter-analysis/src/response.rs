//! FFT-based frequency response of a linear system

use rustfft::{num_complex::Complex, FftPlanner};
use thiserror::Error;

use crate::signal::impulse;

/// Smallest transform used, keeps short responses reasonably resolved
const MIN_FFT_SIZE: usize = 1024;

/// Errors that can occur during measurement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Impulse response is empty")]
    EmptyResponse,
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f32),
}

/// Complex frequency response from DC to Nyquist
#[derive(Debug, Clone)]
pub struct FrequencyResponse {
    sample_rate: f32,
    fft_size: usize,
    /// Bins `0..=fft_size / 2`
    bins: Vec<Complex<f32>>,
}

impl FrequencyResponse {
    /// Transform an impulse response.
    ///
    /// The response is zero padded to the next power of two (at least 1024).
    pub fn from_impulse_response(
        impulse_response: &[f32],
        sample_rate: f32,
    ) -> Result<Self, AnalysisError> {
        if impulse_response.is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(AnalysisError::InvalidSampleRate(sample_rate));
        }

        let fft_size = impulse_response.len().next_power_of_two().max(MIN_FFT_SIZE);
        let mut buffer: Vec<Complex<f32>> = impulse_response
            .iter()
            .map(|&s| Complex::new(s, 0.0))
            .collect();
        buffer.resize(fft_size, Complex::new(0.0, 0.0));

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        fft.process(&mut buffer);

        buffer.truncate(fft_size / 2 + 1);
        Ok(Self {
            sample_rate,
            fft_size,
            bins: buffer,
        })
    }

    /// Feed a unit impulse through `process` for `len` samples and transform
    /// the result.
    pub fn measure<F>(mut process: F, len: usize, sample_rate: f32) -> Result<Self, AnalysisError>
    where
        F: FnMut(f32) -> f32,
    {
        let mut response = impulse(len);
        for sample in &mut response {
            *sample = process(*sample);
        }
        Self::from_impulse_response(&response, sample_rate)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Frequency spacing between bins in Hz
    pub fn bin_width(&self) -> f32 {
        self.sample_rate / self.fft_size as f32
    }

    /// Nearest bin to `freq`, clamped to Nyquist
    pub fn bin_for(&self, freq: f32) -> usize {
        let bin = (freq.max(0.0) / self.bin_width()).round() as usize;
        bin.min(self.bins.len() - 1)
    }

    /// Linear magnitude at `freq`
    pub fn magnitude_at(&self, freq: f32) -> f32 {
        self.bins[self.bin_for(freq)].norm()
    }

    /// Magnitude at `freq` in dB, floored at -240 dB
    pub fn magnitude_db_at(&self, freq: f32) -> f32 {
        20.0 * self.magnitude_at(freq).max(1e-12).log10()
    }

    /// Phase at `freq` in radians, in [-pi, pi]
    pub fn phase_at(&self, freq: f32) -> f32 {
        self.bins[self.bin_for(freq)].arg()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_impulse_is_flat() {
        let response = FrequencyResponse::from_impulse_response(&[1.0], 48000.0).unwrap();
        assert_eq!(response.fft_size(), MIN_FFT_SIZE);
        for freq in [0.0, 100.0, 1000.0, 10000.0, 24000.0] {
            assert!((response.magnitude_at(freq) - 1.0).abs() < 1e-6);
        }
        assert!(response.magnitude_db_at(1000.0).abs() < 1e-4);
    }

    #[test]
    fn test_delay_shifts_phase() {
        // one-sample delay: phase = -omega
        let response = FrequencyResponse::measure(
            {
                let mut last = 0.0;
                move |x| std::mem::replace(&mut last, x)
            },
            1024,
            48000.0,
        )
        .unwrap();
        let freq = response.bin_width() * 64.0;
        let expected = -std::f32::consts::TAU * freq / 48000.0;
        assert!((response.phase_at(freq) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_bin_lookup_clamps() {
        let response = FrequencyResponse::from_impulse_response(&[1.0; 4], 1024.0).unwrap();
        assert_eq!(response.bin_width(), 1.0);
        assert_eq!(response.bin_for(10.4), 10);
        assert_eq!(response.bin_for(1.0e6), 512);
        assert_eq!(response.bin_for(-5.0), 0);
    }

    #[test]
    fn test_measure_rejects_bad_input() {
        assert_eq!(
            FrequencyResponse::from_impulse_response(&[], 48000.0).err(),
            Some(AnalysisError::EmptyResponse)
        );
        assert!(FrequencyResponse::from_impulse_response(&[1.0], 0.0).is_err());
    }
}

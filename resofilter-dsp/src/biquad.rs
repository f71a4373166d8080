//! Second-order IIR sections (RBJ cookbook forms)
//!
//! Coefficients are stored pre-normalised by `a0`, so the difference equation
//! needs no division per sample.

use std::f32::consts::TAU;

/// Response shape of a biquad section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiquadKind {
    LowPass,
    HighPass,
    /// Constant skirt gain, peak gain = Q
    BandPassCsg,
    /// Constant 0 dB peak gain
    BandPassCzpg,
    Notch,
    AllPass,
}

/// Biquad coefficients normalised by `a0`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoeffs {
    /// Design a section for `frequency` (Hz) and `q`.
    ///
    /// Both inputs must already be clamped to positive minimums.
    pub fn design(kind: BiquadKind, frequency: f32, q: f32, sample_rate: f32) -> Self {
        let omega = TAU * frequency / sample_rate;
        let (sin_omega, cos_omega) = omega.sin_cos();
        let alpha = 0.5 * sin_omega / q;

        let a0 = 1.0 / (1.0 + alpha);
        let a1 = -2.0 * cos_omega * a0;
        let a2 = (1.0 - alpha) * a0;

        let (b0, b1, b2) = match kind {
            BiquadKind::LowPass => {
                let b1 = (1.0 - cos_omega) * a0;
                (b1 * 0.5, b1, b1 * 0.5)
            }
            BiquadKind::HighPass => {
                let b1 = (-1.0 - cos_omega) * a0;
                (b1 * -0.5, b1, b1 * -0.5)
            }
            BiquadKind::BandPassCsg => {
                let b0 = sin_omega * 0.5 * a0;
                (b0, 0.0, -b0)
            }
            BiquadKind::BandPassCzpg => {
                let b0 = alpha * a0;
                (b0, 0.0, -b0)
            }
            BiquadKind::Notch => (a0, a1, a0),
            // (1 + alpha) * a0 == 1
            BiquadKind::AllPass => (a2, a1, 1.0),
        };

        Self { b0, b1, b2, a1, a2 }
    }
}

/// Biquad history for a single channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadState {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl BiquadState {
    #[inline]
    pub fn process(&mut self, input: f32, coeffs: &BiquadCoeffs) -> f32 {
        let output = coeffs.b0 * input + coeffs.b1 * self.x1 + coeffs.b2 * self.x2
            - coeffs.a1 * self.y1
            - coeffs.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    #[test]
    fn test_lowpass_unity_dc_gain() {
        let c = BiquadCoeffs::design(BiquadKind::LowPass, 1000.0, 0.707, SR);
        let dc = (c.b0 + c.b1 + c.b2) / (1.0 + c.a1 + c.a2);
        assert!((dc - 1.0).abs() < 1e-3, "dc gain {}", dc);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let c = BiquadCoeffs::design(BiquadKind::HighPass, 1000.0, 0.707, SR);
        assert!((c.b0 + c.b1 + c.b2).abs() < 1e-6);
    }

    #[test]
    fn test_bandpass_forms_have_zero_b1() {
        for kind in [BiquadKind::BandPassCsg, BiquadKind::BandPassCzpg] {
            let c = BiquadCoeffs::design(kind, 2000.0, 2.0, SR);
            assert_eq!(c.b1, 0.0);
            assert_eq!(c.b2, -c.b0);
        }
    }

    #[test]
    fn test_notch_and_allpass_mirror_feedback() {
        let notch = BiquadCoeffs::design(BiquadKind::Notch, 500.0, 1.0, SR);
        assert_eq!(notch.b1, notch.a1);
        assert_eq!(notch.b0, notch.b2);

        let allpass = BiquadCoeffs::design(BiquadKind::AllPass, 500.0, 1.0, SR);
        assert_eq!(allpass.b1, allpass.a1);
        assert_eq!(allpass.b0, allpass.a2);
        assert_eq!(allpass.b2, 1.0);
    }

    #[test]
    fn test_state_shifts_history() {
        let c = BiquadCoeffs {
            b0: 0.0,
            b1: 1.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        };
        let mut state = BiquadState::default();
        // pure one-sample delay
        assert_eq!(state.process(0.25, &c), 0.0);
        assert_eq!(state.process(0.5, &c), 0.25);
        assert_eq!(state.process(0.0, &c), 0.5);

        state.reset();
        assert_eq!(state, BiquadState::default());
    }
}

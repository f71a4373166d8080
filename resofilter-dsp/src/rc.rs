//! 4x oversampled simulation of an active RC filter network
//!
//! A one-pole lowpass, a one-pole highpass and a bandpass (lowpass of the
//! highpass) share one input node. The bandpass tap is fed back into that
//! node, which gives the network its resonance and, with enough feedback,
//! self-oscillation. Every intermediate value is limited to [-1, 1]; those
//! limits are what keep the oscillation bounded and must stay in place.

use std::f32::consts::TAU;

/// Internal iterations per output sample
pub const OVERSAMPLING: usize = 4;

/// Lowest cutoff the network is tuned for
pub const MIN_RC_FREQUENCY: f32 = 50.0;

/// Limit applied to every node value
pub const NODE_LIMIT: f32 = 1.0;

/// Network output selected by the RC filter families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RcTap {
    LowPass,
    BandPass,
    HighPass,
}

/// RC network coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RcCoeffs {
    /// Lowpass leak, weight of the previous value
    pub rca: f32,
    /// `1 - rca`, weight of the new input
    pub rcb: f32,
    /// Highpass coefficient
    pub rcc: f32,
    /// Bandpass feedback into the input node
    pub rcq: f32,
}

impl Default for RcCoeffs {
    fn default() -> Self {
        Self {
            rca: 0.0,
            rcb: 1.0,
            rcc: 0.0,
            rcq: 0.0,
        }
    }
}

impl RcCoeffs {
    /// Derive coefficients from the RC time constant at the oversampled rate.
    ///
    /// Resonance is divided by four; the network starts to self-oscillate
    /// once the scaled feedback reaches about 2.
    pub fn design(frequency: f32, resonance: f32, sample_rate: f32) -> Self {
        let frequency = frequency.max(MIN_RC_FREQUENCY);
        let dt = 1.0 / (sample_rate * OVERSAMPLING as f32);
        let rc = 1.0 / (frequency * TAU);

        let rca = 1.0 - dt / (rc + dt);
        Self {
            rca,
            rcb: 1.0 - rca,
            rcc: rc / (rc + dt),
            rcq: resonance / 4.0,
        }
    }
}

/// Network node values for a single channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RcState {
    lp: f32,
    bp: f32,
    hp: f32,
    last: f32,
}

impl RcState {
    #[inline]
    fn limit(x: f32) -> f32 {
        x.clamp(-NODE_LIMIT, NODE_LIMIT)
    }

    /// Run one output sample (four network iterations) and return `tap`.
    #[inline]
    pub fn process(&mut self, input: f32, coeffs: &RcCoeffs, tap: RcTap) -> f32 {
        let RcCoeffs { rca, rcb, rcc, rcq } = *coeffs;

        for _ in 0..OVERSAMPLING {
            let node = Self::limit(input + self.bp * rcq);
            let lp = Self::limit(node * rcb + self.lp * rca);
            let hp = Self::limit(rcc * (self.hp + node - self.last));
            let bp = Self::limit(hp * rcb + self.bp * rca);

            self.last = node;
            self.lp = lp;
            self.hp = hp;
            self.bp = bp;
        }

        match tap {
            RcTap::LowPass => self.lp,
            RcTap::BandPass => self.bp,
            RcTap::HighPass => self.hp,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rc_frequency_floor() {
        let low = RcCoeffs::design(1.0, 1.0, 48000.0);
        let floor = RcCoeffs::design(MIN_RC_FREQUENCY, 1.0, 48000.0);
        assert_eq!(low, floor);
    }

    #[test]
    fn test_rc_coeffs_complementary() {
        let c = RcCoeffs::design(1000.0, 2.0, 48000.0);
        assert!((c.rca + c.rcb - 1.0).abs() < 1e-6);
        assert!(c.rcc > 0.0 && c.rcc < 1.0);
        assert_eq!(c.rcq, 0.5);
    }

    #[test]
    fn test_rc_lowpass_settles_to_dc() {
        let c = RcCoeffs::design(1000.0, 0.01, 48000.0);
        let mut state = RcState::default();
        let mut out = 0.0;
        for _ in 0..4800 {
            out = state.process(0.5, &c, RcTap::LowPass);
        }
        assert!((out - 0.5).abs() < 0.01, "settled at {}", out);

        // highpass of a constant decays away
        let hp = state.process(0.5, &c, RcTap::HighPass);
        assert!(hp.abs() < 0.01);
    }

    #[test]
    fn test_rc_nodes_stay_limited() {
        let c = RcCoeffs::design(5000.0, 100.0, 48000.0);
        let mut state = RcState::default();
        for i in 0..4800 {
            let input = if i % 3 == 0 { 50.0 } else { -50.0 };
            for tap in [RcTap::LowPass, RcTap::BandPass, RcTap::HighPass] {
                let out = state.process(input, &c, tap);
                assert!(out.abs() <= NODE_LIMIT);
            }
        }
    }
}

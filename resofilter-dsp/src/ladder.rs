//! Nonlinear 4-pole ladder ("Moog") filter
//!
//! Four cascaded one-pole lowpass stages discretised with the bilinear
//! transform, global feedback from the last stage, and a cubic soft clip on
//! the output. Stage values are hard-limited so the filter can be driven into
//! self-oscillation without blowing up.

/// Limit applied to every stage value
pub const STAGE_LIMIT: f32 = 10.0;

/// Empirical exponent scale for the resonance mapping
const RESONANCE_TUNING: f32 = 1.386249;

/// Ladder coefficients
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LadderCoeffs {
    /// One-pole gain
    pub p: f32,
    /// One-pole feedback, `2p - 1`
    pub k: f32,
    /// Global resonance feedback
    pub r: f32,
}

impl LadderCoeffs {
    pub fn design(frequency: f32, resonance: f32, sample_rate: f32) -> Self {
        // [0 - 0.5] for audible cutoffs
        let f = frequency / sample_rate;
        let p = (3.6 - 3.2 * f) * f;
        let k = 2.0 * p - 1.0;
        let r = resonance * ((1.0 - p) * RESONANCE_TUNING).exp();
        Self { p, k, r }
    }
}

/// Ladder integrator states for a single channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LadderState {
    y: [f32; 4],
    old_x: f32,
    old_y: [f32; 3],
}

impl LadderState {
    #[inline]
    pub fn process(&mut self, input: f32, coeffs: &LadderCoeffs) -> f32 {
        let LadderCoeffs { p, k, r } = *coeffs;
        let x = input - r * self.y[3];

        let y1 = ((x + self.old_x) * p - k * self.y[0]).clamp(-STAGE_LIMIT, STAGE_LIMIT);
        let y2 = ((y1 + self.old_y[0]) * p - k * self.y[1]).clamp(-STAGE_LIMIT, STAGE_LIMIT);
        let y3 = ((y2 + self.old_y[1]) * p - k * self.y[2]).clamp(-STAGE_LIMIT, STAGE_LIMIT);
        let y4 = ((y3 + self.old_y[2]) * p - k * self.y[3]).clamp(-STAGE_LIMIT, STAGE_LIMIT);

        self.y = [y1, y2, y3, y4];
        self.old_x = x;
        self.old_y = [y1, y2, y3];

        y4 - y4 * y4 * y4 * (1.0 / 6.0)
    }

    /// Current stage values, `y1..y4`
    pub fn stages(&self) -> [f32; 4] {
        self.y
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

//! One filter stage: coefficients, history and per-sample dispatch

use crate::biquad::{BiquadCoeffs, BiquadKind};
use crate::family::Topology;
use crate::history::History;
use crate::ladder::LadderCoeffs;
use crate::rc::RcCoeffs;

/// Coefficient sets, one per topology
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coefficients {
    pub biquad: BiquadCoeffs,
    pub ladder: LadderCoeffs,
    pub rc: RcCoeffs,
}

/// A single filter stage
///
/// A stage only reads the coefficient set of its current topology.
#[derive(Debug, Clone)]
pub struct FilterStage<const CHANNELS: usize> {
    topology: Topology,
    coeffs: Coefficients,
    history: History<CHANNELS>,
}

impl<const CHANNELS: usize> Default for FilterStage<CHANNELS> {
    fn default() -> Self {
        Self {
            topology: Topology::Biquad(BiquadKind::LowPass),
            coeffs: Coefficients::default(),
            history: History::default(),
        }
    }
}

impl<const CHANNELS: usize> FilterStage<CHANNELS> {
    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coeffs
    }

    pub fn history(&self) -> &History<CHANNELS> {
        &self.history
    }

    pub(crate) fn set_topology(&mut self, topology: Topology) {
        self.topology = topology;
    }

    /// Recompute the coefficient set of the current topology.
    ///
    /// `frequency` and `resonance` must already be clamped.
    pub(crate) fn design(&mut self, frequency: f32, resonance: f32, sample_rate: f32) {
        match self.topology {
            Topology::Biquad(kind) => {
                self.coeffs.biquad = BiquadCoeffs::design(kind, frequency, resonance, sample_rate);
            }
            Topology::Ladder => {
                self.coeffs.ladder = LadderCoeffs::design(frequency, resonance, sample_rate);
            }
            Topology::Rc(_) => {
                self.coeffs.rc = RcCoeffs::design(frequency, resonance, sample_rate);
            }
        }
    }

    /// Track another stage's topology and coefficients, keeping own history
    pub(crate) fn mirror(&mut self, other: &Self) {
        self.topology = other.topology;
        self.coeffs = other.coeffs;
    }

    pub(crate) fn clear_history(&mut self) {
        self.history.clear();
    }

    /// # Panics
    ///
    /// Panics if `channel >= CHANNELS`.
    #[inline]
    pub(crate) fn process(&mut self, input: f32, channel: usize) -> f32 {
        let history = self.history.channel_mut(channel);
        match self.topology {
            Topology::Biquad(_) => history.biquad.process(input, &self.coeffs.biquad),
            Topology::Ladder => history.ladder.process(input, &self.coeffs.ladder),
            Topology::Rc(tap) => history.rc.process(input, &self.coeffs.rc, tap),
        }
    }
}

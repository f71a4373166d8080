//! Multi-family filter with an optional cascade stage
//!
//! `BasicFilter` turns cutoff and resonance into coefficients for the active
//! family and runs one sample per channel per call. Cost per call is fixed:
//! straight-line arithmetic, plus four network iterations for the RC
//! families. Nothing here allocates after construction, and invalid
//! parameters are clamped rather than rejected.

use crate::error::FilterError;
use crate::family::FilterFamily;
use crate::stage::FilterStage;

/// Lowest cutoff accepted by `calc_coefficients`
pub const MIN_FREQUENCY: f32 = 0.01;

/// Lowest resonance accepted by `calc_coefficients`
pub const MIN_RESONANCE: f32 = 0.01;

/// Highest cutoff as a fraction of the sample rate
pub const MAX_FREQUENCY_RATIO: f32 = 0.499;

/// Channel count used by the stereo alias
pub const DEFAULT_CHANNELS: usize = 2;

/// Fallback for unusable sample rates
pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

const DEFAULT_CUTOFF: f32 = 1000.0;
const DEFAULT_RESONANCE: f32 = 0.707;

/// Stereo filter
pub type StereoFilter = BasicFilter<DEFAULT_CHANNELS>;

/// Multi-family filter over `CHANNELS` independent channels
#[derive(Debug, Clone)]
pub struct BasicFilter<const CHANNELS: usize> {
    family: FilterFamily,
    cascade_enabled: bool,
    sample_rate: f32,

    // Last request, clamped from below, reused when the family changes
    frequency: f32,
    resonance: f32,

    primary: FilterStage<CHANNELS>,
    // Allocated once up front so selecting the double filter never allocates
    cascade: Box<FilterStage<CHANNELS>>,
}

#[inline]
fn clamp_min(value: f32, min: f32) -> f32 {
    if value.is_finite() {
        value.max(min)
    } else {
        min
    }
}

impl<const CHANNELS: usize> BasicFilter<CHANNELS> {
    /// Create a lowpass filter at 1 kHz, Q 0.707.
    ///
    /// A sample rate that is not finite and positive falls back to
    /// [`DEFAULT_SAMPLE_RATE`].
    pub fn new(sample_rate: f32) -> Self {
        Self::try_new(sample_rate).unwrap_or_else(|err| {
            tracing::warn!("{}, using {} Hz", err, DEFAULT_SAMPLE_RATE);
            Self::build(DEFAULT_SAMPLE_RATE)
        })
    }

    /// Create a filter, rejecting unusable sample rates
    pub fn try_new(sample_rate: f32) -> Result<Self, FilterError> {
        if sample_rate.is_finite() && sample_rate > 0.0 {
            Ok(Self::build(sample_rate))
        } else {
            Err(FilterError::InvalidSampleRate(sample_rate))
        }
    }

    fn build(sample_rate: f32) -> Self {
        let mut filter = Self {
            family: FilterFamily::LowPass,
            cascade_enabled: false,
            sample_rate,
            frequency: DEFAULT_CUTOFF,
            resonance: DEFAULT_RESONANCE,
            primary: FilterStage::default(),
            cascade: Box::default(),
        };
        filter.calc_coefficients(DEFAULT_CUTOFF, DEFAULT_RESONANCE);
        filter
    }

    /// Select a family.
    ///
    /// `DoubleLowPass` runs a lowpass followed by the cascade stage; any
    /// other family runs alone. Coefficients are recomputed for the new
    /// family from the last requested cutoff and resonance.
    pub fn set_family(&mut self, family: FilterFamily) {
        let selection = family.selection();
        self.family = selection.family;
        self.cascade_enabled = selection.cascade;
        self.primary.set_topology(selection.family.topology());
        self.calc_coefficients(self.frequency, self.resonance);
    }

    /// Select a family by legacy index.
    ///
    /// Index 11 selects `DoubleLowPass` like 7 does; higher indices leave the
    /// filter as is.
    pub fn set_family_index(&mut self, index: usize) -> Result<(), FilterError> {
        let family = FilterFamily::try_from(index)?;
        self.set_family(family);
        Ok(())
    }

    /// Chain the cascade stage after the active family.
    ///
    /// RC families ignore this while processing.
    pub fn set_cascade_enabled(&mut self, enabled: bool) {
        self.cascade_enabled = enabled;
        if enabled {
            self.cascade.mirror(&self.primary);
        }
    }

    /// Recompute coefficients for the active family.
    ///
    /// Both inputs are clamped to [`MIN_FREQUENCY`] / [`MIN_RESONANCE`];
    /// non-finite values fall back to those minimums. Biquad and ladder
    /// families are also capped at [`MAX_FREQUENCY_RATIO`] of the sample
    /// rate; the oversampled RC network is not. History is untouched.
    pub fn calc_coefficients(&mut self, frequency: f32, resonance: f32) {
        self.frequency = clamp_min(frequency, MIN_FREQUENCY);
        self.resonance = clamp_min(resonance, MIN_RESONANCE);

        let frequency = self.frequency();
        self.primary
            .design(frequency, self.resonance, self.sample_rate);
        if self.cascade_enabled && !self.family.is_rc() {
            self.cascade.mirror(&self.primary);
        }
    }

    /// Filter one sample of `channel`.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= CHANNELS`.
    #[inline]
    pub fn process(&mut self, input: f32, channel: usize) -> f32 {
        let out = self.primary.process(input, channel);
        if self.cascade_enabled && !self.family.is_rc() {
            self.cascade.process(out, channel)
        } else {
            out
        }
    }

    /// Filter one frame in place, one sample per channel
    #[inline]
    pub fn process_frame(&mut self, frame: &mut [f32; CHANNELS]) {
        for (channel, sample) in frame.iter_mut().enumerate() {
            *sample = self.process(*sample, channel);
        }
    }

    /// Zero the memory of every topology and channel, cascade included
    pub fn clear_history(&mut self) {
        self.primary.clear_history();
        self.cascade.clear_history();
    }

    /// Active family; `DoubleLowPass` reports as `LowPass`
    pub fn family(&self) -> FilterFamily {
        self.family
    }

    /// Whether samples currently run through the cascade stage
    pub fn is_cascaded(&self) -> bool {
        self.cascade_enabled && !self.family.is_rc()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Cutoff the active family is designed for, after clamping
    pub fn frequency(&self) -> f32 {
        if self.family.is_rc() {
            self.frequency
        } else {
            self.frequency.min(self.sample_rate * MAX_FREQUENCY_RATIO)
        }
    }

    /// Last requested cutoff, clamped from below only
    pub fn requested_frequency(&self) -> f32 {
        self.frequency
    }

    /// Last resonance after clamping
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    pub fn channels(&self) -> usize {
        CHANNELS
    }

    /// First stage
    pub fn primary_stage(&self) -> &FilterStage<CHANNELS> {
        &self.primary
    }

    /// Cascade stage, allocated for the filter's whole lifetime
    pub fn cascade_stage(&self) -> &FilterStage<CHANNELS> {
        &self.cascade
    }
}

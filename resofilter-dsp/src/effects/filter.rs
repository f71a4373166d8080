//! Interleaved filter effect with click-free bypass

use super::Effect;
use crate::family::FilterFamily;
use crate::filter::BasicFilter;

/// `BasicFilter` driven over interleaved buffers
pub struct FilterEffect<const CHANNELS: usize> {
    filter: BasicFilter<CHANNELS>,
    enabled: bool,

    // Wet envelope for click-free enable/disable
    wet_target: f32,
    wet_current: f32,
}

impl<const CHANNELS: usize> FilterEffect<CHANNELS> {
    /// Wet envelope smoothing coefficient (~10ms at 48kHz)
    const WET_SMOOTH_COEFF: f32 = 0.9995;

    /// Below this the bypassed effect stops processing
    const WET_SILENT: f32 = 0.0001;

    /// Create a disabled effect
    pub fn new(sample_rate: f32) -> Self {
        Self::with_filter(BasicFilter::new(sample_rate))
    }

    /// Wrap an existing filter, disabled
    pub fn with_filter(filter: BasicFilter<CHANNELS>) -> Self {
        Self {
            filter,
            enabled: false,
            wet_target: 0.0,
            wet_current: 0.0,
        }
    }

    pub fn filter(&self) -> &BasicFilter<CHANNELS> {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut BasicFilter<CHANNELS> {
        &mut self.filter
    }

    /// Current wet amount (0.0 - 1.0)
    pub fn wet(&self) -> f32 {
        self.wet_current
    }
}

impl<const CHANNELS: usize> Effect for FilterEffect<CHANNELS> {
    fn process(&mut self, samples: &mut [f32]) {
        // Skip processing only if fully disabled and envelope has settled
        if !self.enabled && self.wet_current < Self::WET_SILENT {
            return;
        }

        for frame in samples.chunks_exact_mut(CHANNELS) {
            self.wet_current = Self::WET_SMOOTH_COEFF * self.wet_current
                + (1.0 - Self::WET_SMOOTH_COEFF) * self.wet_target;

            for (channel, sample) in frame.iter_mut().enumerate() {
                let wet = self.filter.process(*sample, channel);
                *sample = *sample * (1.0 - self.wet_current) + wet * self.wet_current;
            }
        }
    }

    fn reset(&mut self) {
        self.filter.clear_history();
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.wet_target = if enabled { 1.0 } else { 0.0 };
        // Filter state is kept on disable so the tail fades out naturally
    }

    fn name(&self) -> &'static str {
        match self.filter.family() {
            FilterFamily::LowPass if self.filter.is_cascaded() => "Double LP Filter",
            // family() resolves DoubleLowPass to a cascaded LowPass
            FilterFamily::LowPass | FilterFamily::DoubleLowPass => "LP Filter",
            FilterFamily::HiPass => "HP Filter",
            FilterFamily::BandPassCsg => "BP Filter (CSG)",
            FilterFamily::BandPassCzpg => "BP Filter",
            FilterFamily::Notch => "Notch Filter",
            FilterFamily::AllPass => "Allpass Filter",
            FilterFamily::Moog => "Ladder Filter",
            FilterFamily::LowPassRc => "RC LP Filter",
            FilterFamily::BandPassRc => "RC BP Filter",
            FilterFamily::HighPassRc => "RC HP Filter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_effect_creation() {
        let effect = FilterEffect::<2>::new(48000.0);
        assert!(!effect.is_enabled());
        assert_eq!(effect.wet(), 0.0);
        assert_eq!(effect.name(), "LP Filter");
    }

    #[test]
    fn test_disabled_effect_is_transparent() {
        let mut effect = FilterEffect::<2>::new(48000.0);
        let mut samples = vec![0.5, -0.5, 0.3, -0.3, 0.1, -0.1];
        let original = samples.clone();
        effect.process(&mut samples);
        assert_eq!(samples, original);
    }

    #[test]
    fn test_enabled_effect_fades_in() {
        let mut effect = FilterEffect::<2>::new(48000.0);
        effect.filter_mut().calc_coefficients(200.0, 0.707);
        effect.set_enabled(true);

        let mut samples: Vec<f32> = (0..9600)
            .flat_map(|i| {
                let x = if i % 2 == 0 { 0.5 } else { -0.5 };
                [x, x]
            })
            .collect();
        effect.process(&mut samples);

        assert!(effect.wet() > 0.9);
        assert!(samples.iter().all(|s| s.is_finite()));
        // Nyquist-rate square is almost gone once fully wet
        let tail = &samples[samples.len() - 64..];
        assert!(tail.iter().all(|s| s.abs() < 0.1));
    }

    #[test]
    fn test_reset_clears_filter_history() {
        let mut effect = FilterEffect::<2>::new(48000.0);
        effect.set_enabled(true);
        let mut samples = vec![1.0; 64];
        effect.process(&mut samples);
        assert!(!effect.filter().primary_stage().history().is_clear());

        effect.reset();
        assert!(effect.filter().primary_stage().history().is_clear());
    }

    #[test]
    fn test_names_follow_family() {
        let mut effect = FilterEffect::<2>::new(48000.0);
        effect.filter_mut().set_family(FilterFamily::DoubleLowPass);
        assert_eq!(effect.filter().family(), FilterFamily::LowPass);
        assert_eq!(effect.name(), "Double LP Filter");
        effect.filter_mut().set_family(FilterFamily::BandPassRc);
        assert_eq!(effect.name(), "RC BP Filter");
    }
}

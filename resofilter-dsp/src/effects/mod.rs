//! Render-chain adapters around the filter core

mod filter;

pub use filter::FilterEffect;

/// Trait for audio effects
pub trait Effect: Send {
    /// Process audio samples in place (interleaved frames)
    fn process(&mut self, samples: &mut [f32]);

    /// Reset effect state
    fn reset(&mut self);

    /// Check if effect is enabled
    fn is_enabled(&self) -> bool;

    /// Enable/disable the effect
    fn set_enabled(&mut self, enabled: bool);

    /// Get effect name
    fn name(&self) -> &'static str;
}

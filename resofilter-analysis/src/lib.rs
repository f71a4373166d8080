//! Audio analysis module for resofilter
//!
//! Provides frequency-response measurement, level metering and test-signal
//! generation for exercising filters.

mod level;
mod response;
mod signal;

pub use level::{peak, rms, LevelMeter};
pub use response::{AnalysisError, FrequencyResponse};
pub use signal::{impulse, SineOscillator};

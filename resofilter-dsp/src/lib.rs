//! Real-time multi-family audio filter for resofilter
//!
//! This crate provides the filter core and its render-side plumbing:
//! - Filter: biquad (LP/HP/BP/notch/allpass), 4-pole ladder and 4x
//!   oversampled RC network families behind one per-sample interface
//! - Cascade: optional second stage for double filtering
//! - Effects: interleaved, click-free wrapper for render chains
//! - Port: double-buffered period storage
//! - Engine: command-driven render state for a dedicated audio thread

mod biquad;
mod effects;
mod engine;
mod error;
mod family;
mod filter;
mod history;
mod ladder;
mod port;
mod rc;
mod stage;

pub use biquad::{BiquadCoeffs, BiquadKind, BiquadState};
pub use effects::{Effect, FilterEffect};
pub use engine::{EngineHandle, EngineSnapshot, FilterCommand, FilterEngine, FilterEvent};
pub use error::FilterError;
pub use family::{FamilySelection, FilterFamily, Topology};
pub use filter::{
    BasicFilter, StereoFilter, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE, MAX_FREQUENCY_RATIO,
    MIN_FREQUENCY, MIN_RESONANCE,
};
pub use history::{ChannelHistory, History};
pub use ladder::{LadderCoeffs, LadderState};
pub use port::{AudioPort, BufferUsage, Frame};
pub use rc::{RcCoeffs, RcState, RcTap, OVERSAMPLING};
pub use stage::{Coefficients, FilterStage};

//! Control-path errors
//!
//! The audio path never fails; these only surface from parameter parsing and
//! construction.

use thiserror::Error;

/// Errors raised while configuring a filter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Unknown filter family index: {0}")]
    UnknownFamily(usize),
    #[error("Unknown filter family name: {0}")]
    UnknownFamilyName(String),
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f32),
}

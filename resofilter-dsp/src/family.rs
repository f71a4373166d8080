//! Filter family selection
//!
//! The eleven families keep their legacy numbering so stored presets and
//! automation data keep resolving to the same filter. `DoubleLowPass` is not
//! a topology of its own: it resolves to a lowpass with the cascade stage
//! switched on.

use std::fmt;
use std::str::FromStr;

use crate::biquad::BiquadKind;
use crate::error::FilterError;
use crate::rc::RcTap;

/// Selectable filter family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterFamily {
    #[default]
    LowPass,
    HiPass,
    /// Bandpass, constant skirt gain
    BandPassCsg,
    /// Bandpass, constant 0 dB peak gain
    BandPassCzpg,
    Notch,
    AllPass,
    /// 4-pole ladder
    Moog,
    /// Two chained lowpass stages
    DoubleLowPass,
    LowPassRc,
    BandPassRc,
    HighPassRc,
}

/// Topology that actually processes samples for a family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Biquad(BiquadKind),
    Ladder,
    Rc(RcTap),
}

/// What selecting a family does to a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilySelection {
    /// Family the filter runs
    pub family: FilterFamily,
    /// Whether the cascade stage is chained after it
    pub cascade: bool,
}

impl FilterFamily {
    /// All families in legacy index order
    pub const ALL: [FilterFamily; 11] = [
        FilterFamily::LowPass,
        FilterFamily::HiPass,
        FilterFamily::BandPassCsg,
        FilterFamily::BandPassCzpg,
        FilterFamily::Notch,
        FilterFamily::AllPass,
        FilterFamily::Moog,
        FilterFamily::DoubleLowPass,
        FilterFamily::LowPassRc,
        FilterFamily::BandPassRc,
        FilterFamily::HighPassRc,
    ];

    /// Family count, also accepted as an index for `DoubleLowPass`
    pub const DOUBLE_SENTINEL: usize = Self::ALL.len();

    /// Legacy index of this family
    pub fn index(self) -> usize {
        match self {
            FilterFamily::LowPass => 0,
            FilterFamily::HiPass => 1,
            FilterFamily::BandPassCsg => 2,
            FilterFamily::BandPassCzpg => 3,
            FilterFamily::Notch => 4,
            FilterFamily::AllPass => 5,
            FilterFamily::Moog => 6,
            FilterFamily::DoubleLowPass => 7,
            FilterFamily::LowPassRc => 8,
            FilterFamily::BandPassRc => 9,
            FilterFamily::HighPassRc => 10,
        }
    }

    /// Resolve the sentinel alias into the family actually run
    pub fn selection(self) -> FamilySelection {
        match self {
            FilterFamily::DoubleLowPass => FamilySelection {
                family: FilterFamily::LowPass,
                cascade: true,
            },
            family => FamilySelection {
                family,
                cascade: false,
            },
        }
    }

    /// Processing topology; `DoubleLowPass` maps to the lowpass biquad
    pub fn topology(self) -> Topology {
        match self {
            FilterFamily::LowPass | FilterFamily::DoubleLowPass => {
                Topology::Biquad(BiquadKind::LowPass)
            }
            FilterFamily::HiPass => Topology::Biquad(BiquadKind::HighPass),
            FilterFamily::BandPassCsg => Topology::Biquad(BiquadKind::BandPassCsg),
            FilterFamily::BandPassCzpg => Topology::Biquad(BiquadKind::BandPassCzpg),
            FilterFamily::Notch => Topology::Biquad(BiquadKind::Notch),
            FilterFamily::AllPass => Topology::Biquad(BiquadKind::AllPass),
            FilterFamily::Moog => Topology::Ladder,
            FilterFamily::LowPassRc => Topology::Rc(RcTap::LowPass),
            FilterFamily::BandPassRc => Topology::Rc(RcTap::BandPass),
            FilterFamily::HighPassRc => Topology::Rc(RcTap::HighPass),
        }
    }

    /// RC families never run through the cascade stage
    pub fn is_rc(self) -> bool {
        matches!(self.topology(), Topology::Rc(_))
    }

    /// Short name, also accepted by `FromStr`
    pub fn name(self) -> &'static str {
        match self {
            FilterFamily::LowPass => "lowpass",
            FilterFamily::HiPass => "highpass",
            FilterFamily::BandPassCsg => "bandpass-csg",
            FilterFamily::BandPassCzpg => "bandpass-czpg",
            FilterFamily::Notch => "notch",
            FilterFamily::AllPass => "allpass",
            FilterFamily::Moog => "moog",
            FilterFamily::DoubleLowPass => "double-lowpass",
            FilterFamily::LowPassRc => "rc-lowpass",
            FilterFamily::BandPassRc => "rc-bandpass",
            FilterFamily::HighPassRc => "rc-highpass",
        }
    }
}

impl TryFrom<usize> for FilterFamily {
    type Error = FilterError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        if index == FilterFamily::DOUBLE_SENTINEL {
            return Ok(FilterFamily::DoubleLowPass);
        }
        Self::ALL
            .get(index)
            .copied()
            .ok_or(FilterError::UnknownFamily(index))
    }
}

impl FromStr for FilterFamily {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let alias = match wanted.as_str() {
            "lp" => Some(FilterFamily::LowPass),
            "hp" | "hipass" => Some(FilterFamily::HiPass),
            "bp" => Some(FilterFamily::BandPassCzpg),
            "ladder" => Some(FilterFamily::Moog),
            _ => None,
        };
        alias
            .or_else(|| Self::ALL.into_iter().find(|f| f.name() == wanted))
            .ok_or_else(|| FilterError::UnknownFamilyName(s.to_string()))
    }
}

impl fmt::Display for FilterFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Render configuration
//!
//! Simple `key=value` format, one entry per line or per command-line
//! argument. Lines starting with `#` are comments and unknown keys are
//! ignored.

use std::str::FromStr;

use resofilter_dsp::{FilterError, FilterFamily};
use thiserror::Error;

/// Errors raised while reading a configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("{key} must be greater than zero")]
    NotPositive { key: &'static str },
    #[error(transparent)]
    Family(#[from] FilterError),
}

/// What to render and how
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub family: FilterFamily,
    pub cutoff: f32,
    pub resonance: f32,
    pub sample_rate: f32,
    pub period_frames: usize,
    pub periods: usize,
    /// Frequency of the test tone fed to the filter
    pub tone_hz: f32,
    pub amplitude: f32,
    /// Cutoff reached on the last period; no sweep when unset
    pub sweep_to: Option<f32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            family: FilterFamily::LowPass,
            cutoff: 1000.0,
            resonance: 0.707,
            sample_rate: 48000.0,
            period_frames: 256,
            periods: 200,
            tone_hz: 220.0,
            amplitude: 0.5,
            sweep_to: None,
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl RenderConfig {
    /// Parse config from `key=value` lines
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for line in content.lines() {
            config.apply(line)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse config from `key=value` arguments
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        for arg in args {
            config.apply(arg.as_ref())?;
        }
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, line: &str) -> Result<(), ConfigError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim();

            match key {
                "family" => self.family = value.parse()?,
                "cutoff" => self.cutoff = parse_value(key, value)?,
                "resonance" => self.resonance = parse_value(key, value)?,
                "sample_rate" => self.sample_rate = parse_value(key, value)?,
                "period_frames" => self.period_frames = parse_value(key, value)?,
                "periods" => self.periods = parse_value(key, value)?,
                "tone_hz" => self.tone_hz = parse_value(key, value)?,
                "amplitude" => self.amplitude = parse_value(key, value)?,
                "sweep_to" => {
                    self.sweep_to = if value.is_empty() {
                        None
                    } else {
                        Some(parse_value(key, value)?)
                    }
                }
                _ => tracing::debug!(key, "ignoring unknown config key"),
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::NotPositive { key: "sample_rate" });
        }
        if self.period_frames == 0 {
            return Err(ConfigError::NotPositive {
                key: "period_frames",
            });
        }
        if self.periods == 0 {
            return Err(ConfigError::NotPositive { key: "periods" });
        }
        Ok(())
    }

    /// Cutoff for `period`, swept geometrically towards `sweep_to`
    pub fn cutoff_at(&self, period: usize) -> f32 {
        match self.sweep_to {
            Some(target) if self.periods > 1 && self.cutoff > 0.0 && target > 0.0 => {
                let t = period.min(self.periods - 1) as f32 / (self.periods - 1) as f32;
                self.cutoff * (target / self.cutoff).powf(t)
            }
            _ => self.cutoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert_eq!(RenderConfig::parse("").unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_parse_with_comments() {
        let content = "# Comment\nfamily=moog\ncutoff = 440\n# Another comment\nresonance=2.5";
        let config = RenderConfig::parse(content).unwrap();
        assert_eq!(config.family, FilterFamily::Moog);
        assert_eq!(config.cutoff, 440.0);
        assert_eq!(config.resonance, 2.5);
    }

    #[test]
    fn test_from_args() {
        let config =
            RenderConfig::from_args(["family=rc-bandpass", "periods=10", "sweep_to=4000"]).unwrap();
        assert_eq!(config.family, FilterFamily::BandPassRc);
        assert_eq!(config.periods, 10);
        assert_eq!(config.sweep_to, Some(4000.0));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = RenderConfig::parse("colour=blue\nnot a pair").unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert_eq!(
            RenderConfig::parse("cutoff=fast"),
            Err(ConfigError::InvalidValue {
                key: "cutoff".to_string(),
                value: "fast".to_string(),
            })
        );
        assert!(matches!(
            RenderConfig::parse("family=wobble"),
            Err(ConfigError::Family(FilterError::UnknownFamilyName(_)))
        ));
        assert_eq!(
            RenderConfig::parse("period_frames=0"),
            Err(ConfigError::NotPositive {
                key: "period_frames"
            })
        );
    }

    #[test]
    fn test_cutoff_sweep() {
        let mut config = RenderConfig::parse("cutoff=100\nsweep_to=10000\nperiods=3").unwrap();
        assert_eq!(config.cutoff_at(0), 100.0);
        assert!((config.cutoff_at(1) - 1000.0).abs() < 0.5);
        assert!((config.cutoff_at(2) - 10000.0).abs() < 1.0);
        assert!((config.cutoff_at(99) - 10000.0).abs() < 1.0);

        config.sweep_to = None;
        assert_eq!(config.cutoff_at(2), 100.0);
    }
}

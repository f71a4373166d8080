//! Peak and RMS level measurement

/// Peak absolute level
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Root-mean-square level, 0.0 for an empty slice
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// Running level meter over any number of buffers
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelMeter {
    peak: f32,
    sum_sq: f64,
    count: u64,
}

impl LevelMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a buffer
    pub fn update(&mut self, samples: &[f32]) {
        self.peak = self.peak.max(peak(samples));
        self.sum_sq += samples.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>();
        self.count += samples.len() as u64;
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    pub fn rms(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        (self.sum_sq / self.count as f64).sqrt() as f32
    }

    /// Peak in dBFS, floored at -120 dB
    pub fn peak_db(&self) -> f32 {
        20.0 * self.peak.max(1e-6).log10()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_and_rms() {
        assert_eq!(peak(&[0.1, -0.8, 0.5]), 0.8);
        assert_eq!(rms(&[]), 0.0);
        assert!((rms(&[1.0, -1.0, 1.0, -1.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_meter_accumulates() {
        let mut meter = LevelMeter::new();
        meter.update(&[0.5, -0.5]);
        meter.update(&[0.0, 0.0]);
        assert_eq!(meter.peak(), 0.5);
        assert!((meter.rms() - 0.5 / 2.0f32.sqrt()).abs() < 1e-6);
        assert!((meter.peak_db() + 6.0206).abs() < 1e-3);

        meter.reset();
        assert_eq!(meter.rms(), 0.0);
        assert!((meter.peak_db() + 120.0).abs() < 1e-3);
    }
}

//! Test signal generators

use std::f32::consts::TAU;

/// Unit impulse followed by `len - 1` zeros
pub fn impulse(len: usize) -> Vec<f32> {
    let mut buf = vec![0.0; len];
    if let Some(first) = buf.first_mut() {
        *first = 1.0;
    }
    buf
}

/// Phase-accumulating sine oscillator
#[derive(Debug, Clone, Copy)]
pub struct SineOscillator {
    phase: f32,
    increment: f32,
    sample_rate: f32,
    amplitude: f32,
}

impl SineOscillator {
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            increment: frequency / sample_rate,
            sample_rate,
            amplitude: 1.0,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn frequency(&self) -> f32 {
        self.increment * self.sample_rate
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let out = (self.phase * TAU).sin() * self.amplitude;
        self.phase = (self.phase + self.increment).fract();
        out
    }

    pub fn fill(&mut self, buffer: &mut [f32]) {
        for sample in buffer {
            *sample = self.next_sample();
        }
    }
}

//! Double-buffered audio port
//!
//! A port owns two period buffers. Producers render into the first buffer
//! (or the second, when they run one period ahead) and mark it used; the
//! mixer reads the first buffer and then advances the port one period, which
//! clears the first buffer and swaps the pair.

/// Which of the port's buffers carry audio this period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferUsage {
    #[default]
    None,
    First,
    /// Both buffers hold audio
    Second,
}

impl BufferUsage {
    /// Usage after one period has elapsed
    pub fn decay(self) -> Self {
        match self {
            BufferUsage::Second => BufferUsage::First,
            BufferUsage::First | BufferUsage::None => BufferUsage::None,
        }
    }
}

/// Audio frame of `CHANNELS` samples
pub type Frame<const CHANNELS: usize> = [f32; CHANNELS];

/// Port with two pre-allocated period buffers
pub struct AudioPort<const CHANNELS: usize> {
    name: String,
    first: Vec<Frame<CHANNELS>>,
    second: Vec<Frame<CHANNELS>>,
    usage: BufferUsage,
}

impl<const CHANNELS: usize> AudioPort<CHANNELS> {
    pub fn new(name: impl Into<String>, frames_per_period: usize) -> Self {
        Self {
            name: name.into(),
            first: vec![[0.0; CHANNELS]; frames_per_period],
            second: vec![[0.0; CHANNELS]; frames_per_period],
            usage: BufferUsage::None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frames_per_period(&self) -> usize {
        self.first.len()
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Record that a producer wrote into `usage`'s buffer this period
    pub fn mark_used(&mut self, usage: BufferUsage) {
        if usage == BufferUsage::Second || self.usage == BufferUsage::None {
            self.usage = usage;
        }
    }

    pub fn first_buffer(&self) -> &[Frame<CHANNELS>] {
        &self.first
    }

    pub fn first_buffer_mut(&mut self) -> &mut [Frame<CHANNELS>] {
        &mut self.first
    }

    pub fn second_buffer(&self) -> &[Frame<CHANNELS>] {
        &self.second
    }

    pub fn second_buffer_mut(&mut self) -> &mut [Frame<CHANNELS>] {
        &mut self.second
    }

    /// Advance one period: clear the consumed buffer, swap, decay usage
    pub fn next_period(&mut self) {
        self.first.fill([0.0; CHANNELS]);
        std::mem::swap(&mut self.first, &mut self.second);
        self.usage = self.usage.decay();
    }
}

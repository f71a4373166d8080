//! Per-channel filter memory

use crate::biquad::BiquadState;
use crate::ladder::LadderState;
use crate::rc::RcState;

/// Memory of every topology for one channel
///
/// All three are kept side by side so switching families never allocates;
/// only the one matching the active topology is touched while processing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelHistory {
    pub biquad: BiquadState,
    pub ladder: LadderState,
    pub rc: RcState,
}

impl ChannelHistory {
    pub fn clear(&mut self) {
        self.biquad.reset();
        self.ladder.reset();
        self.rc.reset();
    }

    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

/// Fixed-size history store, one record per channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct History<const CHANNELS: usize> {
    channels: [ChannelHistory; CHANNELS],
}

impl<const CHANNELS: usize> Default for History<CHANNELS> {
    fn default() -> Self {
        Self {
            channels: [ChannelHistory::default(); CHANNELS],
        }
    }
}

impl<const CHANNELS: usize> History<CHANNELS> {
    /// Zero every record, whatever topology is active
    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.clear();
        }
    }

    pub fn is_clear(&self) -> bool {
        self.channels.iter().all(ChannelHistory::is_clear)
    }

    /// # Panics
    ///
    /// Panics if `channel >= CHANNELS`.
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut ChannelHistory {
        &mut self.channels[channel]
    }

    /// # Panics
    ///
    /// Panics if `channel >= CHANNELS`.
    pub fn channel(&self, channel: usize) -> &ChannelHistory {
        &self.channels[channel]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biquad::BiquadCoeffs;
    use crate::ladder::LadderCoeffs;
    use crate::rc::{RcCoeffs, RcTap};

    #[test]
    fn test_clear_resets_all_topologies() {
        let mut history = History::<3>::default();
        assert!(history.is_clear());

        let biquad = BiquadCoeffs {
            b0: 1.0,
            ..Default::default()
        };
        let ladder = LadderCoeffs::design(1000.0, 1.0, 48000.0);
        let rc = RcCoeffs::design(1000.0, 1.0, 48000.0);
        for ch in 0..3 {
            let record = history.channel_mut(ch);
            record.biquad.process(0.5, &biquad);
            record.ladder.process(0.5, &ladder);
            record.rc.process(0.5, &rc, RcTap::BandPass);
        }
        assert!(!history.is_clear());

        history.clear();
        assert!(history.is_clear());

        // idempotent
        history.clear();
        assert!(history.is_clear());
    }
}

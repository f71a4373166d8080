//! Render engine - applies queued control commands at period boundaries
//!
//! The control thread never touches the filter directly. It sends
//! `FilterCommand`s over a bounded channel; the render side drains them with
//! `try_recv` before each period, so parameter changes land between periods
//! and nothing on the render path blocks.

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::effects::{Effect, FilterEffect};
use crate::family::FilterFamily;
use crate::filter::BasicFilter;
use crate::port::{AudioPort, BufferUsage, Frame};

/// Channel capacity, headroom for command bursts
const CHANNEL_CAPACITY: usize = 1024;

/// Commands sent to the render engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterCommand {
    SetFamily(FilterFamily),
    SetCutoff(f32),
    SetResonance(f32),
    SetParams { cutoff: f32, resonance: f32 },
    SetCascade(bool),
    SetEnabled(bool),
    ClearHistory,
    Shutdown,
}

/// Engine state as seen by the control side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSnapshot {
    pub family: FilterFamily,
    pub cascaded: bool,
    pub cutoff: f32,
    pub resonance: f32,
    pub enabled: bool,
    pub period: u64,
}

/// Events sent from the render engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterEvent {
    /// Levels of the period just rendered
    PeriodRendered { period: u64, peak: f32, rms: f32 },
    /// State after a batch of commands was applied
    StateUpdate(EngineSnapshot),
}

/// Render-side engine state (owned by the render thread)
pub struct FilterEngine<const CHANNELS: usize> {
    effect: FilterEffect<CHANNELS>,
    port: AudioPort<CHANNELS>,
    command_rx: Receiver<FilterCommand>,
    event_tx: Sender<FilterEvent>,
    period: u64,
}

impl<const CHANNELS: usize> FilterEngine<CHANNELS> {
    /// Create an engine with the filter enabled
    pub fn new(
        sample_rate: f32,
        frames_per_period: usize,
        command_rx: Receiver<FilterCommand>,
        event_tx: Sender<FilterEvent>,
    ) -> Self {
        let mut effect = FilterEffect::new(sample_rate);
        effect.set_enabled(true);
        Self {
            effect,
            port: AudioPort::new("filter out", frames_per_period),
            command_rx,
            event_tx,
            period: 0,
        }
    }

    pub fn filter(&self) -> &BasicFilter<CHANNELS> {
        self.effect.filter()
    }

    pub fn port(&self) -> &AudioPort<CHANNELS> {
        &self.port
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    /// Current state for the control side
    pub fn get_state(&self) -> EngineSnapshot {
        let filter = self.effect.filter();
        EngineSnapshot {
            family: filter.family(),
            cascaded: filter.is_cascaded(),
            cutoff: filter.frequency(),
            resonance: filter.resonance(),
            enabled: self.effect.is_enabled(),
            period: self.period,
        }
    }

    /// Apply every pending command.
    ///
    /// Cutoff and resonance changes are folded into one coefficient update.
    /// Returns `false` once `Shutdown` was received.
    pub fn drain_commands(&mut self) -> bool {
        let mut applied = 0usize;
        let mut params: Option<(f32, f32)> = None;
        let mut running = true;

        while let Ok(cmd) = self.command_rx.try_recv() {
            applied += 1;
            let filter = self.effect.filter_mut();
            let (cutoff, resonance) =
                params.unwrap_or((filter.requested_frequency(), filter.resonance()));

            match cmd {
                FilterCommand::SetCutoff(cutoff) => params = Some((cutoff, resonance)),
                FilterCommand::SetResonance(resonance) => params = Some((cutoff, resonance)),
                FilterCommand::SetParams { cutoff, resonance } => {
                    params = Some((cutoff, resonance))
                }
                FilterCommand::SetFamily(family) => {
                    tracing::debug!(%family, "filter family changed");
                    filter.set_family(family);
                }
                FilterCommand::SetCascade(enabled) => filter.set_cascade_enabled(enabled),
                FilterCommand::SetEnabled(enabled) => self.effect.set_enabled(enabled),
                FilterCommand::ClearHistory => self.effect.reset(),
                FilterCommand::Shutdown => {
                    running = false;
                    break;
                }
            }
        }

        if let Some((cutoff, resonance)) = params {
            self.effect
                .filter_mut()
                .calc_coefficients(cutoff, resonance);
        }

        if applied > 0 {
            let state = self.get_state();
            tracing::debug!(
                commands = applied,
                effect = self.effect.name(),
                family = %state.family,
                cutoff = state.cutoff,
                resonance = state.resonance,
                "applied filter commands"
            );
            let _ = self.event_tx.try_send(FilterEvent::StateUpdate(state));
        }

        running
    }

    /// Filter one period of frames through the port.
    ///
    /// Input beyond the port's period length is ignored.
    pub fn render_period(&mut self, input: &[Frame<CHANNELS>]) -> &[Frame<CHANNELS>] {
        self.port.next_period();

        let frames = input.len().min(self.port.frames_per_period());
        let buffer = &mut self.port.first_buffer_mut()[..frames];
        buffer.copy_from_slice(&input[..frames]);
        self.effect.process(buffer.as_flattened_mut());
        self.port.mark_used(BufferUsage::First);

        let (peak, sum_sq) = self.port.first_buffer()[..frames]
            .as_flattened()
            .iter()
            .fold((0.0f32, 0.0f32), |(peak, sum), &s| (peak.max(s.abs()), sum + s * s));
        let count = (frames * CHANNELS).max(1) as f32;
        let _ = self.event_tx.try_send(FilterEvent::PeriodRendered {
            period: self.period,
            peak,
            rms: (sum_sq / count).sqrt(),
        });
        self.period += 1;

        &self.port.first_buffer()[..frames]
    }
}

/// Handle to communicate with the render engine
pub struct EngineHandle {
    /// Send commands to the render thread
    pub command_tx: Sender<FilterCommand>,
    /// Receive events from the render thread
    pub event_rx: Receiver<FilterEvent>,
}

impl EngineHandle {
    /// Create channels for engine communication
    pub fn create_channels() -> (
        Sender<FilterCommand>,
        Receiver<FilterCommand>,
        Sender<FilterEvent>,
        Receiver<FilterEvent>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(CHANNEL_CAPACITY);
        let (evt_tx, evt_rx) = bounded(CHANNEL_CAPACITY);
        (cmd_tx, cmd_rx, evt_tx, evt_rx)
    }

    pub fn new(command_tx: Sender<FilterCommand>, event_rx: Receiver<FilterEvent>) -> Self {
        Self {
            command_tx,
            event_rx,
        }
    }

    /// Send a command without blocking; dropped (and logged) when the queue is full
    pub fn send(&self, cmd: FilterCommand) {
        if let Err(err) = self.command_tx.try_send(cmd) {
            tracing::warn!("dropped filter command: {}", err);
        }
    }

    /// Events received so far
    pub fn poll_events(&self) -> impl Iterator<Item = FilterEvent> + '_ {
        self.event_rx.try_iter()
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        self.send(FilterCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> (EngineHandle, FilterEngine<2>) {
        let (cmd_tx, cmd_rx, evt_tx, evt_rx) = EngineHandle::create_channels();
        let engine = FilterEngine::new(48000.0, 64, cmd_rx, evt_tx);
        (EngineHandle::new(cmd_tx, evt_rx), engine)
    }

    #[test]
    fn test_commands_apply_at_period_boundary() {
        let (handle, mut engine) = engine();
        handle.send(FilterCommand::SetFamily(FilterFamily::DoubleLowPass));
        handle.send(FilterCommand::SetCutoff(400.0));
        handle.send(FilterCommand::SetResonance(2.0));

        // nothing applied until the engine drains
        assert_eq!(engine.filter().frequency(), 1000.0);
        assert!(engine.drain_commands());

        let state = engine.get_state();
        assert_eq!(state.family, FilterFamily::LowPass);
        assert!(state.cascaded);
        assert_eq!(state.cutoff, 400.0);
        assert_eq!(state.resonance, 2.0);

        let events: Vec<_> = handle.poll_events().collect();
        assert_eq!(events, vec![FilterEvent::StateUpdate(state)]);
    }

    #[test]
    fn test_shutdown_stops_draining() {
        let (handle, mut engine) = engine();
        handle.send(FilterCommand::SetCutoff(300.0));
        handle.shutdown();
        handle.send(FilterCommand::SetCutoff(600.0));

        assert!(!engine.drain_commands());
        assert_eq!(engine.filter().frequency(), 300.0);
    }

    #[test]
    fn test_render_period_filters_and_reports() {
        let (handle, mut engine) = engine();
        handle.send(FilterCommand::SetParams {
            cutoff: 100.0,
            resonance: 0.707,
        });
        engine.drain_commands();
        let _ = handle.poll_events().count();

        let input: Vec<Frame<2>> = (0..64)
            .map(|i| if i % 2 == 0 { [0.5, 0.5] } else { [-0.5, -0.5] })
            .collect();
        let output = engine.render_period(&input).to_vec();

        assert_eq!(output.len(), 64);
        assert_eq!(engine.port().usage(), BufferUsage::First);
        assert_eq!(engine.period(), 1);
        assert!(output.iter().flatten().all(|s| s.is_finite()));

        let event = handle.poll_events().next();
        match event {
            Some(FilterEvent::PeriodRendered { period, peak, rms }) => {
                assert_eq!(period, 0);
                assert!(peak <= 0.5 && rms <= peak);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_short_input_renders_partial_period() {
        let (_handle, mut engine) = engine();
        let input = vec![[0.25f32, -0.25]; 10];
        assert_eq!(engine.render_period(&input).len(), 10);

        let long = vec![[0.0f32; 2]; 100];
        assert_eq!(engine.render_period(&long).len(), 64);
    }

    #[test]
    fn test_clear_history_command() {
        let (handle, mut engine) = engine();
        engine.render_period(&vec![[1.0f32, 1.0]; 64]);
        assert!(!engine.filter().primary_stage().history().is_clear());

        handle.send(FilterCommand::ClearHistory);
        engine.drain_commands();
        assert!(engine.filter().primary_stage().history().is_clear());
    }
}

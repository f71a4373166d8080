//! resofilter - offline render of the multi-family filter engine
//!
//! A render thread plays the role of the audio callback: it drains control
//! commands at each period boundary, filters a test tone and streams the
//! result through a lock-free ring. The main thread drives the cutoff sweep,
//! meters the rendered audio and finally prints the filter's magnitude
//! response.
//!
//! Usage: `resofilter [key=value ...]`, keys as in [`RenderConfig`].

mod config;

use std::thread;
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tracing_subscriber::EnvFilter;

use resofilter_analysis::{FrequencyResponse, LevelMeter, SineOscillator};
use resofilter_dsp::{
    BasicFilter, EngineHandle, FilterCommand, FilterEngine, FilterEvent, Frame,
};

use config::RenderConfig;

/// Stereo render
const CHANNELS: usize = 2;

/// Periods of audio the ring can hold before the render side drops samples
const RING_PERIODS: usize = 8;

/// Impulse response length used for the response table
const RESPONSE_LEN: usize = 8192;

/// Frequencies listed in the response table
const RESPONSE_POINTS: [f32; 10] = [
    50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0, 15000.0, 20000.0,
];

/// How long the control side waits for a period before giving up
const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .ok();

    let config = RenderConfig::from_args(std::env::args().skip(1))
        .context("failed to parse render configuration")?;
    tracing::info!(
        family = %config.family,
        cutoff = config.cutoff,
        resonance = config.resonance,
        sample_rate = config.sample_rate,
        periods = config.periods,
        "starting render"
    );

    let summary = render(&config)?;
    tracing::info!(
        periods = summary.periods,
        samples = summary.samples,
        peak_db = summary.meter.peak_db(),
        rms = summary.meter.rms(),
        "render complete"
    );

    print_response(&config)
}

/// Totals of one render run
struct RenderSummary {
    periods: usize,
    samples: usize,
    meter: LevelMeter,
}

/// Run the render thread against the control loop until every period is done
fn render(config: &RenderConfig) -> anyhow::Result<RenderSummary> {
    let (cmd_tx, cmd_rx, evt_tx, evt_rx) = EngineHandle::create_channels();
    let handle = EngineHandle::new(cmd_tx, evt_rx);

    // Initial state is queued so the first period already uses it
    handle.send(FilterCommand::SetFamily(config.family));
    handle.send(FilterCommand::SetParams {
        cutoff: config.cutoff_at(0),
        resonance: config.resonance,
    });

    let ring = HeapRb::<f32>::new(config.period_frames * CHANNELS * RING_PERIODS);
    let (producer, mut consumer) = ring.split();

    let render_config = config.clone();
    let render_handle = thread::Builder::new()
        .name("render".into())
        .spawn(move || run_render_thread(render_config, cmd_rx, evt_tx, producer))
        .context("failed to spawn render thread")?;

    let mut summary = RenderSummary {
        periods: 0,
        samples: 0,
        meter: LevelMeter::new(),
    };
    let mut scratch = vec![0.0f32; config.period_frames * CHANNELS];
    let result = run_control(config, &handle, &mut consumer, &mut scratch, &mut summary);

    // Stop the render thread whatever happened on this side
    handle.shutdown();
    if render_handle.join().is_err() {
        anyhow::bail!("render thread panicked");
    }
    result?;

    // The last period is pushed after its event was sent
    summary.samples += drain_ring(&mut consumer, &mut scratch, &mut summary.meter);
    Ok(summary)
}

fn run_render_thread(
    config: RenderConfig,
    cmd_rx: Receiver<FilterCommand>,
    evt_tx: Sender<FilterEvent>,
    mut producer: HeapProd<f32>,
) {
    let mut engine =
        FilterEngine::<CHANNELS>::new(config.sample_rate, config.period_frames, cmd_rx, evt_tx);
    let mut osc = SineOscillator::new(config.tone_hz, config.sample_rate)
        .with_amplitude(config.amplitude);

    // Pre-allocated period buffers
    let mut tone = vec![0.0f32; config.period_frames];
    let mut input: Vec<Frame<CHANNELS>> = vec![[0.0; CHANNELS]; config.period_frames];
    let period_duration =
        Duration::from_secs_f32(config.period_frames as f32 / config.sample_rate);
    tracing::debug!(
        port = engine.port().name(),
        tone_hz = osc.frequency(),
        "render thread started"
    );

    for _ in 0..config.periods {
        if !engine.drain_commands() {
            tracing::info!("render thread shutting down");
            return;
        }

        osc.fill(&mut tone);
        for (frame, &sample) in input.iter_mut().zip(&tone) {
            *frame = [sample; CHANNELS];
        }

        let output = engine.render_period(&input).as_flattened();
        let written = producer.push_slice(output);
        if written < output.len() {
            tracing::warn!(dropped = output.len() - written, "sample ring full");
        }

        // Pace like a device clock so control changes spread over the sweep
        thread::sleep(period_duration);
    }

    tracing::debug!(periods = engine.period(), "render finished");
}

/// Pop everything currently in the ring into `meter`, returning the sample count
fn drain_ring(
    consumer: &mut HeapCons<f32>,
    scratch: &mut [f32],
    meter: &mut LevelMeter,
) -> usize {
    let mut total = 0;
    loop {
        let read = consumer.pop_slice(scratch);
        if read == 0 {
            return total;
        }
        meter.update(&scratch[..read]);
        total += read;
    }
}

fn run_control(
    config: &RenderConfig,
    handle: &EngineHandle,
    consumer: &mut HeapCons<f32>,
    scratch: &mut [f32],
    summary: &mut RenderSummary,
) -> anyhow::Result<()> {
    let report_every = (config.periods / 10).max(1);

    while summary.periods < config.periods {
        let event = match handle.event_rx.recv_timeout(EVENT_TIMEOUT) {
            Ok(event) => event,
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                anyhow::bail!("render thread stalled after {} periods", summary.periods)
            }
        };

        match event {
            FilterEvent::PeriodRendered { period, peak, rms } => {
                summary.periods += 1;
                summary.samples += drain_ring(consumer, scratch, &mut summary.meter);

                if period as usize % report_every == 0 {
                    tracing::info!(
                        period,
                        cutoff = config.cutoff_at(period as usize),
                        peak_db = 20.0 * peak.max(1e-6).log10(),
                        rms,
                        "rendered"
                    );
                }

                if config.sweep_to.is_some() {
                    handle.send(FilterCommand::SetCutoff(config.cutoff_at(summary.periods)));
                }
            }
            FilterEvent::StateUpdate(state) => {
                tracing::debug!(
                    family = %state.family,
                    cascaded = state.cascaded,
                    cutoff = state.cutoff,
                    resonance = state.resonance,
                    "engine state"
                );
            }
        }
    }

    Ok(())
}

/// Print the magnitude response at the final cutoff
fn print_response(config: &RenderConfig) -> anyhow::Result<()> {
    let mut filter = BasicFilter::<1>::try_new(config.sample_rate)?;
    filter.set_family(config.family);
    filter.calc_coefficients(config.cutoff_at(config.periods), config.resonance);

    let response =
        FrequencyResponse::measure(|x| filter.process(x, 0), RESPONSE_LEN, config.sample_rate)
            .context("failed to measure frequency response")?;

    println!(
        "{} @ {:.1} Hz, resonance {:.3}",
        config.family,
        filter.frequency(),
        filter.resonance()
    );
    println!("{:>10}  {:>9}", "freq (Hz)", "gain (dB)");
    let nyquist = config.sample_rate / 2.0;
    for freq in RESPONSE_POINTS.iter().copied().filter(|&f| f < nyquist) {
        println!("{:>10.0}  {:>9.2}", freq, response.magnitude_db_at(freq));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_meters_every_period() {
        let config = RenderConfig::from_args([
            "family=moog",
            "period_frames=64",
            "periods=12",
            "sweep_to=4000",
        ])
        .unwrap();
        let summary = render(&config).unwrap();

        assert_eq!(summary.periods, 12);
        assert_eq!(summary.samples, 12 * 64 * CHANNELS);
        assert!(summary.meter.peak() > 0.0);
        assert!(summary.meter.rms().is_finite());
    }

    #[test]
    fn test_drain_ring_empties_consumer() {
        let ring = HeapRb::<f32>::new(32);
        let (mut producer, mut consumer) = ring.split();
        assert_eq!(producer.push_slice(&[0.5; 20]), 20);

        let mut meter = LevelMeter::new();
        let mut scratch = [0.0f32; 8];
        assert_eq!(drain_ring(&mut consumer, &mut scratch, &mut meter), 20);
        assert_eq!(meter.peak(), 0.5);
        assert_eq!(drain_ring(&mut consumer, &mut scratch, &mut meter), 0);
    }
}

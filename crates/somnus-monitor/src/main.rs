//! Desktop host for the somnus bedroom monitor.
//!
//! Runs the full pipeline against simulated sensors: one thread per sensor
//! source, one drain thread per quantity, a scoring thread and a reporter
//! that logs every score with its advisories.
//!
//! # Environment
//!
//! | Variable          | Meaning                                         |
//! |-------------------|-------------------------------------------------|
//! | `SOMNUS_CONFIG`   | Path to a JSON [`MonitorConfig`] (optional)     |
//! | `SOMNUS_RUN_SECS` | Stop after this many seconds (runs forever if unset) |
//! | `RUST_LOG`        | `env_logger` filter, e.g. `info` or `debug`     |

mod drivers;
mod ticker;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use thiserror::Error;

use somnus_core::sensors::{
    ClimateIndexed, ClimateSensor, LightIndexed, LightSensor, LoudnessIndexed, LoudnessSensor,
};
use somnus_core::{AppState, ConfigError, MonitorConfig, MonitorEvent, Quantity};

use drivers::{SimulatedClimateProbe, SimulatedLightMeter, SimulatedMicrophone};
use ticker::IntervalTicker;

const CONFIG_ENV: &str = "SOMNUS_CONFIG";
const RUN_SECS_ENV: &str = "SOMNUS_RUN_SECS";

/// How often the reporter checks for new events.
const REPORT_POLL_INTERVAL: Duration = Duration::from_millis(200);

// Scheduled failure rates of the simulated drivers (one in N reads).
const MICROPHONE_FAIL_EVERY: u32 = 17;
const LIGHT_FAIL_EVERY: u32 = 29;
const CLIMATE_FAIL_EVERY: u32 = 23;

#[derive(Error, Debug)]
enum MonitorError {
    #[error("cannot read config file {path:?}: {source}")]
    ConfigFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    ConfigFormat(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Config(ConfigError),
    #[error("SOMNUS_RUN_SECS must be a whole number of seconds (got {0:?})")]
    RunDuration(String),
}

impl From<ConfigError> for MonitorError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn parse_config(json: &str) -> Result<MonitorConfig, MonitorError> {
    let config: MonitorConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate the config at `path`, or the defaults without one.
fn load_config(path: Option<&Path>) -> Result<MonitorConfig, MonitorError> {
    let Some(path) = path else {
        info!("{} not set, using default configuration", CONFIG_ENV);
        return Ok(MonitorConfig::default());
    };

    let json = fs::read_to_string(path).map_err(|source| MonitorError::ConfigFile {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&json)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn parse_run_duration(value: Option<String>) -> Result<Option<Duration>, MonitorError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| MonitorError::RunDuration(raw))
        })
        .transpose()
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

fn report(event: &MonitorEvent) {
    match event {
        MonitorEvent::Aggregated { quantity, point } => match point.value {
            Some(value) => debug!(
                "{} at {}s: {:.1} {}",
                quantity,
                point.timestamp,
                value,
                quantity.unit()
            ),
            None => debug!("{} at {}s: no data", quantity, point.timestamp),
        },
        MonitorEvent::Scored { timestamp, report } => {
            info!("Sleep quality at {}s: {:.2}", timestamp, report.score);
            for quantity in Quantity::ALL {
                debug!(
                    "  {:<12} avg {:>6.1} {:<3} sub-score {:.1}",
                    quantity.label(),
                    report.averages.get(quantity),
                    quantity.unit(),
                    report.sub_scores.get(quantity)
                );
            }
            if report.advisories.is_empty() {
                info!("  No advisories");
            }
            for advisory in &report.advisories {
                warn!("  [{}] {}", advisory.urgency.label(), advisory);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn run() -> Result<(), MonitorError> {
    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;
    let run_for = parse_run_duration(std::env::var(RUN_SECS_ENV).ok())?;

    let state = AppState::new(config)?;
    let config = *state.config();

    let started = Instant::now();
    let deadline = run_for.map(|duration| started + duration);
    match run_for {
        Some(duration) => info!("Running for {}s", duration.as_secs()),
        None => info!("Running until interrupted"),
    }

    let sample_ticker = || IntervalTicker::from_millis(started, config.sample_period_ms, deadline);

    let mut reporter = state.subscribe();
    let workers_done = AtomicBool::new(false);

    thread::scope(|scope| {
        let mut workers = Vec::new();

        let mut loudness = state.source(LoudnessIndexed::from(LoudnessSensor::new(
            SimulatedMicrophone::new(MICROPHONE_FAIL_EVERY),
        )));
        let ticker = sample_ticker();
        workers.push(scope.spawn(move || {
            loudness.run(ticker);
        }));

        let mut light = state.source(LightIndexed::from(LightSensor::new(
            SimulatedLightMeter::new(LIGHT_FAIL_EVERY),
        )));
        let ticker = sample_ticker();
        workers.push(scope.spawn(move || {
            light.run(ticker);
        }));

        let mut climate = state.source(ClimateIndexed::from(ClimateSensor::new(
            SimulatedClimateProbe::new(CLIMATE_FAIL_EVERY),
        )));
        let ticker = sample_ticker();
        workers.push(scope.spawn(move || {
            climate.run(ticker);
        }));

        for quantity in Quantity::ALL {
            let aggregator = state.aggregator();
            let ticker = IntervalTicker::from_millis(
                started,
                config.drain_periods.for_quantity(quantity),
                deadline,
            );
            workers.push(scope.spawn(move || {
                aggregator.run(quantity, ticker);
            }));
        }

        let state = &state;
        let ticker = IntervalTicker::from_millis(started, config.score_period_ms, deadline);
        workers.push(scope.spawn(move || {
            state.run_scoring(ticker);
        }));

        if let Some(mut subscriber) = reporter.take() {
            let workers_done = &workers_done;
            scope.spawn(move || {
                loop {
                    while let Some(event) = subscriber.try_next_message_pure() {
                        report(&event);
                    }
                    if workers_done.load(Ordering::Acquire) {
                        break;
                    }
                    thread::sleep(REPORT_POLL_INTERVAL);
                }
            });
        }

        for worker in workers {
            if worker.join().is_err() {
                error!("A monitor thread panicked");
            }
        }
        workers_done.store(true, Ordering::Release);
    });

    for quantity in Quantity::ALL {
        match state.series_stats(quantity) {
            Some(stats) => info!(
                "{}: {} points, min {:.1} / mean {:.1} / max {:.1} {}",
                quantity,
                state.history().len(quantity),
                stats.min,
                stats.mean,
                stats.max,
                quantity.unit()
            ),
            None => info!("{}: no data recorded", quantity),
        }
    }
    info!("Recorded {} scores", state.history().scores().len());
    Ok(())
}

fn main() {
    env_logger::init();
    info!("Starting somnus monitor");

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Monitor exiting");
}

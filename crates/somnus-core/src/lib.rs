//! Hardware-independent core library for somnus
//!
//! This crate contains the platform-agnostic part of the somnus bedroom
//! monitor: sensor capability traits, the shared raw-sample buffer, the
//! periodic aggregator, the append-only history, and the sleep-quality
//! scorer that turns recent history into a score plus advisories.
//!
//! It is `no_std` with `extern crate alloc` so it compiles on both embedded
//! targets and desktop hosts (for the monitor binary and tests). Shared state
//! is guarded by `embassy-sync` critical-section mutexes, so the host needs a
//! `critical-section` implementation linked in (the `std` feature).

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod app_state;
pub mod config;
pub mod metrics;
pub mod sampling;
pub mod sensors;
pub mod storage;
pub mod ticker;

pub use app_state::{AppState, MonitorEvent};
pub use config::{ConfigError, MonitorConfig};
pub use metrics::{Advisory, AdvisoryKind, QualityReport, QualityScorer, Urgency};
pub use sensors::{Quantity, SensorError};
pub use storage::{AggregatedPoint, Aggregator, HistoryStore, RawSample, SampleBuffer};
pub use ticker::Ticker;

//! Raw-sample buffering, aggregation and in-memory history.
//!
//! Data moves through three stages:
//! - [`SampleBuffer`]: unaggregated raw samples per quantity, appended by the
//!   sampling loops
//! - [`Aggregator`]: drains one quantity's buffer per tick into a single mean
//! - [`HistoryStore`]: append-only series of those means, read by the scorer
//!   and by presentation code
//!
//! Nothing here is persisted; history lives as long as the process.

pub mod aggregator;
pub mod buffer;
pub mod history;

pub use aggregator::Aggregator;
pub use buffer::SampleBuffer;
pub use history::{HistoryStore, ScorePoint, SeriesStats};

use crate::sensors::Quantity;

/// One raw reading waiting in the buffer.
///
/// `value` is `None` when a sample is recorded without data; such entries
/// are ignored by the mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub quantity: Quantity,
    pub value: Option<f32>,
}

impl RawSample {
    pub const fn reading(quantity: Quantity, value: f32) -> Self {
        Self {
            quantity,
            value: Some(value),
        }
    }

    pub const fn missing(quantity: Quantity) -> Self {
        Self {
            quantity,
            value: None,
        }
    }
}

/// Result of one drain: the mean of the drained samples, or no data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatedPoint {
    /// Seconds since the monitor started when the drain happened
    pub timestamp: u32,
    /// Mean rounded to one decimal, `None` if the drain had no usable samples
    pub value: Option<f32>,
}

impl AggregatedPoint {
    pub const fn new(timestamp: u32, value: Option<f32>) -> Self {
        Self { timestamp, value }
    }

    pub const fn no_data(timestamp: u32) -> Self {
        Self::new(timestamp, None)
    }

    pub const fn has_data(&self) -> bool {
        self.value.is_some()
    }
}

/// Round to one decimal place, halves away from zero.
pub fn round_tenths(value: f32) -> f32 {
    libm::roundf(value * 10.0) / 10.0
}

/// Mean over the samples that carry a value, rounded to one decimal.
///
/// Returns `None` for an empty slice or one holding only missing values.
pub fn mean(samples: &[RawSample]) -> Option<f32> {
    let (sum, count) = samples
        .iter()
        .filter_map(|s| s.value)
        .fold((0.0f64, 0u32), |(sum, count), v| (sum + v as f64, count + 1));

    if count == 0 {
        return None;
    }
    Some(round_tenths((sum / count as f64) as f32))
}

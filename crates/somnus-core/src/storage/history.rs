use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::warn;

extern crate alloc;
use alloc::vec::Vec;

use super::AggregatedPoint;
use crate::sensors::Quantity;

/// A composite score recorded into history by the scoring tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePoint {
    pub timestamp: u32,
    pub score: f32,
}

/// Min/max/mean over a series, ignoring points without data.
///
/// Used by presentation code to annotate charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    /// Number of points that carried data
    pub count: usize,
}

impl SeriesStats {
    pub fn from_points(points: &[AggregatedPoint]) -> Option<Self> {
        let mut sum = 0.0f64;
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        let mut count = 0usize;

        for value in points.iter().filter_map(|p| p.value) {
            sum += value as f64;
            min = min.min(value);
            max = max.max(value);
            count += 1;
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            min,
            max,
            mean: (sum / count as f64) as f32,
            count,
        })
    }
}

struct Series {
    points: [Vec<AggregatedPoint>; Quantity::COUNT],
    scores: Vec<ScorePoint>,
}

/// Append-only, in-memory history of aggregated points per quantity.
///
/// Writers only ever push to the end; readers get copies, so a reader racing
/// an append sees either the old or the new series, never a torn one.
pub struct HistoryStore {
    series: Mutex<CriticalSectionRawMutex, RefCell<Series>>,
}

impl HistoryStore {
    pub const fn new() -> Self {
        Self {
            series: Mutex::new(RefCell::new(Series {
                points: [Vec::new(), Vec::new(), Vec::new(), Vec::new()],
                scores: Vec::new(),
            })),
        }
    }

    /// Append one point to the end of `quantity`'s series.
    pub fn append(&self, quantity: Quantity, point: AggregatedPoint) {
        self.series.lock(|series| {
            let mut series = series.borrow_mut();
            let points = &mut series.points[quantity.index()];
            if let Some(last) = points.last() {
                if point.timestamp < last.timestamp {
                    warn!(
                        "{}: point at {} appended after {}",
                        quantity, point.timestamp, last.timestamp
                    );
                }
            }
            points.push(point);
        });
    }

    /// The last `k` points of `quantity`, oldest first. Fewer if the series
    /// is shorter.
    pub fn tail(&self, quantity: Quantity, k: usize) -> Vec<AggregatedPoint> {
        self.series.lock(|series| {
            let series = series.borrow();
            let points = &series.points[quantity.index()];
            points[points.len().saturating_sub(k)..].to_vec()
        })
    }

    /// The full series of `quantity`, oldest first.
    pub fn all(&self, quantity: Quantity) -> Vec<AggregatedPoint> {
        self.series
            .lock(|series| series.borrow().points[quantity.index()].clone())
    }

    pub fn len(&self, quantity: Quantity) -> usize {
        self.series
            .lock(|series| series.borrow().points[quantity.index()].len())
    }

    pub fn is_empty(&self, quantity: Quantity) -> bool {
        self.len(quantity) == 0
    }

    pub fn last(&self, quantity: Quantity) -> Option<AggregatedPoint> {
        self.series
            .lock(|series| series.borrow().points[quantity.index()].last().copied())
    }

    /// Chart annotations for the whole series of `quantity`.
    pub fn stats(&self, quantity: Quantity) -> Option<SeriesStats> {
        self.series.lock(|series| {
            SeriesStats::from_points(&series.borrow().points[quantity.index()])
        })
    }

    pub fn record_score(&self, timestamp: u32, score: f32) {
        self.series.lock(|series| {
            series
                .borrow_mut()
                .scores
                .push(ScorePoint { timestamp, score });
        });
    }

    /// Every recorded score, oldest first.
    pub fn scores(&self) -> Vec<ScorePoint> {
        self.series.lock(|series| series.borrow().scores.clone())
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

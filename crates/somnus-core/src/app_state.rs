//! Application-wide state for somnus
//!
//! [`AppState`] owns everything the pipeline shares: the raw-sample buffer,
//! the history, the configuration and the event channel. Components borrow
//! from it instead of reaching for globals, so a test can build as many
//! independent states as it likes.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pubsub::{ImmediatePublisher, PubSubChannel, Subscriber};
use log::info;

extern crate alloc;
use alloc::vec::Vec;

use crate::config::{ConfigError, MonitorConfig};
use crate::metrics::{QualityReport, QualityScorer};
use crate::sampling::SensorSource;
use crate::sensors::{IndexedSensor, Quantity, Sensor};
use crate::storage::{AggregatedPoint, Aggregator, HistoryStore, SampleBuffer, SeriesStats};
use crate::ticker::Ticker;

/// Channel capacity for pub-sub events
/// Set to 8 to absorb a full round of drains plus a score without lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 8;

/// Number of subscribers that can listen to monitor events
pub const EVENT_SUBSCRIBERS: usize = 2;

/// Number of non-immediate publishers. Aggregator and scorer publish
/// through immediate publishers, which are not counted.
pub const EVENT_PUBLISHERS: usize = 1;

/// Events published as history grows
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// A drain appended a point to a quantity's history
    Aggregated {
        quantity: Quantity,
        point: AggregatedPoint,
    },
    /// A scoring tick produced a report
    Scored { timestamp: u32, report: QualityReport },
}

pub type EventChannel = PubSubChannel<
    CriticalSectionRawMutex,
    MonitorEvent,
    EVENT_CHANNEL_CAPACITY,
    EVENT_SUBSCRIBERS,
    EVENT_PUBLISHERS,
>;

pub type EventPublisher<'a> = ImmediatePublisher<
    'a,
    CriticalSectionRawMutex,
    MonitorEvent,
    EVENT_CHANNEL_CAPACITY,
    EVENT_SUBSCRIBERS,
    EVENT_PUBLISHERS,
>;

pub type EventSubscriber<'a> = Subscriber<
    'a,
    CriticalSectionRawMutex,
    MonitorEvent,
    EVENT_CHANNEL_CAPACITY,
    EVENT_SUBSCRIBERS,
    EVENT_PUBLISHERS,
>;

/// Main application state container
pub struct AppState {
    config: MonitorConfig,
    buffer: SampleBuffer,
    history: HistoryStore,
    events: EventChannel,
}

impl AppState {
    /// Create a state with empty buffer and history.
    pub fn new(config: MonitorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            buffer: SampleBuffer::new(),
            history: HistoryStore::new(),
            events: PubSubChannel::new(),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Aggregator over this state's buffer and history, publishing drains.
    pub fn aggregator(&self) -> Aggregator<'_> {
        Aggregator::new(&self.buffer, &self.history).with_publisher(self.events.immediate_publisher())
    }

    pub fn scorer(&self) -> QualityScorer {
        QualityScorer::from_config(&self.config)
    }

    /// Sampling loop feeding this state's buffer.
    pub fn source<S, const START: usize, const COUNT: usize>(
        &self,
        sensor: IndexedSensor<S, START, COUNT>,
    ) -> SensorSource<'_, S, START, COUNT>
    where
        S: Sensor<COUNT>,
    {
        SensorSource::new(sensor, &self.buffer)
    }

    /// Subscribe to drain and score events. `None` once every subscriber
    /// slot is taken.
    pub fn subscribe(&self) -> Option<EventSubscriber<'_>> {
        self.events.subscriber().ok()
    }

    /// The last `k` points of `quantity`, oldest first.
    pub fn tail(&self, quantity: Quantity, k: usize) -> Vec<AggregatedPoint> {
        self.history.tail(quantity, k)
    }

    /// The full history of `quantity`, oldest first.
    pub fn series(&self, quantity: Quantity) -> Vec<AggregatedPoint> {
        self.history.all(quantity)
    }

    pub fn series_stats(&self, quantity: Quantity) -> Option<SeriesStats> {
        self.history.stats(quantity)
    }

    /// Score the current history on demand. Nothing is recorded.
    pub fn current_score(&self) -> QualityReport {
        self.scorer().score(&self.history)
    }

    /// Score the current history, record the score and publish the report.
    pub fn score_tick(&self, timestamp: u32) -> QualityReport {
        let report = self.current_score();
        self.history.record_score(timestamp, report.score);
        self.events
            .immediate_publisher()
            .publish_immediate(MonitorEvent::Scored {
                timestamp,
                report: report.clone(),
            });
        report
    }

    /// Run [`AppState::score_tick`] once per tick until the ticker stops.
    pub fn run_scoring<T: Ticker>(&self, mut ticker: T) -> u32 {
        let mut ticks = 0;
        while let Some(timestamp) = ticker.next_tick() {
            let report = self.score_tick(timestamp);
            info!(
                "Sleep quality at {}s: {:.2} ({} advisories)",
                timestamp,
                report.score,
                report.advisories.len()
            );
            ticks += 1;
        }
        ticks
    }
}

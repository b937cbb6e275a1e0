use log::{debug, info, warn};

use super::{AggregatedPoint, HistoryStore, SampleBuffer, mean};
use crate::app_state::{EventPublisher, MonitorEvent};
use crate::sensors::Quantity;
use crate::ticker::Ticker;

/// Turns buffered raw samples into one history point per drain.
///
/// Every drain appends exactly one point, even when nothing was buffered,
/// so a quantity's history length always equals its number of drains.
/// Drained points are also published to event subscribers when a publisher
/// is attached.
///
/// ## Usage
///
/// ```rust,ignore
/// let aggregator = Aggregator::new(&buffer, &history);
///
/// // Every 10 seconds, per quantity
/// aggregator.drain(Quantity::Loudness, now_secs);
/// ```
pub struct Aggregator<'a> {
    buffer: &'a SampleBuffer,
    history: &'a HistoryStore,
    publisher: Option<EventPublisher<'a>>,
}

impl<'a> Aggregator<'a> {
    pub fn new(buffer: &'a SampleBuffer, history: &'a HistoryStore) -> Self {
        Self {
            buffer,
            history,
            publisher: None,
        }
    }

    /// Publish every drained point to the given event channel.
    pub fn with_publisher(mut self, publisher: EventPublisher<'a>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Drain `quantity`'s buffer, append the mean to history and return it.
    pub fn drain(&self, quantity: Quantity, timestamp: u32) -> AggregatedPoint {
        let samples = self.buffer.drain(quantity);
        let point = AggregatedPoint::new(timestamp, mean(&samples));

        match point.value {
            Some(value) => debug!(
                "{}: {} samples -> {} {} at {}s",
                quantity,
                samples.len(),
                value,
                quantity.unit(),
                timestamp
            ),
            None => warn!(
                "{}: no usable samples at {}s ({} buffered)",
                quantity,
                timestamp,
                samples.len()
            ),
        }

        self.history.append(quantity, point);

        if let Some(publisher) = &self.publisher {
            publisher.publish_immediate(MonitorEvent::Aggregated { quantity, point });
        }

        point
    }

    /// Drain every quantity at the same timestamp.
    pub fn drain_all(&self, timestamp: u32) -> [AggregatedPoint; Quantity::COUNT] {
        Quantity::ALL.map(|quantity| self.drain(quantity, timestamp))
    }

    /// Drain `quantity` once per tick until the ticker stops.
    ///
    /// Returns the number of drains performed.
    pub fn run<T: Ticker>(&self, quantity: Quantity, mut ticker: T) -> u32 {
        let mut drains = 0;
        while let Some(timestamp) = ticker.next_tick() {
            self.drain(quantity, timestamp);
            drains += 1;
        }
        info!("{} aggregation stopped after {} drains", quantity, drains);
        drains
    }
}

//! Sampling loops feeding the shared buffer.

use log::{error, info};

use crate::sensors::{IndexedSensor, Sensor, SensorError};
use crate::storage::SampleBuffer;
use crate::ticker::Ticker;

/// Read counters of one sampling loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub successful_reads: u32,
    pub failed_reads: u32,
}

/// Repeatedly reads one sensor and appends its values to the buffer.
///
/// A failed read is logged and skipped; nothing is appended for it, so it
/// never stalls or corrupts other quantities.
pub struct SensorSource<'a, S, const START: usize, const COUNT: usize>
where
    S: Sensor<COUNT>,
{
    sensor: IndexedSensor<S, START, COUNT>,
    buffer: &'a SampleBuffer,
    stats: SourceStats,
}

impl<'a, S, const START: usize, const COUNT: usize> SensorSource<'a, S, START, COUNT>
where
    S: Sensor<COUNT>,
{
    pub fn new(sensor: IndexedSensor<S, START, COUNT>, buffer: &'a SampleBuffer) -> Self {
        Self {
            sensor,
            buffer,
            stats: SourceStats::default(),
        }
    }

    /// One loop iteration: read, then append on success.
    pub fn poll(&mut self) -> Result<(), SensorError> {
        match self.sensor.read_into(self.buffer) {
            Ok(()) => {
                self.stats.successful_reads = self.stats.successful_reads.saturating_add(1);
                Ok(())
            }
            Err(e) => {
                self.stats.failed_reads = self.stats.failed_reads.saturating_add(1);
                error!(
                    "{}: skipping sample ({} failures so far): {}",
                    self.sensor.name(),
                    self.stats.failed_reads,
                    e
                );
                Err(e)
            }
        }
    }

    /// Poll once per tick until the ticker stops.
    pub fn run<T: Ticker>(&mut self, mut ticker: T) -> SourceStats {
        info!(
            "{}: sampling {:?}",
            self.sensor.name(),
            IndexedSensor::<S, START, COUNT>::quantities()
        );
        while ticker.next_tick().is_some() {
            // Failures are already logged and counted.
            let _ = self.poll();
        }
        info!(
            "{}: sampling stopped ({} ok, {} failed)",
            self.sensor.name(),
            self.stats.successful_reads,
            self.stats.failed_reads
        );
        self.stats
    }

    pub fn stats(&self) -> SourceStats {
        self.stats
    }
}

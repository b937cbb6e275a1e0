//! Wall-clock ticker for the monitor threads.

use std::thread;
use std::time::{Duration, Instant};

use somnus_core::Ticker;

/// Sleeps until each multiple of `period` after `started`.
///
/// All tickers built from the same `started` instant report timestamps on a
/// common clock. Ticks are scheduled from the start, so a slow iteration
/// does not push later ticks back. Stops once the next tick would land past
/// `deadline`.
pub struct IntervalTicker {
    started: Instant,
    period: Duration,
    ticks: u32,
    deadline: Option<Instant>,
}

impl IntervalTicker {
    pub fn new(started: Instant, period: Duration, deadline: Option<Instant>) -> Self {
        Self {
            started,
            period,
            ticks: 0,
            deadline,
        }
    }

    pub fn from_millis(started: Instant, period_ms: u32, deadline: Option<Instant>) -> Self {
        Self::new(started, Duration::from_millis(period_ms.into()), deadline)
    }

    fn next_instant(&self) -> Option<Instant> {
        let offset = self.period.checked_mul(self.ticks.checked_add(1)?)?;
        self.started.checked_add(offset)
    }
}

impl Ticker for IntervalTicker {
    fn next_tick(&mut self) -> Option<u32> {
        let next = self.next_instant()?;
        if self.deadline.is_some_and(|deadline| next > deadline) {
            return None;
        }

        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        }
        self.ticks += 1;

        let elapsed = next.duration_since(self.started).as_secs();
        Some(u32::try_from(elapsed).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_the_deadline() {
        let started = Instant::now();
        let deadline = started + Duration::from_millis(35);
        let mut ticker = IntervalTicker::new(started, Duration::from_millis(10), Some(deadline));

        let mut ticks = 0;
        while ticker.next_tick().is_some() {
            ticks += 1;
        }
        assert_eq!(ticks, 3);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn timestamps_are_whole_seconds_since_start() {
        // A start in the past makes every tick due immediately.
        let started = Instant::now() - Duration::from_secs(5);
        let mut ticker = IntervalTicker::new(started, Duration::from_millis(1_500), None);

        assert_eq!(ticker.next_tick(), Some(1));
        assert_eq!(ticker.next_tick(), Some(3));
        assert_eq!(ticker.next_tick(), Some(4));
    }
}

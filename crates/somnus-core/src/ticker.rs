//! Periodic trigger capability.
//!
//! Sampling, aggregation and scoring are plain methods; a [`Ticker`] decides
//! when they run. The host binary supplies a sleeping interval ticker, tests
//! use [`ManualTicker`].

/// Source of periodic ticks.
pub trait Ticker {
    /// Block until the next tick and return its timestamp in seconds since
    /// the monitor started. `None` stops the loop being driven.
    fn next_tick(&mut self) -> Option<u32>;
}

impl<T: Ticker + ?Sized> Ticker for &mut T {
    fn next_tick(&mut self) -> Option<u32> {
        (**self).next_tick()
    }
}

/// A finite ticker that returns immediately.
///
/// Yields `ticks` timestamps spaced `period_secs` apart, starting at
/// `period_secs`.
#[derive(Debug, Clone)]
pub struct ManualTicker {
    period_secs: u32,
    remaining: u32,
    now: u32,
}

impl ManualTicker {
    pub const fn new(period_secs: u32, ticks: u32) -> Self {
        Self {
            period_secs,
            remaining: ticks,
            now: 0,
        }
    }

    /// Ticks left before the ticker stops.
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl Ticker for ManualTicker {
    fn next_tick(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.now = self.now.saturating_add(self.period_secs);
        Some(self.now)
    }
}

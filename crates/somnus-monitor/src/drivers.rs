//! Simulated sensor drivers.
//!
//! Each driver produces a slow sinusoid around a plausible bedroom value and
//! fails on a fixed schedule, so the skip-on-failure path is exercised on
//! every run.

use somnus_core::sensors::{PairDriver, ScalarDriver};
use somnus_core::SensorError;

/// Read counter shared by the simulated drivers.
#[derive(Debug, Default)]
struct Schedule {
    reads: u32,
    fail_every: u32,
}

impl Schedule {
    fn new(fail_every: u32) -> Self {
        Self {
            reads: 0,
            fail_every,
        }
    }

    /// Advance one read. Returns the read index, or `None` when this read is
    /// scheduled to fail.
    fn advance(&mut self) -> Option<f64> {
        self.reads = self.reads.wrapping_add(1);
        if self.fail_every != 0 && self.reads % self.fail_every == 0 {
            None
        } else {
            Some(self.reads as f64)
        }
    }
}

/// Microphone level in dB: quiet room with occasional traffic swells.
pub struct SimulatedMicrophone {
    schedule: Schedule,
}

impl SimulatedMicrophone {
    pub fn new(fail_every: u32) -> Self {
        Self {
            schedule: Schedule::new(fail_every),
        }
    }
}

impl ScalarDriver for SimulatedMicrophone {
    fn read(&mut self) -> Result<f32, SensorError> {
        let t = self.schedule.advance().ok_or(SensorError::ReadFailed {
            sensor: "microphone",
            operation: "sample",
            details: "ADC conversion timed out",
        })?;
        let level = 27.0 + 6.0 * (t / 45.0).sin() + 2.0 * (t / 7.0).cos();
        Ok(level as f32)
    }
}

/// Ambient light in lux: dark room with a slowly brightening window.
pub struct SimulatedLightMeter {
    schedule: Schedule,
}

impl SimulatedLightMeter {
    pub fn new(fail_every: u32) -> Self {
        Self {
            schedule: Schedule::new(fail_every),
        }
    }
}

impl ScalarDriver for SimulatedLightMeter {
    fn read(&mut self) -> Result<f32, SensorError> {
        let t = self
            .schedule
            .advance()
            .ok_or(SensorError::Disconnected { sensor: "light meter" })?;
        let lux = 6.0 + 5.0 * (t / 120.0).sin() + 0.5 * (t / 11.0).cos();
        Ok(lux.max(0.0) as f32)
    }
}

/// Combined temperature (°C) and relative humidity (%) probe.
pub struct SimulatedClimateProbe {
    schedule: Schedule,
}

impl SimulatedClimateProbe {
    pub fn new(fail_every: u32) -> Self {
        Self {
            schedule: Schedule::new(fail_every),
        }
    }
}

impl PairDriver for SimulatedClimateProbe {
    fn read_pair(&mut self) -> Result<(f32, f32), SensorError> {
        let t = self.schedule.advance().ok_or(SensorError::ReadFailed {
            sensor: "climate probe",
            operation: "measure",
            details: "CRC mismatch",
        })?;
        let temperature = 18.5 + 2.0 * (t / 150.0).sin() + 0.3 * (t / 17.0).cos();
        let humidity = 52.0 + 9.0 * (t / 200.0).sin() + 1.5 * (t / 29.0).cos();
        Ok((temperature as f32, humidity.clamp(0.0, 100.0) as f32))
    }
}

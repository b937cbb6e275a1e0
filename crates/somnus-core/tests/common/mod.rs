//! Driver stubs shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use somnus_core::sensors::{PairDriver, ScalarDriver};
use somnus_core::SensorError;

/// Counts every read and returns a value unique to this driver and read.
///
/// Values are `base + n` for the n-th read, so drained samples can be traced
/// back to exactly one read.
pub struct CountingDriver {
    base: u32,
    reads: u32,
    total: Arc<AtomicU32>,
}

impl CountingDriver {
    pub fn new(base: u32, total: Arc<AtomicU32>) -> Self {
        Self {
            base,
            reads: 0,
            total,
        }
    }
}

impl ScalarDriver for CountingDriver {
    fn read(&mut self) -> Result<f32, SensorError> {
        let value = self.base + self.reads;
        self.reads += 1;
        self.total.fetch_add(1, Ordering::SeqCst);
        Ok(value as f32)
    }
}

/// Replays a fixed script of readings, then reports a disconnect.
pub struct ScriptedDriver {
    script: VecDeque<Result<f32, SensorError>>,
}

impl ScriptedDriver {
    pub fn new(script: impl IntoIterator<Item = Result<f32, SensorError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    pub fn values(values: &[f32]) -> Self {
        Self::new(values.iter().copied().map(Ok))
    }
}

impl ScalarDriver for ScriptedDriver {
    fn read(&mut self) -> Result<f32, SensorError> {
        self.script
            .pop_front()
            .unwrap_or(Err(SensorError::Disconnected { sensor: "scripted" }))
    }
}

/// Pair variant of [`ScriptedDriver`].
pub struct ScriptedPair {
    script: VecDeque<Result<(f32, f32), SensorError>>,
}

impl ScriptedPair {
    pub fn new(script: impl IntoIterator<Item = Result<(f32, f32), SensorError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl PairDriver for ScriptedPair {
    fn read_pair(&mut self) -> Result<(f32, f32), SensorError> {
        self.script
            .pop_front()
            .unwrap_or(Err(SensorError::Disconnected { sensor: "scripted" }))
    }
}

pub fn read_failure() -> SensorError {
    SensorError::ReadFailed {
        sensor: "scripted",
        operation: "read",
        details: "scripted failure",
    }
}

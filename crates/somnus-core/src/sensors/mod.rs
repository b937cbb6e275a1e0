mod climate;
mod light;
mod loudness;

use thiserror_no_std::Error;

use crate::storage::{RawSample, SampleBuffer};

pub use climate::{ClimateReadings, ClimateSensor};
pub use light::{LightReadings, LightSensor};
pub use loudness::{LoudnessReadings, LoudnessSensor};

/// The environmental quantities monitored in the sleeping space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quantity {
    Loudness,
    Light,
    Temperature,
    Humidity,
}

impl Quantity {
    /// Number of monitored quantities.
    pub const COUNT: usize = 4;

    /// Every quantity, ordered by slot index.
    pub const ALL: [Quantity; Self::COUNT] = [
        Quantity::Loudness,
        Quantity::Light,
        Quantity::Temperature,
        Quantity::Humidity,
    ];

    /// Slot of this quantity in per-quantity arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::Loudness => 0,
            Self::Light => 1,
            Self::Temperature => 2,
            Self::Humidity => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Loudness => "Loudness",
            Self::Light => "Light",
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::Loudness => "dB",
            Self::Light => "lx",
            Self::Temperature => "°C",
            Self::Humidity => "%",
        }
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure of a single sensor read. Never fatal: the sampling loop logs it
/// and skips the sample.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SensorError {
    #[error("{sensor}: {operation} failed ({details})")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
    #[error("{sensor} is not responding")]
    Disconnected { sensor: &'static str },
    #[error("{sensor} produced an unusable value {value}")]
    InvalidReading { sensor: &'static str, value: f32 },
}

/// Driver capability for devices yielding one scalar per read.
pub trait ScalarDriver {
    fn read(&mut self) -> Result<f32, SensorError>;
}

/// Driver capability for devices yielding two scalars from one physical read.
pub trait PairDriver {
    fn read_pair(&mut self) -> Result<(f32, f32), SensorError>;
}

/// Trait for sensor reading data structures.
/// Provides compile-time guarantees about the number of values and their conversion to arrays.
pub trait SensorReadings<const COUNT: usize> {
    /// Convert the readings into a fixed-size array.
    fn to_array(self) -> [f32; COUNT];
}

/// Trait for sensors that produce typed readings.
pub trait Sensor<const COUNT: usize> {
    /// The type of readings this sensor produces.
    type Readings: SensorReadings<COUNT>;

    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Read the sensor and return typed readings.
    fn read(&mut self) -> Result<Self::Readings, SensorError>;
}

/// Rejects NaN and infinities before they can reach the buffer.
pub(crate) fn finite(sensor: &'static str, value: f32) -> Result<f32, SensorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SensorError::InvalidReading { sensor, value })
    }
}

/// A sensor bound to the quantity slots `START..START + COUNT`.
///
/// A sensor producing several values (temperature and humidity from one
/// device) has all of them appended under a single buffer lock, so either
/// every slot receives its sample or none does.
pub struct IndexedSensor<S, const START: usize, const COUNT: usize>
where
    S: Sensor<COUNT>,
{
    sensor: S,
}

impl<S, const START: usize, const COUNT: usize> From<S> for IndexedSensor<S, START, COUNT>
where
    S: Sensor<COUNT>,
{
    fn from(value: S) -> Self {
        Self::new(value)
    }
}

impl<S, const START: usize, const COUNT: usize> IndexedSensor<S, START, COUNT>
where
    S: Sensor<COUNT>,
{
    const LAYOUT_FITS: () = assert!(
        COUNT > 0 && START + COUNT <= Quantity::COUNT,
        "sensor slots must lie within the quantity table"
    );

    pub const fn new(sensor: S) -> Self {
        let () = Self::LAYOUT_FITS;
        Self { sensor }
    }

    /// Read the sensor and append its values to the buffer.
    ///
    /// The hardware read happens outside the buffer lock; only the append
    /// holds it. On failure nothing is appended to any slot.
    pub fn read_into(&mut self, buffer: &SampleBuffer) -> Result<(), SensorError> {
        let readings = self.sensor.read()?;
        let data = readings.to_array();

        let mut samples = [RawSample::missing(Quantity::ALL[START]); COUNT];
        for (offset, value) in data.into_iter().enumerate() {
            samples[offset] = RawSample::reading(Quantity::ALL[START + offset], value);
        }
        buffer.append_all(&samples);
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        self.sensor.name()
    }

    /// The quantities this sensor feeds, in slot order.
    pub fn quantities() -> &'static [Quantity] {
        &Quantity::ALL[START..START + COUNT]
    }
}

pub mod indices {
    use super::{ClimateSensor, IndexedSensor, LightSensor, LoudnessSensor};

    // Slot layout must agree with `Quantity::index`. The climate sensor
    // writes two consecutive slots, temperature first.
    pub type LoudnessIndexed<D> = IndexedSensor<LoudnessSensor<D>, 0, 1>;
    pub type LightIndexed<D> = IndexedSensor<LightSensor<D>, 1, 1>;
    pub type ClimateIndexed<D> = IndexedSensor<ClimateSensor<D>, 2, 2>;
}

pub use indices::*;

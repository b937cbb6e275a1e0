use crate::sensors::{PairDriver, SensorError, SensorReadings, finite};
use crate::storage::round_tenths;

use super::Sensor;
use log::trace;

const SENSOR_NAME: &str = "climate";

/// Typed readings from the combined temperature/humidity device.
/// Both values come from one physical measurement.
pub struct ClimateReadings {
    pub temperature_celsius: f32,
    pub humidity_percent: f32,
}

impl SensorReadings<2> for ClimateReadings {
    fn to_array(self) -> [f32; 2] {
        [self.temperature_celsius, self.humidity_percent]
    }
}

pub struct ClimateSensor<D> {
    driver: D,
}

impl<D: PairDriver> ClimateSensor<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

impl<D: PairDriver> Sensor<2> for ClimateSensor<D> {
    type Readings = ClimateReadings;

    fn name(&self) -> &'static str {
        SENSOR_NAME
    }

    fn read(&mut self) -> Result<ClimateReadings, SensorError> {
        let (temperature, humidity) = self.driver.read_pair()?;

        // The device reports more precision than it has; both values are
        // stored at one decimal.
        let temperature_celsius = round_tenths(finite(SENSOR_NAME, temperature)?);
        let humidity_percent = round_tenths(finite(SENSOR_NAME, humidity)?);
        trace!(
            "Climate: {} °C, {} %",
            temperature_celsius, humidity_percent
        );

        Ok(ClimateReadings {
            temperature_celsius,
            humidity_percent,
        })
    }
}

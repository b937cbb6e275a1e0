use crate::sensors::{ScalarDriver, SensorError, SensorReadings, finite};

use super::Sensor;
use log::trace;

const SENSOR_NAME: &str = "loudness";

pub struct LoudnessReadings {
    pub decibels: f32,
}

impl SensorReadings<1> for LoudnessReadings {
    fn to_array(self) -> [f32; 1] {
        [self.decibels]
    }
}

/// Ambient noise level sensor.
pub struct LoudnessSensor<D> {
    driver: D,
}

impl<D: ScalarDriver> LoudnessSensor<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

impl<D: ScalarDriver> Sensor<1> for LoudnessSensor<D> {
    type Readings = LoudnessReadings;

    fn name(&self) -> &'static str {
        SENSOR_NAME
    }

    fn read(&mut self) -> Result<LoudnessReadings, SensorError> {
        let decibels = finite(SENSOR_NAME, self.driver.read()?)?;
        trace!("Loudness: {} dB", decibels);

        Ok(LoudnessReadings { decibels })
    }
}

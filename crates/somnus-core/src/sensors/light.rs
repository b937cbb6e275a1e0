use crate::sensors::{ScalarDriver, SensorError, SensorReadings, finite};

use super::Sensor;
use log::trace;

const SENSOR_NAME: &str = "light";

pub struct LightReadings {
    pub lux: f32,
}

impl SensorReadings<1> for LightReadings {
    fn to_array(self) -> [f32; 1] {
        [self.lux]
    }
}

pub struct LightSensor<D> {
    driver: D,
}

impl<D: ScalarDriver> LightSensor<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

impl<D: ScalarDriver> Sensor<1> for LightSensor<D> {
    type Readings = LightReadings;

    fn name(&self) -> &'static str {
        SENSOR_NAME
    }

    fn read(&mut self) -> Result<LightReadings, SensorError> {
        self.driver
            .read()
            .and_then(|lux| finite(SENSOR_NAME, lux))
            .map(|lux| {
                trace!("Light: {} lx", lux);
                LightReadings { lux }
            })
    }
}

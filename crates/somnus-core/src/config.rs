//! Monitor configuration
//!
//! Cadences, the scoring window, the composite weights and the threshold
//! policy. Every field has a default so partial configuration files work.

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::sensors::Quantity;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("{name} period must be greater than zero")]
    ZeroPeriod { name: &'static str },
    #[error("scoring window must hold at least one point")]
    EmptyWindow,
    #[error("weight for {quantity} is negative or not finite")]
    InvalidWeight { quantity: Quantity },
    #[error("weights must sum to a positive value (got {total})")]
    WeightSum { total: f32 },
    #[error("threshold {name} must be a finite, non-negative value")]
    InvalidThreshold { name: &'static str },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Polling period of each sampling loop
    pub sample_period_ms: u32,
    pub drain_periods: DrainPeriods,
    /// Period of the scoring tick
    pub score_period_ms: u32,
    /// Number of most recent history points averaged by the scorer
    pub score_window: usize,
    pub weights: Weights,
    pub thresholds: Thresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_period_ms: 1_000,
            drain_periods: DrainPeriods::default(),
            score_period_ms: 20_000,
            score_window: 3,
            weights: Weights::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_period_ms == 0 {
            return Err(ConfigError::ZeroPeriod { name: "sample" });
        }
        if self.score_period_ms == 0 {
            return Err(ConfigError::ZeroPeriod { name: "score" });
        }
        for quantity in Quantity::ALL {
            if self.drain_periods.for_quantity(quantity) == 0 {
                return Err(ConfigError::ZeroPeriod {
                    name: quantity.label(),
                });
            }
        }
        if self.score_window == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        self.weights.validate()?;
        self.thresholds.validate()
    }
}

/// Drain cadence per quantity. Independent so each series can tick on its
/// own schedule.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct DrainPeriods {
    pub loudness_ms: u32,
    pub light_ms: u32,
    pub temperature_ms: u32,
    pub humidity_ms: u32,
}

impl Default for DrainPeriods {
    fn default() -> Self {
        Self {
            loudness_ms: 10_000,
            light_ms: 10_000,
            temperature_ms: 10_000,
            humidity_ms: 10_000,
        }
    }
}

impl DrainPeriods {
    pub const fn for_quantity(&self, quantity: Quantity) -> u32 {
        match quantity {
            Quantity::Loudness => self.loudness_ms,
            Quantity::Light => self.light_ms,
            Quantity::Temperature => self.temperature_ms,
            Quantity::Humidity => self.humidity_ms,
        }
    }
}

/// Weights of the per-quantity sub-scores in the composite score.
/// They are normalized by their sum, so they need not add up to 1.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Weights {
    pub loudness: f32,
    pub light: f32,
    pub temperature: f32,
    pub humidity: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            loudness: 0.3,
            light: 0.3,
            temperature: 0.2,
            humidity: 0.2,
        }
    }
}

impl Weights {
    pub const fn for_quantity(&self, quantity: Quantity) -> f32 {
        match quantity {
            Quantity::Loudness => self.loudness,
            Quantity::Light => self.light,
            Quantity::Temperature => self.temperature,
            Quantity::Humidity => self.humidity,
        }
    }

    pub fn total(&self) -> f32 {
        self.loudness + self.light + self.temperature + self.humidity
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for quantity in Quantity::ALL {
            let weight = self.for_quantity(quantity);
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight { quantity });
            }
        }
        let total = self.total();
        if total <= 0.0 {
            return Err(ConfigError::WeightSum { total });
        }
        Ok(())
    }
}

/// Threshold policy for sub-scores and advisories.
///
/// Loudness and light score `limit - average`; temperature and humidity score
/// `band - |ideal - average|`. Advisories fire when the average exceeds the
/// limit, or strays from the ideal by more than the tolerance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Thresholds {
    pub loudness_limit_db: f32,
    pub light_limit_lux: f32,
    pub ideal_temperature_celsius: f32,
    pub temperature_band_celsius: f32,
    pub temperature_tolerance_celsius: f32,
    pub ideal_humidity_percent: f32,
    pub humidity_band_percent: f32,
    pub humidity_tolerance_percent: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            loudness_limit_db: 30.0,
            light_limit_lux: 10.0,
            ideal_temperature_celsius: 17.0,
            temperature_band_celsius: 18.0,
            temperature_tolerance_celsius: 2.0,
            ideal_humidity_percent: 50.0,
            humidity_band_percent: 10.0,
            humidity_tolerance_percent: 10.0,
        }
    }
}

impl Thresholds {
    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("loudness_limit_db", self.loudness_limit_db),
            ("light_limit_lux", self.light_limit_lux),
            ("temperature_band_celsius", self.temperature_band_celsius),
            (
                "temperature_tolerance_celsius",
                self.temperature_tolerance_celsius,
            ),
            ("humidity_band_percent", self.humidity_band_percent),
            ("humidity_tolerance_percent", self.humidity_tolerance_percent),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name });
            }
        }
        if !self.ideal_temperature_celsius.is_finite() {
            return Err(ConfigError::InvalidThreshold {
                name: "ideal_temperature_celsius",
            });
        }
        if !self.ideal_humidity_percent.is_finite() {
            return Err(ConfigError::InvalidThreshold {
                name: "ideal_humidity_percent",
            });
        }
        Ok(())
    }
}

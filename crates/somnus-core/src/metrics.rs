//! Sleep-quality scoring and advisories
//!
//! The scorer averages the most recent history points of every quantity,
//! converts each average into a non-negative sub-score, and combines the
//! sub-scores into a weighted composite. Independently of the sub-scores,
//! each average is checked against its threshold and produces an advisory
//! when it is out of range.
//!
//! Missing data never fails a computation: an empty window averages to 0.

use core::fmt;

use heapless::Vec;
use log::debug;

use crate::config::{MonitorConfig, Thresholds, Weights};
use crate::sensors::Quantity;
use crate::storage::HistoryStore;

/// How pressing an advisory is. Declaration order is the rank:
/// `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// What an advisory asks the sleeper to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdvisoryKind {
    ReduceNoise,
    DarkenRoom,
    AdjustTemperature,
    AdjustHumidity,
}

impl AdvisoryKind {
    pub const fn quantity(self) -> Quantity {
        match self {
            Self::ReduceNoise => Quantity::Loudness,
            Self::DarkenRoom => Quantity::Light,
            Self::AdjustTemperature => Quantity::Temperature,
            Self::AdjustHumidity => Quantity::Humidity,
        }
    }

    pub const fn urgency(self) -> Urgency {
        match self {
            Self::ReduceNoise | Self::DarkenRoom => Urgency::High,
            Self::AdjustTemperature | Self::AdjustHumidity => Urgency::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub urgency: Urgency,
    /// Window average that triggered the advisory
    pub measured: f32,
    /// Target value, for quantities that have one
    pub ideal: Option<f32>,
}

impl Advisory {
    fn new(kind: AdvisoryKind, measured: f32, ideal: Option<f32>) -> Self {
        Self {
            kind,
            urgency: kind.urgency(),
            measured,
            ideal,
        }
    }

    pub const fn quantity(&self) -> Quantity {
        self.kind.quantity()
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.quantity().unit();
        match self.kind {
            AdvisoryKind::ReduceNoise => {
                write!(f, "Reduce noise (currently {:.1} {})", self.measured, unit)
            }
            AdvisoryKind::DarkenRoom => write!(
                f,
                "Darken the room (current light level {:.1} {})",
                self.measured, unit
            ),
            AdvisoryKind::AdjustTemperature => write!(
                f,
                "Adjust the room temperature (currently {:.1} {unit}, ideal {} {unit})",
                self.measured,
                self.ideal.unwrap_or_default(),
            ),
            AdvisoryKind::AdjustHumidity => write!(
                f,
                "Adjust the humidity (currently {:.1} {unit}, ideal {} {unit})",
                self.measured,
                self.ideal.unwrap_or_default(),
            ),
        }
    }
}

/// One value per quantity, indexed by [`Quantity::index`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerQuantity(pub [f32; Quantity::COUNT]);

impl PerQuantity {
    pub const fn new(loudness: f32, light: f32, temperature: f32, humidity: f32) -> Self {
        Self([loudness, light, temperature, humidity])
    }

    pub const fn get(&self, quantity: Quantity) -> f32 {
        self.0[quantity.index()]
    }
}

/// Advisories fit in a fixed buffer: at most one per quantity.
pub type Advisories = Vec<Advisory, { Quantity::COUNT }>;

/// Outcome of one scoring tick.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    /// Weighted composite, never negative
    pub score: f32,
    /// Window average per quantity (0 where the window had no data)
    pub averages: PerQuantity,
    /// Non-negative sub-score per quantity
    pub sub_scores: PerQuantity,
    /// Ordered by descending urgency, ties in quantity order
    pub advisories: Advisories,
}

impl QualityReport {
    pub fn most_urgent(&self) -> Option<&Advisory> {
        self.advisories.first()
    }
}

/// Average of the points in a window that carry data, 0 if none do.
pub fn window_average(points: &[crate::storage::AggregatedPoint]) -> f32 {
    let (sum, count) = points
        .iter()
        .filter_map(|p| p.value)
        .fold((0.0f32, 0u32), |(sum, count), v| (sum + v, count + 1));

    if count == 0 { 0.0 } else { sum / count as f32 }
}

/// Computes [`QualityReport`]s from recent history.
///
/// Pure apart from reading history: identical windows always give identical
/// reports. Recording the score is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityScorer {
    window: usize,
    weights: Weights,
    thresholds: Thresholds,
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}

impl QualityScorer {
    pub fn new(window: usize, weights: Weights, thresholds: Thresholds) -> Self {
        Self {
            window,
            weights,
            thresholds,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.score_window, config.weights, config.thresholds)
    }

    pub const fn window(&self) -> usize {
        self.window
    }

    /// Score the last `window` points of every quantity.
    pub fn score(&self, history: &HistoryStore) -> QualityReport {
        let averages = PerQuantity(
            Quantity::ALL.map(|quantity| window_average(&history.tail(quantity, self.window))),
        );
        self.evaluate(averages)
    }

    /// Score a set of window averages.
    pub fn evaluate(&self, averages: PerQuantity) -> QualityReport {
        let sub_scores = self.sub_scores(&averages);
        let score = self.composite(&sub_scores);
        let advisories = self.advisories(&averages);

        debug!(
            "Sleep quality {:.2} from averages {:?} ({} advisories)",
            score,
            averages.0,
            advisories.len()
        );

        QualityReport {
            score,
            averages,
            sub_scores,
            advisories,
        }
    }

    /// Highest composite score for non-negative averages. A negative
    /// loudness or light average scores above its limit.
    pub fn max_score(&self) -> f32 {
        let t = &self.thresholds;
        self.composite(&PerQuantity::new(
            t.loudness_limit_db,
            t.light_limit_lux,
            t.temperature_band_celsius,
            t.humidity_band_percent,
        ))
    }

    fn sub_scores(&self, averages: &PerQuantity) -> PerQuantity {
        let t = &self.thresholds;
        let below = |limit: f32, value: f32| (limit - value).max(0.0);
        let near = |band: f32, ideal: f32, value: f32| {
            (band - libm::fabsf(ideal - value)).max(0.0)
        };

        PerQuantity::new(
            below(t.loudness_limit_db, averages.get(Quantity::Loudness)),
            below(t.light_limit_lux, averages.get(Quantity::Light)),
            near(
                t.temperature_band_celsius,
                t.ideal_temperature_celsius,
                averages.get(Quantity::Temperature),
            ),
            near(
                t.humidity_band_percent,
                t.ideal_humidity_percent,
                averages.get(Quantity::Humidity),
            ),
        )
    }

    fn composite(&self, sub_scores: &PerQuantity) -> f32 {
        let total = self.weights.total();
        if total <= 0.0 {
            return 0.0;
        }

        let weighted: f32 = Quantity::ALL
            .iter()
            .map(|&q| self.weights.for_quantity(q) * sub_scores.get(q))
            .sum();
        (weighted / total).max(0.0)
    }

    fn advisories(&self, averages: &PerQuantity) -> Advisories {
        let t = &self.thresholds;
        let loudness = averages.get(Quantity::Loudness);
        let light = averages.get(Quantity::Light);
        let temperature = averages.get(Quantity::Temperature);
        let humidity = averages.get(Quantity::Humidity);

        let candidates = [
            (loudness > t.loudness_limit_db)
                .then(|| Advisory::new(AdvisoryKind::ReduceNoise, loudness, None)),
            (light > t.light_limit_lux)
                .then(|| Advisory::new(AdvisoryKind::DarkenRoom, light, None)),
            (libm::fabsf(t.ideal_temperature_celsius - temperature)
                > t.temperature_tolerance_celsius)
                .then(|| {
                    Advisory::new(
                        AdvisoryKind::AdjustTemperature,
                        temperature,
                        Some(t.ideal_temperature_celsius),
                    )
                }),
            (libm::fabsf(t.ideal_humidity_percent - humidity) > t.humidity_tolerance_percent)
                .then(|| {
                    Advisory::new(
                        AdvisoryKind::AdjustHumidity,
                        humidity,
                        Some(t.ideal_humidity_percent),
                    )
                }),
        ];

        let mut advisories = Advisories::new();
        for advisory in candidates.into_iter().flatten() {
            // One candidate per quantity, so the buffer cannot overflow.
            let _ = advisories.push(advisory);
        }
        // Stable: equal urgencies keep quantity order.
        advisories.sort_by(|a, b| b.urgency.cmp(&a.urgency));
        advisories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::AggregatedPoint;

    fn scorer() -> QualityScorer {
        QualityScorer::default()
    }

    fn kinds(report: &QualityReport) -> alloc::vec::Vec<AdvisoryKind> {
        report.advisories.iter().map(|a| a.kind).collect()
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn urgency_rank_follows_declaration_order() {
        assert!(Urgency::High > Urgency::Medium);
        assert!(Urgency::Medium > Urgency::Low);
    }

    #[test]
    fn advisories_are_ordered_by_urgency() {
        let report = scorer().evaluate(PerQuantity::new(35.0, 5.0, 20.0, 65.0));

        assert_eq!(
            kinds(&report),
            [
                AdvisoryKind::ReduceNoise,
                AdvisoryKind::AdjustTemperature,
                AdvisoryKind::AdjustHumidity,
            ]
        );
        assert_eq!(report.advisories[0].urgency, Urgency::High);
        assert_eq!(report.advisories[1].urgency, Urgency::Medium);
        assert_eq!(report.advisories[2].urgency, Urgency::Medium);
        assert_eq!(report.advisories[1].ideal, Some(17.0));
        assert_eq!(report.advisories[2].measured, 65.0);
    }

    #[test]
    fn high_urgency_sorts_before_earlier_medium() {
        let report = scorer().evaluate(PerQuantity::new(0.0, 12.0, 17.0, 80.0));

        assert_eq!(
            kinds(&report),
            [AdvisoryKind::DarkenRoom, AdvisoryKind::AdjustHumidity]
        );
    }

    #[test]
    fn loudness_at_limit_neither_scores_nor_advises() {
        let report = scorer().evaluate(PerQuantity::new(30.0, 0.0, 17.0, 50.0));

        assert_eq!(report.sub_scores.get(Quantity::Loudness), 0.0);
        assert!(report.advisories.is_empty());
    }

    #[test]
    fn temperature_within_tolerance_does_not_advise() {
        let report = scorer().evaluate(PerQuantity::new(0.0, 0.0, 19.0, 50.0));
        assert!(report.advisories.is_empty());

        let report = scorer().evaluate(PerQuantity::new(0.0, 0.0, 19.5, 50.0));
        assert_eq!(kinds(&report), [AdvisoryKind::AdjustTemperature]);
    }

    #[test]
    fn sub_scores_follow_threshold_policy() {
        let report = scorer().evaluate(PerQuantity::new(20.0, 4.0, 20.0, 55.0));

        assert_close(report.sub_scores.get(Quantity::Loudness), 10.0);
        assert_close(report.sub_scores.get(Quantity::Light), 6.0);
        assert_close(report.sub_scores.get(Quantity::Temperature), 15.0);
        assert_close(report.sub_scores.get(Quantity::Humidity), 5.0);
        // 0.3 * 10 + 0.3 * 6 + 0.2 * 15 + 0.2 * 5
        assert_close(report.score, 8.8);
    }

    #[test]
    fn sub_scores_never_go_negative() {
        let report = scorer().evaluate(PerQuantity::new(90.0, 500.0, 60.0, 0.0));

        for quantity in Quantity::ALL {
            assert_eq!(report.sub_scores.get(quantity), 0.0);
        }
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn negative_averages_score_beyond_the_limit() {
        let report = scorer().evaluate(PerQuantity::new(-5.0, -2.0, 17.0, 50.0));

        assert_close(report.sub_scores.get(Quantity::Loudness), 35.0);
        assert_close(report.sub_scores.get(Quantity::Light), 12.0);
        // 0.3 * 35 + 0.3 * 12 + 0.2 * 18 + 0.2 * 10
        assert_close(report.score, 19.7);
        assert!(report.score > scorer().max_score());
    }

    #[test]
    fn ideal_room_reaches_max_score() {
        let scorer = scorer();
        let report = scorer.evaluate(PerQuantity::new(0.0, 0.0, 17.0, 50.0));

        assert_close(report.score, scorer.max_score());
        assert_close(scorer.max_score(), 17.6);
    }

    #[test]
    fn weights_are_normalized_by_their_sum() {
        let doubled = Weights {
            loudness: 0.6,
            light: 0.6,
            temperature: 0.4,
            humidity: 0.4,
        };
        let scaled = QualityScorer::new(3, doubled, Thresholds::default());
        let averages = PerQuantity::new(20.0, 4.0, 20.0, 55.0);

        assert_close(scaled.evaluate(averages).score, scorer().evaluate(averages).score);
    }

    #[test]
    fn empty_history_scores_as_zero_averages() {
        let history = HistoryStore::new();
        let report = scorer().score(&history);

        assert_eq!(report.averages, PerQuantity::default());
        // Silence and darkness score their full limits; temperature earns
        // 18 - |17 - 0| = 1 and humidity nothing.
        assert_close(report.sub_scores.get(Quantity::Loudness), 30.0);
        assert_close(report.sub_scores.get(Quantity::Light), 10.0);
        assert_close(report.sub_scores.get(Quantity::Temperature), 1.0);
        assert_close(report.sub_scores.get(Quantity::Humidity), 0.0);
        // 0.3 * 30 + 0.3 * 10 + 0.2 * 1
        assert_close(report.score, 12.2);
        assert_eq!(
            kinds(&report),
            [
                AdvisoryKind::AdjustTemperature,
                AdvisoryKind::AdjustHumidity
            ]
        );
    }

    #[test]
    fn score_uses_only_the_last_window_points() {
        let history = HistoryStore::new();
        for (i, value) in [100.0, 10.0, 20.0, 30.0].into_iter().enumerate() {
            history.append(
                Quantity::Loudness,
                AggregatedPoint::new(i as u32, Some(value)),
            );
        }

        let report = scorer().score(&history);
        assert_close(report.averages.get(Quantity::Loudness), 20.0);
    }

    #[test]
    fn window_skips_points_without_data() {
        let points = [
            AggregatedPoint::new(10, Some(40.0)),
            AggregatedPoint::no_data(20),
            AggregatedPoint::new(30, Some(50.0)),
        ];
        assert_close(window_average(&points), 45.0);
        assert_eq!(window_average(&[AggregatedPoint::no_data(10)]), 0.0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let averages = PerQuantity::new(33.3, 11.1, 14.2, 61.0);
        assert_eq!(scorer().evaluate(averages), scorer().evaluate(averages));
    }

    #[test]
    fn advisory_messages_carry_measured_and_ideal_values() {
        let report = scorer().evaluate(PerQuantity::new(35.0, 5.0, 20.0, 65.0));

        assert_eq!(
            alloc::format!("{}", report.advisories[0]),
            "Reduce noise (currently 35.0 dB)"
        );
        assert_eq!(
            alloc::format!("{}", report.advisories[1]),
            "Adjust the room temperature (currently 20.0 °C, ideal 17 °C)"
        );
    }
}

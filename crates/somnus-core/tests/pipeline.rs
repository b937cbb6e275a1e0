mod common;

use somnus_core::config::MonitorConfig;
use somnus_core::metrics::AdvisoryKind;
use somnus_core::sensors::{
    ClimateIndexed, ClimateSensor, LightIndexed, LightSensor, LoudnessIndexed, LoudnessSensor,
};
use somnus_core::ticker::ManualTicker;
use somnus_core::{AggregatedPoint, AppState, Quantity};

use common::{ScriptedDriver, ScriptedPair, read_failure};

fn state() -> AppState {
    AppState::new(MonitorConfig::default()).unwrap()
}

#[test]
fn single_drain_feeds_the_loudness_score() {
    let state = state();
    let mut source = state.source(LoudnessIndexed::from(LoudnessSensor::new(
        ScriptedDriver::values(&[10.0, 20.0, 30.0]),
    )));
    source.run(ManualTicker::new(1, 3));

    let point = state.aggregator().drain(Quantity::Loudness, 10);
    assert_eq!(point, AggregatedPoint::new(10, Some(20.0)));
    assert_eq!(state.tail(Quantity::Loudness, 3), [point]);

    let report = state.current_score();
    assert_eq!(report.averages.get(Quantity::Loudness), 20.0);
    assert_eq!(report.sub_scores.get(Quantity::Loudness), 10.0);
}

#[test]
fn light_failures_shrink_the_window_instead_of_zeroing_it() {
    let state = state();
    let mut source = state.source(LightIndexed::from(LightSensor::new(ScriptedDriver::new([
        Ok(4.0),
        Err(read_failure()),
        Ok(8.0),
    ]))));
    let stats = source.run(ManualTicker::new(1, 3));

    assert_eq!(stats.failed_reads, 1);
    assert_eq!(state.aggregator().drain(Quantity::Light, 10).value, Some(6.0));
}

#[test]
fn failed_joint_read_skips_both_quantities() {
    let state = state();
    let mut source = state.source(ClimateIndexed::from(ClimateSensor::new(ScriptedPair::new([
        Ok((16.04, 48.96)),
        Err(read_failure()),
        Ok((18.0, 51.0)),
    ]))));
    source.run(ManualTicker::new(1, 3));

    let points = state.aggregator().drain_all(10);
    assert_eq!(points[Quantity::Temperature.index()].value, Some(17.0));
    assert_eq!(points[Quantity::Humidity.index()].value, Some(50.0));
    assert_eq!(points[Quantity::Loudness.index()].value, None);
}

#[test]
fn history_length_equals_drain_count_with_or_without_data() {
    let state = state();
    let aggregator = state.aggregator();
    let mut source = state.source(LoudnessIndexed::from(LoudnessSensor::new(
        ScriptedDriver::values(&[25.0, 26.0]),
    )));

    source.run(ManualTicker::new(1, 2));
    aggregator.drain(Quantity::Loudness, 10);
    aggregator.drain(Quantity::Loudness, 20);
    aggregator.drain(Quantity::Loudness, 30);

    let series = state.series(Quantity::Loudness);
    assert_eq!(series.len(), 3);
    assert_eq!(series[0].value, Some(25.5));
    assert!(!series[1].has_data());
    assert!(!series[2].has_data());
}

#[test]
fn noisy_warm_humid_room_produces_ranked_advisories() {
    let state = state();
    let history = state.history();
    for (i, (loudness, light, temperature, humidity)) in
        [(34.0, 5.0, 20.0, 64.0), (35.0, 5.0, 20.0, 65.0), (36.0, 5.0, 20.0, 66.0)]
            .into_iter()
            .enumerate()
    {
        let ts = (i as u32 + 1) * 10;
        history.append(Quantity::Loudness, AggregatedPoint::new(ts, Some(loudness)));
        history.append(Quantity::Light, AggregatedPoint::new(ts, Some(light)));
        history.append(Quantity::Temperature, AggregatedPoint::new(ts, Some(temperature)));
        history.append(Quantity::Humidity, AggregatedPoint::new(ts, Some(humidity)));
    }

    let report = state.score_tick(40);
    let kinds: Vec<_> = report.advisories.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        [
            AdvisoryKind::ReduceNoise,
            AdvisoryKind::AdjustTemperature,
            AdvisoryKind::AdjustHumidity,
        ]
    );
    assert!(report.score >= 0.0);
    assert!(report.score <= state.scorer().max_score());
    assert_eq!(state.history().scores().len(), 1);
}

#[test]
fn series_stats_annotate_the_full_history() {
    let state = state();
    for (ts, value) in [(10, Some(18.0)), (20, None), (30, Some(16.0)), (40, Some(20.0))] {
        state
            .history()
            .append(Quantity::Temperature, AggregatedPoint::new(ts, value));
    }

    let stats = state.series_stats(Quantity::Temperature).unwrap();
    assert_eq!((stats.min, stats.max, stats.mean), (16.0, 20.0, 18.0));
    assert_eq!(state.series_stats(Quantity::Humidity), None);
}

//! Mathematical properties of the valuation river transform.

use river_core::{
    transform, AlignedSeries, DatedRecord, RiverParams, RiverSeries, StockId, TradingDate,
};

const EPSILON: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    let tolerance = EPSILON * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

/// Consecutive calendar days starting 2019-01-01, one record per PER value.
fn series_from_per(per: &[f64], close_price: impl Fn(usize) -> f64) -> AlignedSeries {
    let mut date = TradingDate::parse("2019-01-01").expect("valid date");
    let mut records = Vec::with_capacity(per.len());
    for (i, &per) in per.iter().enumerate() {
        records.push(DatedRecord::derive(date, close_price(i), per, 1.5));
        date = date.next_day().expect("date in range");
    }
    AlignedSeries::from_records(StockId::parse("2330").expect("valid"), records)
        .expect("ordered records")
}

/// Deterministic PER path with occasional near-zero-earnings spikes and losses.
fn wavy_per(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| match i % 150 {
            0 => 95.0,
            75 => -3.0,
            _ => 14.0 + 4.0 * ((i as f64) / 23.0).sin() + ((i * 7) % 5) as f64 * 0.3,
        })
        .collect()
}

fn naive_stats(per: &[f64], window: usize, min_periods: usize) -> Vec<Option<(f64, f64)>> {
    (0..per.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &per[start..=i];
            if slice.len() < min_periods || slice.len() < 2 {
                return None;
            }
            let n = slice.len() as f64;
            let mean = slice.iter().sum::<f64>() / n;
            let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Some((mean, var.sqrt()))
        })
        .collect()
}

#[test]
fn positions_before_min_periods_are_null_and_defined_after() {
    let series = series_from_per(&wavy_per(260), |i| 100.0 + i as f64 * 0.1);
    let river = transform(&series, RiverParams::default());

    for record in &river.records[..199] {
        assert!(record.pe_mean.is_none());
        assert!(record.pe_std.is_none());
        assert!(record.bands().is_none());
        assert!(record.river_high_2sd.is_none());
    }
    for record in &river.records[199..] {
        assert!(record.pe_mean.is_some());
        assert!(record.pe_std.is_some());
        assert!(record.bands().is_some());
    }
    assert_eq!(river.defined_count(), 260 - 199);
}

#[test]
fn output_preserves_length_order_and_source_fields() {
    let series = series_from_per(&wavy_per(50), |i| 30.0 + i as f64);
    let river = transform(&series, RiverParams::new(20, 5).expect("valid params"));

    assert_eq!(river.len(), series.len());
    for (river_record, record) in river.iter().zip(series.iter()) {
        assert_eq!(&river_record.record, record);
    }
}

#[test]
fn bands_are_ordered_whenever_eps_is_positive() {
    let series = series_from_per(&wavy_per(900), |i| 250.0 + (i % 40) as f64);
    let river = transform(&series, RiverParams::default());

    let mut checked = 0;
    for record in river.iter().filter(|r| r.record.eps > 0.0) {
        let Some(bands) = record.bands() else {
            continue;
        };
        assert!(record.pe_std.expect("std") >= 0.0);
        assert!(bands.low_2sd <= bands.low_1sd);
        assert!(bands.low_1sd <= bands.mean);
        assert!(bands.mean <= bands.high_1sd);
        assert!(bands.high_1sd <= bands.high_2sd);
        checked += 1;
    }
    assert!(checked > 600);
}

#[test]
fn constant_per_collapses_every_band_to_eps_times_per() {
    let series = series_from_per(&[12.0; 300], |i| 60.0 + i as f64 * 0.5);
    let river = transform(&series, RiverParams::default());

    for record in river.iter().skip(199) {
        assert_eq!(record.pe_mean, Some(12.0));
        assert_eq!(record.pe_std, Some(0.0));
        let expected = record.record.eps * 12.0;
        let bands = record.bands().expect("defined");
        for band in [bands.high_2sd, bands.high_1sd, bands.mean, bands.low_1sd, bands.low_2sd] {
            assert_eq!(band, expected);
        }
    }
}

#[test]
fn bands_collapse_once_an_earnings_spike_leaves_the_window() {
    let mut per = vec![4321.7];
    per.extend(std::iter::repeat(15.37).take(1_000));
    let series = series_from_per(&per, |i| 50.0 + i as f64 * 0.25);
    let river = transform(&series, RiverParams::default());

    for record in river.iter().skip(720) {
        assert_eq!(record.pe_mean, Some(15.37));
        assert_eq!(record.pe_std, Some(0.0));
        let expected = record.record.eps * 15.37;
        let bands = record.bands().expect("defined");
        for band in [bands.high_2sd, bands.high_1sd, bands.mean, bands.low_1sd, bands.low_2sd] {
            assert_eq!(band, expected);
        }
    }
}

#[test]
fn window_longer_than_history_uses_every_prior_record() {
    let per = wavy_per(260);
    let series = series_from_per(&per, |_| 100.0);
    let river = transform(&series, RiverParams::default());

    let last = river.records.last().expect("records");
    let mean = per.iter().sum::<f64>() / per.len() as f64;
    assert_close(last.pe_mean.expect("mean"), mean);
}

#[test]
fn windowed_statistics_match_naive_recompute_past_the_window() {
    let per = wavy_per(1_300);
    let series = series_from_per(&per, |i| 400.0 + (i % 90) as f64);
    let params = RiverParams::default();
    let river = transform(&series, params);
    let expected = naive_stats(&per, params.window(), params.min_periods());

    for (record, expected) in river.iter().zip(&expected) {
        match expected {
            None => assert!(record.pe_mean.is_none()),
            Some((mean, std)) => {
                assert_close(record.pe_mean.expect("mean"), *mean);
                assert_close(record.pe_std.expect("std"), *std);
                assert_close(
                    record.river_high_2sd.expect("band"),
                    record.record.eps * (mean + 2.0 * std),
                );
                assert_close(
                    record.river_low_1sd.expect("band"),
                    record.record.eps * (mean - std),
                );
            }
        }
    }
}

#[test]
fn zero_eps_records_produce_zero_bands() {
    let mut per = vec![10.0; 210];
    per[205] = -2.0;
    let series = series_from_per(&per, |_| 80.0);
    let river = transform(&series, RiverParams::default());

    let record = &river.records[205];
    assert_eq!(record.record.eps, 0.0);
    let bands = record.bands().expect("defined");
    assert_eq!(bands.mean, 0.0);
    assert_eq!(bands.high_2sd, 0.0);
    assert!(record.zone().is_none());
}

#[test]
fn transform_is_pure() {
    let series = series_from_per(&wavy_per(800), |i| 90.0 + i as f64 * 0.01);
    let params = RiverParams::new(240, 60).expect("valid params");

    let first = transform(&series, params);
    let second = RiverSeries::from_aligned(&series, params);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.pe_mean.map(f64::to_bits), b.pe_mean.map(f64::to_bits));
        assert_eq!(a.pe_std.map(f64::to_bits), b.pe_std.map(f64::to_bits));
        assert_eq!(a.river_mean.map(f64::to_bits), b.river_mean.map(f64::to_bits));
    }
}

#[test]
fn latest_defined_skips_nothing_once_history_is_sufficient() {
    let series = series_from_per(&wavy_per(230), |_| 100.0);
    let river = transform(&series, RiverParams::default());

    let latest = river.latest_defined().expect("defined");
    assert_eq!(Some(latest.record.date), series.last_date());

    let short = series_from_per(&wavy_per(10), |_| 100.0);
    assert!(transform(&short, RiverParams::default()).latest_defined().is_none());
}

#[test]
fn river_serializes_with_nullable_band_columns() {
    let series = series_from_per(&[10.0, 11.0, 12.0], |_| 100.0);
    let river = transform(&series, RiverParams::new(3, 2).expect("valid params"));
    let value = serde_json::to_value(&river).expect("serializes");

    let first = &value["records"][0];
    assert_eq!(first["date"], "2019-01-01");
    assert_eq!(first["per"], 10.0);
    assert!(first["pe_mean"].is_null());
    assert!(first["river_high_2sd"].is_null());
    assert_eq!(value["records"][1]["pe_mean"], 10.5);
    assert_eq!(value["params"]["window"], 3);
}

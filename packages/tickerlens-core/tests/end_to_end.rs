use approx::assert_abs_diff_eq;
use quickcheck_macros::quickcheck;
use tickerlens_core::{
    bollinger_bands, ema, ingest, macd, rsi, sma, CachedSource, ChartConfig, ChartSession,
    InMemoryCache, IndicatorId, IndicatorOutput, RawNumber, RawPoint, SessionState, StaticSource,
    TimeRange, MAX_SERIES_POINTS, MIN_VISIBLE_POINTS,
};

fn daily_closes(closes: &[f64]) -> Vec<RawPoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| RawPoint::from_close(1_700_000_000_000 + i as i64 * 86_400_000, close))
        .collect()
}

fn ramp(n: usize) -> Vec<RawPoint> {
    let closes: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64 * 0.37).sin() * 8.0 + i as f64 * 0.1).collect();
    daily_closes(&closes)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[test]
fn test_sma20_over_fifty_daily_closes() {
    let closes: Vec<f64> = (0..50).map(|i| 80.0 + (i * 7 % 13) as f64).collect();
    let report = ingest(&daily_closes(&closes), MAX_SERIES_POINTS).unwrap();

    let result = sma(report.series.points(), 20);
    assert_eq!(result.len(), 31);
    assert_abs_diff_eq!(result[0].value, mean(&closes[0..20]), epsilon = 1e-9);
    assert_abs_diff_eq!(result[30].value, mean(&closes[30..50]), epsilon = 1e-9);
}

#[test]
fn test_rsi14_on_five_points_is_empty() {
    let report = ingest(&daily_closes(&[10.0, 11.0, 12.0, 11.5, 13.0]), MAX_SERIES_POINTS).unwrap();
    assert!(rsi(report.series.points(), 14).is_empty());
}

#[test]
fn test_short_series_yields_empty_indicators() {
    let report = ingest(&ramp(15), MAX_SERIES_POINTS).unwrap();
    let points = report.series.points();

    assert!(sma(points, 20).is_empty());
    assert!(ema(points, 20).is_empty());
    assert!(rsi(points, 15).is_empty());
    assert!(macd(points, 12, 26, 9).is_empty());
    assert!(bollinger_bands(points, 20, 2.0).is_empty());
}

#[test]
fn test_zoom_tail_on_hundred_points() {
    let mut session = ChartSession::new("AAPL", ChartConfig::default());
    let pending = session.begin_fetch();
    session.complete_fetch(pending.ticket(), Ok(ramp(100)));

    session.set_zoom_window(95.0, 100.0);
    let visible = session.visible_slice();
    let all = session.series().points();

    assert_eq!(visible.len(), 10);
    assert_eq!(visible, &all[90..100]);
}

#[test]
fn test_nan_high_point_is_dropped() {
    let mut raw = ramp(10);
    raw[3].high = Some(RawNumber::Number(f64::NAN));

    let report = ingest(&raw, MAX_SERIES_POINTS).unwrap();
    assert_eq!(report.series.len(), 9);
    assert!(report.series.points().iter().all(|p| p.high >= p.low));
}

#[test]
fn test_thousand_points_truncate_to_last_600() {
    let raw = ramp(1000);
    let report = ingest(&raw, MAX_SERIES_POINTS).unwrap();

    assert_eq!(report.series.len(), 600);
    let expected = ingest(&raw[400..], MAX_SERIES_POINTS).unwrap();
    assert_eq!(report.series, expected.series);
}

#[test]
fn test_set_zoom_window_idempotent() {
    let mut session = ChartSession::new("AAPL", ChartConfig::default());
    let pending = session.begin_fetch();
    session.complete_fetch(pending.ticket(), Ok(ramp(250)));

    session.set_zoom_window(30.0, 70.0);
    let first = session.visible_slice().to_vec();
    session.set_zoom_window(30.0, 70.0);

    assert_eq!(first, session.visible_slice());
}

#[test]
fn test_overlays_independent_of_zoom() {
    let mut session = ChartSession::new("AAPL", ChartConfig::default());
    let pending = session.begin_fetch();
    session.complete_fetch(pending.ticket(), Ok(ramp(300)));
    session.set_active_indicators([IndicatorId::Ema26]);

    let full = match &session.active_indicator_overlays()[0].data {
        IndicatorOutput::Line(points) => points.clone(),
        IndicatorOutput::Bands(_) => panic!("expected a line"),
    };

    session.set_zoom_window(40.0, 60.0);
    let zoomed = match &session.active_indicator_overlays()[0].data {
        IndicatorOutput::Line(points) => points.clone(),
        IndicatorOutput::Bands(_) => panic!("expected a line"),
    };

    for point in &zoomed {
        let same = full.iter().find(|p| p.timestamp == point.timestamp).unwrap();
        assert_eq!(same.value, point.value);
    }
}

#[tokio::test]
async fn test_session_through_cached_source() {
    let source = CachedSource::new(
        StaticSource::new(ramp(120)),
        InMemoryCache::new(),
        ChartConfig::default().cache_ttl(),
    );

    let mut session = ChartSession::new("msft", ChartConfig::default());
    session.load(&source).await;
    assert_eq!(session.state(), &SessionState::Ready);
    assert_eq!(source.cache().len(), 1);

    let pending = session.set_time_range(TimeRange::OneYear);
    let outcome = pending.run(&source).await;
    assert!(session.apply_outcome(outcome));
    assert_eq!(source.cache().len(), 2);
    assert_eq!(session.visible_slice().len(), 120);
}

#[quickcheck]
fn prop_rsi_in_bounds(prices: Vec<f64>, period: u8) -> bool {
    let period = (period % 30) as usize + 1;
    let closes: Vec<f64> = prices.into_iter().filter(|p| p.is_finite()).collect();
    let points = daily_closes(&closes);
    let series = match ingest(&points, MAX_SERIES_POINTS) {
        Ok(report) => report.series,
        Err(_) => return true,
    };

    rsi(series.points(), period)
        .iter()
        .all(|p| (0.0..=100.0).contains(&p.value))
}

#[test]
fn test_rsi_bounded_for_extreme_finite_closes() {
    let raw = daily_closes(&[1e308, -1e308, 1e308, -1e308, f64::MAX, f64::MIN, 0.0]);
    let report = ingest(&raw, MAX_SERIES_POINTS).unwrap();
    assert_eq!(report.series.len(), 7);

    for period in 1..=6 {
        for point in rsi(report.series.points(), period) {
            assert!((0.0..=100.0).contains(&point.value), "period {}: {}", period, point.value);
        }
    }
}

#[quickcheck]
fn prop_sma_length(len: u16, period: u8) -> bool {
    let len = (len % 400) as usize + 1;
    let period = (period % 60) as usize + 1;
    let report = match ingest(&ramp(len), MAX_SERIES_POINTS) {
        Ok(report) => report,
        Err(_) => return false,
    };
    let n = report.series.len();
    let out = sma(report.series.points(), period);

    if n >= period {
        out.len() == n - period + 1
    } else {
        out.is_empty()
    }
}

#[quickcheck]
fn prop_zoom_floor(from: u8, to: u8, len: u16) -> bool {
    let len = (len % 700) as usize + 1;
    let mut session = ChartSession::new("AAPL", ChartConfig::default());
    let pending = session.begin_fetch();
    session.complete_fetch(pending.ticket(), Ok(ramp(len)));

    session.set_zoom_window(from as f64 % 101.0, to as f64 % 101.0);
    session.visible_slice().len() >= MIN_VISIBLE_POINTS.min(session.series().len())
}

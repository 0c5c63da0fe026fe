use marketscope::domain::analytics::{
    TrendDirection, compute_density, compute_trend, detect_pumps_dumps, pearson, percent_change,
};
use marketscope::domain::errors::AnalyticsError;
use marketscope::domain::market::{
    Candle, CandleQuery, CandleSeries, InstrumentKind, Interval, OrderBookSnapshot, PriceLevel,
};

use rand::Rng;

fn create_candle(i: i64, open: f64, close: f64) -> Candle {
    Candle {
        open_time: i * 60_000,
        open,
        high: open.max(close),
        low: open.min(close),
        close,
        volume: 1.0,
        close_time: i * 60_000 + 59_999,
        quote_volume: close,
        trades: 1,
        base_asset_volume: 0.5,
        quote_asset_volume: 0.5,
    }
}

fn series(candles: Vec<Candle>) -> CandleSeries {
    let query = CandleQuery::new("BTCUSDT", InstrumentKind::Spot, Interval::OneMin);
    CandleSeries::from_query(&query, candles).unwrap()
}

fn book(asks: Vec<PriceLevel>, bids: Vec<PriceLevel>) -> OrderBookSnapshot {
    OrderBookSnapshot {
        symbol: "BTCUSDT".to_string(),
        kind: InstrumentKind::Spot,
        current_price: 100.0,
        asks,
        bids,
    }
}

#[test]
fn test_density_wall_scenario() {
    let snapshot = book(
        vec![
            PriceLevel::new(100.0, 1.0),
            PriceLevel::new(101.0, 1.0),
            PriceLevel::new(102.0, 10.0),
        ],
        vec![PriceLevel::new(99.0, 3.0)],
    );

    let density = compute_density(&snapshot, 2.0).unwrap();

    assert!((density.asks.average_quantity - 4.0).abs() < 1e-12);
    assert_eq!(density.asks.levels, vec![PriceLevel::new(102.0, 10.0)]);
}

#[test]
fn test_density_threshold_holds_for_random_books() {
    let mut rng = rand::rng();

    for _ in 0..200 {
        let count: usize = rng.random_range(1..50);
        let levels: Vec<PriceLevel> = (0..count)
            .map(|i| PriceLevel::new(100.0 + i as f64, rng.random_range(0.0..500.0)))
            .collect();
        let coefficient = rng.random_range(0.0..5.0);
        let snapshot = book(levels.clone(), levels.clone());

        let density = compute_density(&snapshot, coefficient).unwrap();
        let threshold = density.asks.average_quantity * coefficient;

        for level in &levels {
            let selected = density.asks.levels.contains(level);
            assert_eq!(selected, level.quantity >= threshold);
        }
    }
}

#[test]
fn test_empty_book_side_is_divide_by_zero() {
    let snapshot = book(vec![], vec![PriceLevel::new(99.0, 1.0)]);
    assert!(matches!(
        compute_density(&snapshot, 2.0),
        Err(AnalyticsError::DivideByZero { .. })
    ));
}

#[test]
fn test_trend_over_full_series() {
    let trend = compute_trend(&series(vec![
        create_candle(0, 100.0, 110.0),
        create_candle(1, 110.0, 90.0),
    ]))
    .unwrap();

    assert_eq!(trend.direction, TrendDirection::Down);
    assert!((trend.percent_change - 10.0).abs() < 1e-9);
}

#[test]
fn test_single_candle_trend_signs() {
    let up = compute_trend(&series(vec![create_candle(0, 80.0, 100.0)])).unwrap();
    assert_eq!(up.direction, TrendDirection::Up);
    assert!((up.percent_change - 25.0).abs() < 1e-9);

    let down = compute_trend(&series(vec![create_candle(0, 100.0, 80.0)])).unwrap();
    assert_eq!(down.direction, TrendDirection::Down);
    assert!((down.percent_change - 20.0).abs() < 1e-9);

    let flat = compute_trend(&series(vec![create_candle(0, 100.0, 100.0)])).unwrap();
    assert_eq!(flat.direction, TrendDirection::Unchanged);
    assert_eq!(flat.percent_change, 0.0);
}

#[test]
fn test_pump_dump_partition_for_random_series() {
    let mut rng = rand::rng();

    for _ in 0..100 {
        let count: i64 = rng.random_range(1..60);
        let candles: Vec<Candle> = (0..count)
            .map(|i| {
                let open = rng.random_range(1.0..1000.0);
                let close = open * rng.random_range(0.5..1.5);
                create_candle(i, open, close)
            })
            .collect();
        let input = series(candles.clone());
        let coefficient = rng.random_range(0.0..4.0);

        let result = detect_pumps_dumps(&input, coefficient).unwrap();

        let changes: Vec<f64> = candles
            .iter()
            .map(|c| percent_change(c.open, c.close, false).unwrap())
            .collect();
        let threshold = changes.iter().sum::<f64>() / changes.len() as f64 * coefficient;

        for (candle, change) in candles.iter().zip(&changes) {
            let in_pumps = result.pumps.contains(candle);
            let in_dumps = result.dumps.contains(candle);
            assert!(!(in_pumps && in_dumps));
            assert_eq!(in_pumps || in_dumps, *change >= threshold);
            if in_pumps {
                assert!(candle.open < candle.close);
            }
            if in_dumps {
                assert!(candle.open >= candle.close);
            }
        }
        assert!(result.pumps.len() + result.dumps.len() <= candles.len());
    }
}

#[test]
fn test_correlation_bounds() {
    let xs: Vec<f64> = (0..50).map(|i| (i as f64 * 0.3).cos() * 10.0 + 100.0).collect();
    let inverted: Vec<f64> = xs.iter().map(|x| -x + 500.0).collect();

    assert!((pearson(&xs, &xs).unwrap() - 1.0).abs() < 1e-9);
    assert!((pearson(&xs, &inverted).unwrap() + 1.0).abs() < 1e-9);
}

#[test]
fn test_zero_open_is_rejected() {
    let input = series(vec![create_candle(0, 0.0, 1.0)]);
    assert!(matches!(
        compute_trend(&input),
        Err(AnalyticsError::DivideByZero { .. })
    ));
}

//! Unit tests for full-series signal evaluation

use chrono::Duration;
use intrabar::indicators::{CrossoverType, MacdParams, RsiParams};
use intrabar::models::SignalSide;
use intrabar::series::{aggregate, BucketOrigin};
use intrabar::signals::{BandMfiParams, Overlays, SignalConfig, SignalEngine};
use std::num::NonZeroU32;

use crate::fixtures::{buckets_from_closes, minute_series, session_day};

fn rsi_only() -> SignalConfig {
    SignalConfig::default()
        .with_macd(None)
        .with_rsi(Some(RsiParams::default()))
}

fn declining(count: usize) -> Vec<f64> {
    (0..count).map(|i| 1000.0 - i as f64).collect()
}

#[test]
fn oversold_entry_is_liquidated_at_cutoff() {
    // 5-minute buckets from the open; bucket 76 starts at 15:50.
    let buckets = buckets_from_closes(session_day(9, 30), 5, &declining(80));
    let evaluation = SignalEngine::new(rsi_only())
        .with_bucket_minutes(NonZeroU32::new(5).unwrap())
        .evaluate(&buckets);

    let signals: Vec<_> = evaluation.signals().collect();
    assert_eq!(signals.len(), 2);

    assert!(signals[0].buy_signal);
    assert_eq!(signals[0].bucket.start, session_day(10, 40));
    assert_eq!(signals[0].indicators.rsi, Some(0.0));

    assert!(signals[1].sell_signal);
    assert!(signals[1].forced_exit);
    assert_eq!(signals[1].bucket.start, session_day(15, 50));
    assert!(!evaluation.final_state.holding);
}

#[test]
fn indicators_warm_up_before_the_session_but_signals_wait_for_the_open() {
    let buckets = buckets_from_closes(session_day(4, 0), 5, &declining(100));
    let evaluation = SignalEngine::new(rsi_only()).evaluate(&buckets);

    let first = evaluation.signals().next().unwrap();
    assert!(first.buy_signal);
    assert_eq!(first.bucket.start, session_day(9, 30));
    // Pre-market buckets still carry indicator values.
    assert_eq!(evaluation.buckets[20].indicators.rsi, Some(0.0));
}

#[test]
fn signals_alternate_starting_with_a_buy() {
    let closes: Vec<f64> = (0..70)
        .map(|i| 100.0 + 5.0 * (i as f64 * std::f64::consts::PI / 10.0).sin())
        .collect();
    let buckets = buckets_from_closes(session_day(9, 30), 5, &closes);
    let config = SignalConfig::default().with_macd(Some(MacdParams::default()));
    let evaluation = SignalEngine::new(config).evaluate(&buckets);

    let sides: Vec<SignalSide> = evaluation.signals().filter_map(|b| b.signal()).collect();
    assert!(sides.len() >= 2, "expected crossovers, got {:?}", sides);
    assert_eq!(sides[0], SignalSide::Buy);
    assert!(sides.windows(2).all(|w| w[0] != w[1]));
    assert!(evaluation
        .buckets
        .iter()
        .all(|b| !(b.buy_signal && b.sell_signal)));
}

#[test]
fn current_signal_requires_a_fresh_bucket() {
    let buckets = buckets_from_closes(session_day(9, 30), 5, &declining(15));
    let evaluation = SignalEngine::new(rsi_only()).evaluate(&buckets);

    assert_eq!(evaluation.current_signal(session_day(10, 40)), Some(SignalSide::Buy));
    assert_eq!(evaluation.current_signal(session_day(10, 41)), None);
    assert_eq!(
        evaluation.current_signal(session_day(10, 40) - Duration::minutes(5)),
        None
    );
}

#[test]
fn evaluation_restarts_from_idle_on_every_call() {
    let buckets = buckets_from_closes(session_day(9, 30), 5, &declining(30));
    let engine = SignalEngine::new(rsi_only());

    let first = engine.evaluate(&buckets);
    let second = engine.evaluate(&buckets);

    assert_eq!(first.buckets, second.buckets);
    assert_eq!(first.final_state, second.final_state);
}

#[test]
fn empty_series_has_no_current_signal() {
    let evaluation = SignalEngine::new(SignalConfig::default()).evaluate(&[]);
    assert!(evaluation.buckets.is_empty());
    assert_eq!(evaluation.current_signal(session_day(10, 0)), None);
}

#[test]
fn band_mfi_votes_buy_on_oversold_confirmation() {
    let buckets = buckets_from_closes(session_day(9, 30), 15, &declining(15));
    let config = SignalConfig::default()
        .with_macd(None)
        .with_band_mfi(Some(BandMfiParams::default()));

    let overlays = Overlays::compute(&buckets, &config);
    let intent = overlays.intent_at(12, &config);
    let snapshot = overlays.snapshot(12);

    assert!(intent.buy);
    assert!(!intent.sell);
    assert!(snapshot.percent_b.unwrap() < 0.2);
    assert_eq!(snapshot.mfi, Some(0.0));
    assert!(snapshot.macd.is_none());
}

#[test]
fn quarter_hour_bucket_containing_the_cutoff_liquidates() {
    let width = NonZeroU32::new(15).unwrap();
    let engine = SignalEngine::new(rsi_only()).with_bucket_minutes(width);
    // Falling one-minute bars 09:30 through 15:45.
    let bars = minute_series(session_day(9, 30), 376, |i| 500.0 - i as f64 * 0.1);

    let buckets = aggregate(&bars, width, BucketOrigin::Clock);
    assert_eq!(buckets.last().unwrap().start, session_day(15, 45));

    let evaluation = engine.evaluate(&buckets);
    let sides: Vec<_> = evaluation
        .signals()
        .map(|b| (b.bucket.start, b.signal(), b.forced_exit))
        .collect();
    assert_eq!(
        sides,
        vec![
            (session_day(13, 0), Some(SignalSide::Buy), false),
            (session_day(15, 45), Some(SignalSide::Sell), true),
        ]
    );
    assert!(!evaluation.final_state.holding);

    // The exit is fresh during the 15:45 minute, before the close.
    assert_eq!(evaluation.current_signal(session_day(15, 45)), Some(SignalSide::Sell));
}

#[test]
fn repeated_buy_votes_while_holding_emit_one_buy() {
    // A steady decline (RSI oversold on every bucket once warm) followed by a
    // sharp rebound that crosses MACD above its signal line.
    let mut closes = declining(30);
    let last = *closes.last().unwrap();
    closes.extend((1..=4).map(|i| last + 3.0 * i as f64));
    let buckets = buckets_from_closes(session_day(9, 30), 5, &closes);
    let config = SignalConfig::default()
        .with_macd(Some(MacdParams::default()))
        .with_rsi(Some(RsiParams::default()));

    let overlays = Overlays::compute(&buckets, &config);
    let macd = overlays.macd.as_ref().unwrap();
    let crosses: Vec<_> = (0..buckets.len())
        .filter_map(|i| match macd.crossover_at(i) {
            CrossoverType::None => None,
            kind => Some((i, kind)),
        })
        .collect();
    assert!(!crosses.is_empty());
    assert!(crosses
        .iter()
        .all(|(i, kind)| *i >= 30 && *kind == CrossoverType::Bullish));

    let buy_votes = (0..buckets.len())
        .filter(|&i| overlays.intent_at(i, &config).buy)
        .count();
    assert!(buy_votes > 2);

    let evaluation = SignalEngine::new(config)
        .with_bucket_minutes(NonZeroU32::new(5).unwrap())
        .evaluate(&buckets);
    let signals: Vec<_> = evaluation.signals().collect();
    assert_eq!(signals.len(), 1);
    assert!(signals[0].buy_signal);
    assert_eq!(signals[0].bucket.start, session_day(10, 40));
    // The golden cross lands while already holding.
    assert!(!evaluation.buckets[crosses[0].0].buy_signal);
    assert!(evaluation.final_state.holding);
}

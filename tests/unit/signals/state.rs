//! Unit tests for the holding state machine

use chrono::Duration;
use intrabar::session::SessionHours;
use intrabar::signals::{Intent, SignalState, Transition};

use crate::fixtures::{session_day, ts};

fn minute() -> Duration {
    Duration::minutes(1)
}

fn hours() -> SessionHours {
    SessionHours::default()
}

#[test]
fn second_buy_while_holding_is_suppressed() {
    let mut state = SignalState::new();

    assert_eq!(state.step(session_day(10, 0), minute(), 10.0, Intent::BUY, &hours()), Transition::Enter);
    assert_eq!(state.step(session_day(10, 15), minute(), 10.5, Intent::BUY, &hours()), Transition::None);
    assert!(state.holding);
    assert_eq!(
        state.step(session_day(10, 30), minute(), 11.0, Intent::SELL, &hours()),
        Transition::Exit { forced: false }
    );
    assert!(!state.holding);
}

#[test]
fn sell_while_idle_is_ignored() {
    let mut state = SignalState::new();
    assert_eq!(state.step(session_day(10, 0), minute(), 10.0, Intent::SELL, &hours()), Transition::None);
    assert!(!state.holding);
}

#[test]
fn intents_outside_regular_session_are_skipped() {
    let mut state = SignalState::new();
    assert_eq!(state.step(session_day(9, 15), minute(), 10.0, Intent::BUY, &hours()), Transition::None);
    assert_eq!(state.step(session_day(16, 0), minute(), 10.0, Intent::BUY, &hours()), Transition::None);
    assert_eq!(state.step(session_day(9, 30), minute(), 10.0, Intent::BUY, &hours()), Transition::Enter);
}

#[test]
fn holding_into_cutoff_forces_an_exit() {
    let mut state = SignalState::new();
    state.step(session_day(15, 0), minute(), 10.0, Intent::BUY, &hours());

    assert_eq!(state.step(session_day(15, 45), minute(), 10.0, Intent::NONE, &hours()), Transition::None);
    assert_eq!(
        state.step(session_day(15, 50), minute(), 10.0, Intent::NONE, &hours()),
        Transition::Exit { forced: true }
    );
}

#[test]
fn natural_sell_at_cutoff_is_not_marked_forced() {
    let mut state = SignalState::new();
    state.step(session_day(15, 0), minute(), 10.0, Intent::BUY, &hours());

    assert_eq!(
        state.step(session_day(15, 50), minute(), 10.0, Intent::SELL, &hours()),
        Transition::Exit { forced: false }
    );
}

#[test]
fn position_carried_overnight_is_closed_on_the_next_day() {
    let mut state = SignalState::new();
    state.step(session_day(15, 30), minute(), 10.0, Intent::BUY, &hours());

    assert_eq!(
        state.step(ts(2024, 3, 5, 9, 30), minute(), 10.0, Intent::NONE, &hours()),
        Transition::Exit { forced: true }
    );
}

#[test]
fn no_entries_at_or_after_cutoff() {
    let mut state = SignalState::new();
    assert_eq!(state.step(session_day(15, 50), minute(), 10.0, Intent::BUY, &hours()), Transition::None);
    assert_eq!(state.step(session_day(15, 55), minute(), 10.0, Intent::BUY, &hours()), Transition::None);
}

#[test]
fn peak_price_tracks_the_open_position() {
    let mut state = SignalState::new();
    state.step(session_day(10, 0), minute(), 10.0, Intent::BUY, &hours());
    state.step(session_day(10, 15), minute(), 12.0, Intent::NONE, &hours());
    state.step(session_day(10, 30), minute(), 11.0, Intent::NONE, &hours());
    assert_eq!(state.peak_price_since_entry, Some(12.0));

    state.step(session_day(10, 45), minute(), 13.0, Intent::SELL, &hours());
    assert_eq!(state.peak_price_since_entry, Some(13.0));

    state.step(session_day(11, 0), minute(), 9.0, Intent::NONE, &hours());
    assert_eq!(state.peak_price_since_entry, None);
}

#[test]
fn bucket_spanning_the_cutoff_forces_an_exit() {
    let quarter = Duration::minutes(15);
    let mut state = SignalState::new();
    state.step(session_day(13, 0), quarter, 10.0, Intent::BUY, &hours());

    assert_eq!(state.step(session_day(15, 30), quarter, 10.0, Intent::NONE, &hours()), Transition::None);
    assert_eq!(
        state.step(session_day(15, 45), quarter, 10.0, Intent::NONE, &hours()),
        Transition::Exit { forced: true }
    );
}

#[test]
fn no_entry_on_a_bucket_spanning_the_cutoff() {
    let mut state = SignalState::new();
    assert_eq!(
        state.step(session_day(15, 45), Duration::minutes(15), 10.0, Intent::BUY, &hours()),
        Transition::None
    );
    assert!(!state.holding);
}

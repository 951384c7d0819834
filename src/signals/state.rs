//! Idle/holding state machine that turns intents into signals.

use chrono::{Duration, NaiveDateTime};

use crate::session::SessionHours;

use super::strategy::Intent;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    None,
    Enter,
    Exit { forced: bool },
}

/// Scan-local position state. Starts idle on every evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalState {
    pub holding: bool,
    pub peak_price_since_entry: Option<f64>,
    pub entry_time: Option<NaiveDateTime>,
}

impl SignalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one bucket covering `[start, start + width)`.
    ///
    /// Intents only count inside the regular session. A bucket reaches the
    /// exit cutoff when its span extends past it. While holding, a bucket
    /// reaching the cutoff, or on a later day than the entry, forces an
    /// exit if no sell fired. Buys on buckets reaching the cutoff are
    /// ignored. The peak survives the exit bucket and is cleared on the
    /// next idle one.
    pub fn step(
        &mut self,
        start: NaiveDateTime,
        width: Duration,
        close: f64,
        intent: Intent,
        hours: &SessionHours,
    ) -> Transition {
        let time = start.time();
        let in_session = hours.is_regular(time);
        let reaches_cutoff =
            time >= hours.exit_cutoff || start + width > start.date().and_time(hours.exit_cutoff);

        if self.holding {
            self.peak_price_since_entry = Some(match self.peak_price_since_entry {
                Some(peak) => peak.max(close),
                None => close,
            });

            if in_session && intent.sell {
                self.exit();
                return Transition::Exit { forced: false };
            }

            let next_day = self.entry_time.is_some_and(|entry| start.date() > entry.date());
            if reaches_cutoff || next_day {
                self.exit();
                return Transition::Exit { forced: true };
            }
            return Transition::None;
        }

        self.peak_price_since_entry = None;
        if in_session && intent.buy && !reaches_cutoff {
            self.holding = true;
            self.peak_price_since_entry = Some(close);
            self.entry_time = Some(start);
            return Transition::Enter;
        }

        Transition::None
    }

    fn exit(&mut self) {
        self.holding = false;
        self.entry_time = None;
    }
}

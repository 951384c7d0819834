//! Exchange session calendar: maps wall-clock time to session phases.

pub mod clock;

pub use clock::{
    truncate_to_minute, Clock, FixedClock, SessionClock, SessionHours, SessionPhase, SystemClock,
};

//! Clocks that feed the sky map its current instant.
//!
//! All clocks report milliseconds since the Unix epoch. Wall time comes from
//! an injected [`WallClock`] so that transitions and time travel can be
//! driven deterministically.

use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod composite;
pub mod real;
pub mod shared;
pub mod time_travel;
pub mod wall;

pub use composite::{ClockMode, TRANSITION_TIME_MS, TransitioningCompositeClock, interpolate};
pub use real::RealClock;
pub use shared::SharedClock;
pub use time_travel::{SPEEDS, Speed, SpeedTag, TimeTravelClock};
pub use wall::{ManualWallClock, SystemWallClock, WallClock};

/// Errors surfaced by clock handles.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("clock lock poisoned by a panicking writer")]
    Poisoned,
    #[error("{millis} ms since the epoch is outside the representable range")]
    OutOfRange { millis: i64 },
}

/// Source of the instant the engine computes against.
///
/// Querying may advance internal state, hence `&mut self`.
pub trait Clock {
    fn now_millis(&mut self) -> i64;

    fn now(&mut self) -> Result<DateTime<Utc>, ClockError> {
        let millis = self.now_millis();
        DateTime::from_timestamp_millis(millis).ok_or(ClockError::OutOfRange { millis })
    }
}

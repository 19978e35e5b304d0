//! A clock that runs at a chosen speed from a chosen instant.

use std::fmt;

use chrono::{DateTime, Utc};
use log::debug;

use crate::Clock;
use crate::wall::{SystemWallClock, WallClock};

const SECOND: f64 = 1.0;
const MINUTE: f64 = 60.0;
const TEN_MINUTES: f64 = 600.0;
const HOUR: f64 = 3_600.0;
const DAY: f64 = 86_400.0;
const WEEK: f64 = 604_800.0;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Identifies a speed setting; hosts map it to their own display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedTag {
    WeekBack,
    DayBack,
    HourBack,
    TenMinutesBack,
    MinuteBack,
    SecondBack,
    Stopped,
    Second,
    Minute,
    TenMinutes,
    Hour,
    Day,
    Week,
}

impl SpeedTag {
    pub fn label(&self) -> &'static str {
        match self {
            SpeedTag::WeekBack => "-1 week/sec",
            SpeedTag::DayBack => "-1 day/sec",
            SpeedTag::HourBack => "-1 hour/sec",
            SpeedTag::TenMinutesBack => "-10 min/sec",
            SpeedTag::MinuteBack => "-1 min/sec",
            SpeedTag::SecondBack => "-1 sec/sec",
            SpeedTag::Stopped => "stopped",
            SpeedTag::Second => "1 sec/sec",
            SpeedTag::Minute => "1 min/sec",
            SpeedTag::TenMinutes => "10 min/sec",
            SpeedTag::Hour => "1 hour/sec",
            SpeedTag::Day => "1 day/sec",
            SpeedTag::Week => "1 week/sec",
        }
    }
}

impl fmt::Display for SpeedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One rung of the speed ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speed {
    /// Simulated seconds per wall-clock second.
    pub rate: f64,
    pub tag: SpeedTag,
}

/// Speed ladder, slowest reverse to fastest forward, with `Stopped` in the middle.
pub const SPEEDS: [Speed; 13] = [
    Speed { rate: -WEEK, tag: SpeedTag::WeekBack },
    Speed { rate: -DAY, tag: SpeedTag::DayBack },
    Speed { rate: -HOUR, tag: SpeedTag::HourBack },
    Speed { rate: -TEN_MINUTES, tag: SpeedTag::TenMinutesBack },
    Speed { rate: -MINUTE, tag: SpeedTag::MinuteBack },
    Speed { rate: -SECOND, tag: SpeedTag::SecondBack },
    Speed { rate: 0.0, tag: SpeedTag::Stopped },
    Speed { rate: SECOND, tag: SpeedTag::Second },
    Speed { rate: MINUTE, tag: SpeedTag::Minute },
    Speed { rate: TEN_MINUTES, tag: SpeedTag::TenMinutes },
    Speed { rate: HOUR, tag: SpeedTag::Hour },
    Speed { rate: DAY, tag: SpeedTag::Day },
    Speed { rate: WEEK, tag: SpeedTag::Week },
];

const STOPPED_INDEX: usize = SPEEDS.len() / 2;

/// Simulated time that advances at `SPEEDS[speed_index].rate` relative to wall time.
///
/// At a day per second or faster the clock moves in whole days. Wall time
/// that does not add up to a full simulated day is carried over to the next
/// query rather than dropped.
#[derive(Debug, Clone)]
pub struct TimeTravelClock<W = SystemWallClock> {
    wall: W,
    speed_index: usize,
    time_last_set: i64,
    simulated_time: i64,
}

impl Default for TimeTravelClock<SystemWallClock> {
    fn default() -> Self {
        Self::new(SystemWallClock)
    }
}

impl<W: WallClock> TimeTravelClock<W> {
    /// A paused clock showing the current wall time.
    pub fn new(wall: W) -> Self {
        let now = wall.now_millis();
        Self {
            wall,
            speed_index: STOPPED_INDEX,
            time_last_set: now,
            simulated_time: now,
        }
    }

    /// Jump to `millis` and pause.
    pub fn set_time_travel_millis(&mut self, millis: i64) {
        self.pause();
        self.time_last_set = self.wall.now_millis();
        self.simulated_time = millis;
    }

    /// Jump to `date` and pause.
    pub fn set_time_travel_date(&mut self, date: &DateTime<Utc>) {
        self.set_time_travel_millis(date.timestamp_millis());
    }

    /// Step one rung towards faster forward travel; no-op at the top.
    pub fn accelerate(&mut self) {
        if self.speed_index < SPEEDS.len() - 1 {
            self.speed_index += 1;
            debug!("accelerating time travel to {}", self.current_speed().tag);
        } else {
            debug!("already at max forward speed");
        }
    }

    /// Step one rung towards faster reverse travel; no-op at the bottom.
    pub fn decelerate(&mut self) {
        if self.speed_index > 0 {
            self.speed_index -= 1;
            debug!("decelerating time travel to {}", self.current_speed().tag);
        } else {
            debug!("already at max backwards speed");
        }
    }

    pub fn pause(&mut self) {
        debug!("pausing time travel");
        self.speed_index = STOPPED_INDEX;
    }

    pub fn speed_index(&self) -> usize {
        self.speed_index
    }

    pub fn current_speed(&self) -> Speed {
        SPEEDS[self.speed_index]
    }

    pub fn current_speed_tag(&self) -> SpeedTag {
        self.current_speed().tag
    }
}

impl<W: WallClock> Clock for TimeTravelClock<W> {
    fn now_millis(&mut self) -> i64 {
        let now = self.wall.now_millis();
        let elapsed = now - self.time_last_set;
        let rate = self.current_speed().rate;
        let mut delta = (rate * elapsed as f64) as i64;
        if rate.abs() >= DAY {
            let days = delta / MILLIS_PER_DAY;
            if days == 0 {
                return self.simulated_time;
            }
            delta = days * MILLIS_PER_DAY;
        }
        self.time_last_set = now;
        self.simulated_time += delta;
        self.simulated_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wall::ManualWallClock;

    fn clock_at(millis: i64) -> (ManualWallClock, TimeTravelClock<ManualWallClock>) {
        let wall = ManualWallClock::new(millis);
        let clock = TimeTravelClock::new(wall.clone());
        (wall, clock)
    }

    #[test]
    fn ladder_is_symmetric_around_stopped() {
        assert_eq!(SPEEDS[STOPPED_INDEX].rate, 0.0);
        assert_eq!(SPEEDS[STOPPED_INDEX].tag, SpeedTag::Stopped);
        for i in 0..STOPPED_INDEX {
            assert_eq!(SPEEDS[i].rate, -SPEEDS[SPEEDS.len() - 1 - i].rate);
        }
    }

    #[test]
    fn accelerate_then_decelerate_restores_index() {
        let (_, mut clock) = clock_at(0);
        for start in 1..SPEEDS.len() - 1 {
            clock.speed_index = start;
            clock.accelerate();
            clock.decelerate();
            assert_eq!(clock.speed_index(), start);
        }
    }

    #[test]
    fn ladder_ends_are_sticky() {
        let (_, mut clock) = clock_at(0);
        for _ in 0..20 {
            clock.accelerate();
        }
        assert_eq!(clock.current_speed_tag(), SpeedTag::Week);
        for _ in 0..40 {
            clock.decelerate();
        }
        assert_eq!(clock.current_speed_tag(), SpeedTag::WeekBack);
        clock.pause();
        assert_eq!(clock.current_speed_tag(), SpeedTag::Stopped);
    }

    #[test]
    fn setting_a_date_pauses_and_holds() {
        let (wall, mut clock) = clock_at(1_000);
        clock.accelerate();
        clock.set_time_travel_millis(50_000);
        assert_eq!(clock.current_speed_tag(), SpeedTag::Stopped);
        wall.advance(10_000);
        assert_eq!(clock.now_millis(), 50_000);
    }

    #[test]
    fn time_advances_at_the_selected_rate() {
        let (wall, mut clock) = clock_at(0);
        clock.set_time_travel_millis(1_000_000);
        clock.accelerate();
        clock.accelerate();
        assert_eq!(clock.current_speed_tag(), SpeedTag::Minute);
        wall.advance(2_000);
        assert_eq!(clock.now_millis(), 1_000_000 + 120_000);

        clock.pause();
        clock.decelerate();
        wall.advance(500);
        assert_eq!(clock.now_millis(), 1_120_000 - 500);
    }

    #[test]
    fn fast_speeds_move_in_whole_days() {
        let (wall, mut clock) = clock_at(0);
        clock.set_time_travel_millis(0);
        for _ in 0..5 {
            clock.accelerate();
        }
        assert_eq!(clock.current_speed_tag(), SpeedTag::Day);

        wall.advance(600);
        assert_eq!(clock.now_millis(), 0);
        wall.advance(600);
        assert_eq!(clock.now_millis(), MILLIS_PER_DAY);
        wall.advance(2_500);
        assert_eq!(clock.now_millis(), 3 * MILLIS_PER_DAY);
    }
}

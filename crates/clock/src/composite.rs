//! Blends between real time and time travel with a smooth transition.

use chrono::{DateTime, Utc};
use log::{error, info};

use crate::Clock;
use crate::real::RealClock;
use crate::time_travel::{Speed, SpeedTag, TimeTravelClock};
use crate::wall::{SystemWallClock, WallClock};

/// Length of a transition between modes, in wall-clock milliseconds.
pub const TRANSITION_TIME_MS: i64 = 2_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    RealTime,
    Transition,
    TimeTravel,
}

/// Smoothstep from `start` at `lambda = 0` to `end` at `lambda = 1`.
pub fn interpolate(start: f64, end: f64, lambda: f64) -> f64 {
    start + (3.0 * lambda * lambda - 2.0 * lambda * lambda * lambda) * (end - start)
}

/// The clock the rest of the engine reads.
///
/// The real clock both answers in real-time mode and times the transitions.
#[derive(Debug, Clone)]
pub struct TransitioningCompositeClock<W = SystemWallClock> {
    real: RealClock<W>,
    time_travel: TimeTravelClock<W>,
    mode: ClockMode,
    transition_to: ClockMode,
    start_time: i64,
    end_time: i64,
    start_transition_wall_time: i64,
    transition_ms: i64,
}

impl Default for TransitioningCompositeClock<SystemWallClock> {
    fn default() -> Self {
        Self::new(
            RealClock::new(SystemWallClock),
            TimeTravelClock::new(SystemWallClock),
        )
    }
}

impl<W: WallClock + Clone> TransitioningCompositeClock<W> {
    /// Real time and time travel both driven by `wall`.
    pub fn with_wall_clock(wall: W) -> Self {
        Self::new(RealClock::new(wall.clone()), TimeTravelClock::new(wall))
    }
}

impl<W: WallClock> TransitioningCompositeClock<W> {
    pub fn new(real: RealClock<W>, time_travel: TimeTravelClock<W>) -> Self {
        Self {
            real,
            time_travel,
            mode: ClockMode::RealTime,
            transition_to: ClockMode::RealTime,
            start_time: 0,
            end_time: 0,
            start_transition_wall_time: 0,
            transition_ms: TRANSITION_TIME_MS,
        }
    }

    /// Override the glide duration; non-positive values keep the default.
    pub fn with_transition_time_ms(mut self, millis: i64) -> Self {
        if millis > 0 {
            self.transition_ms = millis;
        }
        self
    }

    pub fn transition_time_ms(&self) -> i64 {
        self.transition_ms
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    /// Glide from the current reading to `target`, then hold there in time-travel mode.
    pub fn go_time_travel_millis(&mut self, target: i64) {
        self.start_time = self.now_millis();
        self.end_time = target;
        self.time_travel.set_time_travel_millis(target);
        self.begin_transition(ClockMode::TimeTravel);
    }

    pub fn go_time_travel(&mut self, target: &DateTime<Utc>) {
        self.go_time_travel_millis(target.timestamp_millis());
    }

    /// Glide back to real time.
    ///
    /// The glide ends where real time will be when it finishes.
    pub fn return_to_real_time(&mut self) {
        self.start_time = self.now_millis();
        self.end_time = self.real.now_millis() + self.transition_ms;
        self.begin_transition(ClockMode::RealTime);
    }

    fn begin_transition(&mut self, to: ClockMode) {
        info!("clock transitioning from {:?} to {to:?}", self.mode);
        self.mode = ClockMode::Transition;
        self.transition_to = to;
        self.start_transition_wall_time = self.real.now_millis();
    }

    pub fn accelerate(&mut self) {
        self.time_travel.accelerate();
    }

    pub fn decelerate(&mut self) {
        self.time_travel.decelerate();
    }

    pub fn pause(&mut self) {
        self.time_travel.pause();
    }

    pub fn current_speed(&self) -> Speed {
        self.time_travel.current_speed()
    }

    pub fn current_speed_tag(&self) -> SpeedTag {
        self.time_travel.current_speed_tag()
    }

    pub fn time_travel(&self) -> &TimeTravelClock<W> {
        &self.time_travel
    }
}

impl<W: WallClock> Clock for TransitioningCompositeClock<W> {
    fn now_millis(&mut self) -> i64 {
        if self.mode == ClockMode::Transition {
            let elapsed = self.real.now_millis() - self.start_transition_wall_time;
            if elapsed > self.transition_ms {
                info!("clock transition complete, now {:?}", self.transition_to);
                self.mode = self.transition_to;
            } else {
                let lambda = elapsed as f64 / self.transition_ms as f64;
                return interpolate(self.start_time as f64, self.end_time as f64, lambda) as i64;
            }
        }
        match self.mode {
            ClockMode::RealTime => self.real.now_millis(),
            ClockMode::TimeTravel => self.time_travel.now_millis(),
            ClockMode::Transition => {
                error!("clock transition targets another transition, falling back to real time");
                self.mode = ClockMode::RealTime;
                self.real.now_millis()
            }
        }
    }
}

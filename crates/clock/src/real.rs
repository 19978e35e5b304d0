//! Wall time, optionally shifted by a fixed offset.

use chrono::{Duration, FixedOffset};

use crate::Clock;
use crate::wall::{SystemWallClock, WallClock};

/// Reports wall time plus a constant offset.
#[derive(Debug, Clone)]
pub struct RealClock<W = SystemWallClock> {
    wall: W,
    offset: Duration,
}

impl Default for RealClock<SystemWallClock> {
    fn default() -> Self {
        Self::new(SystemWallClock)
    }
}

impl<W: WallClock> RealClock<W> {
    pub fn new(wall: W) -> Self {
        Self {
            wall,
            offset: Duration::zero(),
        }
    }

    /// Shift readings by a zone's offset from UTC.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Duration::seconds(i64::from(offset.local_minus_utc()));
        self
    }

    pub fn offset(&self) -> Duration {
        self.offset
    }

    pub fn wall(&self) -> &W {
        &self.wall
    }
}

impl<W: WallClock> Clock for RealClock<W> {
    fn now_millis(&mut self) -> i64 {
        self.wall.now_millis() + self.offset.num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wall::ManualWallClock;

    #[test]
    fn offset_is_added_to_wall_time() {
        let wall = ManualWallClock::new(10_000);
        let mut plain = RealClock::new(wall.clone());
        assert_eq!(plain.now_millis(), 10_000);

        let east = FixedOffset::east_opt(2 * 3_600).unwrap();
        let mut shifted = RealClock::new(wall.clone()).with_offset(east);
        assert_eq!(shifted.now_millis(), 10_000 + 7_200_000);
        wall.advance(5);
        assert_eq!(shifted.now_millis(), 10_005 + 7_200_000);
    }

    #[test]
    fn readings_convert_to_instants() {
        let mut clock = RealClock::new(ManualWallClock::new(86_400_000));
        let t = clock.now().unwrap();
        assert_eq!(t.to_rfc3339(), "1970-01-02T00:00:00+00:00");
        let mut broken = RealClock::new(ManualWallClock::new(i64::MAX));
        assert!(broken.now().is_err());
    }
}

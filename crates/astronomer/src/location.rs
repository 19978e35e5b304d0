//! Filters location fixes so that only meaningful moves reach the model.

use log::info;
use sky_clock::Clock;
use sky_config::EngineConfig;
use sky_core::LatLong;

use crate::AstronomerModel;

/// Smallest move, in degrees of arc, that counts as a new location.
pub const DEFAULT_THRESHOLD_DEG: f64 = 0.01;

#[derive(Debug, Clone, Copy)]
pub struct LocationTracker {
    threshold_deg: f64,
    current: Option<LatLong>,
}

impl Default for LocationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_DEG)
    }
}

impl LocationTracker {
    pub fn new(threshold_deg: f64) -> Self {
        Self {
            threshold_deg,
            current: None,
        }
    }

    /// Tracker using the configured location-change threshold.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.location_change_threshold_deg)
    }

    pub fn threshold_deg(&self) -> f64 {
        self.threshold_deg
    }

    pub fn current(&self) -> Option<LatLong> {
        self.current
    }

    /// Record a fix; returns whether it moved past the threshold (the first fix always does).
    pub fn update(&mut self, location: LatLong) -> bool {
        let moved = match self.current {
            Some(previous) => {
                let distance = previous.distance_from(&location);
                if distance <= self.threshold_deg {
                    return false;
                }
                distance
            }
            None => 0.0,
        };
        info!(
            "location changed to ({:.4}, {:.4}), moved {moved:.4} degrees",
            location.latitude(),
            location.longitude()
        );
        self.current = Some(location);
        true
    }

    /// Forward a fix to the model when it is a meaningful move.
    pub fn update_model<C: Clock>(&mut self, location: LatLong, model: &mut AstronomerModel<C>) -> bool {
        let changed = self.update(location);
        if changed {
            model.set_location(location);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ZeroMagneticDeclinationCalculator;
    use sky_clock::{ManualWallClock, RealClock};

    #[test]
    fn small_moves_are_suppressed() {
        let mut tracker = LocationTracker::default();
        assert!(tracker.update(LatLong::new(10.0, 20.0)));
        assert!(!tracker.update(LatLong::new(10.005, 20.0)));
        assert_eq!(tracker.current(), Some(LatLong::new(10.0, 20.0)));
        assert!(tracker.update(LatLong::new(10.02, 20.0)));
        assert_eq!(tracker.current(), Some(LatLong::new(10.02, 20.0)));
    }

    #[test]
    fn configured_threshold_decides_which_moves_count() {
        let config = EngineConfig {
            location_change_threshold_deg: 0.5,
            ..EngineConfig::default()
        };
        let mut coarse = LocationTracker::from_config(&config);
        let mut fine = LocationTracker::from_config(&EngineConfig::default());
        assert_eq!(coarse.threshold_deg(), 0.5);
        assert_eq!(fine.threshold_deg(), DEFAULT_THRESHOLD_DEG);

        let start = LatLong::new(10.0, 20.0);
        let moved = LatLong::new(10.2, 20.0);
        assert!(coarse.update(start) && fine.update(start));
        assert!(!coarse.update(moved));
        assert!(fine.update(moved));
        assert_eq!(coarse.current(), Some(start));
    }

    #[test]
    fn model_only_sees_meaningful_moves() {
        let mut model = AstronomerModel::new(
            RealClock::new(ManualWallClock::new(0)),
            Box::new(ZeroMagneticDeclinationCalculator),
        );
        let mut tracker = LocationTracker::new(1.0);
        assert!(tracker.update_model(LatLong::new(45.0, 7.0), &mut model));
        assert_eq!(model.location(), LatLong::new(45.0, 7.0));
        assert!(!tracker.update_model(LatLong::new(45.5, 7.0), &mut model));
        assert_eq!(model.location(), LatLong::new(45.0, 7.0));
    }
}

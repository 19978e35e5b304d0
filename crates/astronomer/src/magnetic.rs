//! Angle between true and magnetic north.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use log::info;
use sky_core::LatLong;

/// Supplies the magnetic declination for the most recent location and time.
pub trait MagneticDeclinationCalculator: Send {
    /// Degrees east of true north, positive when magnetic north lies east.
    fn declination(&self) -> f64;

    fn set_location_and_time(&mut self, location: &LatLong, time_millis: i64);
}

/// Treats magnetic north as true north.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroMagneticDeclinationCalculator;

impl MagneticDeclinationCalculator for ZeroMagneticDeclinationCalculator {
    fn declination(&self) -> f64 {
        0.0
    }

    fn set_location_and_time(&mut self, _location: &LatLong, _time_millis: i64) {}
}

/// Gauss coefficients of the IGRF-13 dipole at 2020.0, in nT, with their yearly drift.
const G10: (f64, f64) = (-29_404.8, 5.7);
const G11: (f64, f64) = (-1_450.9, 7.4);
const H11: (f64, f64) = (4_652.5, -25.9);
const EPOCH_YEAR: i32 = 2020;

/// Declination from the centred-dipole term of the geomagnetic field model.
///
/// Good to a few degrees away from the magnetic poles; the higher-order
/// terms that shape local anomalies are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct DipoleMagneticDeclinationCalculator {
    declination: f64,
}

impl DipoleMagneticDeclinationCalculator {
    /// Horizontal field components (north, east) in nT.
    pub fn horizontal_field(latitude: f64, longitude: f64, year: f64) -> (f64, f64) {
        let dt = year - f64::from(EPOCH_YEAR);
        let g10 = G10.0 + G10.1 * dt;
        let g11 = G11.0 + G11.1 * dt;
        let h11 = H11.0 + H11.1 * dt;

        let colatitude = (90.0 - latitude).to_radians();
        let (sin_t, cos_t) = colatitude.sin_cos();
        let (sin_p, cos_p) = longitude.to_radians().sin_cos();

        let north = -g10 * sin_t + (g11 * cos_p + h11 * sin_p) * cos_t;
        let east = g11 * sin_p - h11 * cos_p;
        (north, east)
    }
}

/// Fractional year of an instant, e.g. 2020.5 in early July 2020.
fn decimal_year(time_millis: i64) -> f64 {
    let Some(instant) = DateTime::<Utc>::from_timestamp_millis(time_millis) else {
        return f64::from(EPOCH_YEAR);
    };
    let year = instant.year();
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single();
    let end = Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single();
    match (start, end) {
        (Some(start), Some(end)) => {
            let span = (end - start).num_milliseconds() as f64;
            f64::from(year) + (instant - start).num_milliseconds() as f64 / span
        }
        _ => f64::from(year),
    }
}

impl MagneticDeclinationCalculator for DipoleMagneticDeclinationCalculator {
    fn declination(&self) -> f64 {
        self.declination
    }

    fn set_location_and_time(&mut self, location: &LatLong, time_millis: i64) {
        let (north, east) = Self::horizontal_field(
            location.latitude(),
            location.longitude(),
            decimal_year(time_millis),
        );
        self.declination = east.atan2(north).to_degrees();
    }
}

/// Preference key selecting the real calculator.
pub const USE_MAGNETIC_CORRECTION_KEY: &str = "use_magnetic_correction";

/// Picks the dipole or the zero calculator from the `use_magnetic_correction` preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagneticDeclinationSwitcher {
    use_real: bool,
}

impl Default for MagneticDeclinationSwitcher {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MagneticDeclinationSwitcher {
    pub fn new(use_magnetic_correction: bool) -> Self {
        Self {
            use_real: use_magnetic_correction,
        }
    }

    pub fn uses_real_calculator(&self) -> bool {
        self.use_real
    }

    pub fn calculator(&self) -> Box<dyn MagneticDeclinationCalculator> {
        if self.use_real {
            Box::new(DipoleMagneticDeclinationCalculator::default())
        } else {
            Box::new(ZeroMagneticDeclinationCalculator)
        }
    }

    /// React to a preference change; returns the new calculator when `key` is ours.
    pub fn on_preference_changed(
        &mut self,
        key: &str,
        value: bool,
    ) -> Option<Box<dyn MagneticDeclinationCalculator>> {
        if key != USE_MAGNETIC_CORRECTION_KEY {
            return None;
        }
        info!("magnetic declination preference changed, real calculator: {value}");
        self.use_real = value;
        Some(self.calculator())
    }
}

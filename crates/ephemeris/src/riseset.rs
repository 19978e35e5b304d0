//! Next rise or set time of a body for an observer.
//!
//! The solver iterates on the UT hour of the current UTC day, refining it
//! with the body's hour angle until the correction drops below a threshold.
//! The resulting hour is mapped onto `now`'s UTC day, or the following day
//! when that instant has already passed. Positions are sampled on `now`'s day
//! even when the event falls on the next one, so results can be a few minutes
//! off for fast-moving bodies.

use chrono::{DateTime, Duration, DurationRound, Utc};
use log::{debug, error, warn};
use sky_core::LatLong;
use sky_core::angles::acos_clamped;
use sky_core::constants::{MILLIS_PER_DAY, MILLIS_PER_HOUR};
use sky_core::time::mean_sidereal_time;

use crate::{Ephemeris, Planet};

/// Iteration cap for the hour-angle refinement.
pub const MAX_ITERATIONS: usize = 25;

/// Convergence threshold on the UT correction, in hours.
pub const CONVERGENCE_HOURS: f64 = 0.008;

/// Which horizon crossing to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiseSetIndicator {
    Rise,
    Set,
}

impl RiseSetIndicator {
    fn sign(&self) -> f64 {
        match self {
            RiseSetIndicator::Rise => 1.0,
            RiseSetIndicator::Set => -1.0,
        }
    }
}

/// Solver tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiseSetSettings {
    pub max_iterations: usize,
    pub convergence_hours: f64,
}

impl Default for RiseSetSettings {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            convergence_hours: CONVERGENCE_HOURS,
        }
    }
}

/// Cosine of the hour angle at which a body of declination `dec` reaches `altitude`.
///
/// A value outside `[-1, 1]` means the body never reaches that altitude.
pub fn hour_angle_cosine(altitude: f64, latitude: f64, dec: f64) -> f64 {
    let (sin_alt, sin_lat, sin_dec) = (
        altitude.to_radians().sin(),
        latitude.to_radians().sin(),
        dec.to_radians().sin(),
    );
    let (cos_lat, cos_dec) = (latitude.to_radians().cos(), dec.to_radians().cos());
    (sin_alt - sin_lat * sin_dec) / (cos_lat * cos_dec)
}

/// Hour angle in degrees at which a body reaches `altitude`, clamped at the poles of its path.
pub fn hour_angle(altitude: f64, latitude: f64, dec: f64) -> f64 {
    acos_clamped(hour_angle_cosine(altitude, latitude, dec)).to_degrees()
}

/// Instant `ut` hours into the UTC day starting at `day_start`, truncated to whole seconds.
fn at_ut_hours(day_start: &DateTime<Utc>, ut: f64) -> DateTime<Utc> {
    let hours = ut.floor();
    let minutes = (ut - hours) * 60.0;
    let seconds = ((minutes - minutes.floor()) * 60.0).floor();
    *day_start
        + Duration::hours(hours as i64)
        + Duration::minutes(minutes.floor() as i64)
        + Duration::seconds(seconds as i64)
}

fn utc_day_start(now: &DateTime<Utc>) -> DateTime<Utc> {
    now.duration_trunc(Duration::days(1)).unwrap_or(*now)
}

impl Ephemeris {
    /// UT hour of `now`'s UTC day at which `planet` rises or sets, if the solver converges.
    ///
    /// A step that converges on the last allowed iteration still counts.
    pub fn rise_set_ut_hours(
        &self,
        planet: Planet,
        now: &DateTime<Utc>,
        location: &LatLong,
        indicator: RiseSetIndicator,
    ) -> Option<f64> {
        let settings = self.rise_set_settings();
        let day_start = utc_day_start(now);
        let sign = indicator.sign();
        let altitude = planet.rise_set_altitude();

        let mut delta: f64 = 5.0;
        let mut ut: f64 = 12.0;
        let mut iterations = 0;
        while delta.abs() > settings.convergence_hours && iterations < settings.max_iterations {
            let sample = at_ut_hours(&day_start, ut);
            let ra_dec = self.ra_dec(planet, &sample);

            let gha = mean_sidereal_time(&sample, 0.0) - ra_dec.ra;
            let cos_ha = hour_angle_cosine(altitude, location.latitude(), ra_dec.dec);
            if cos_ha.abs() > 1.0 {
                debug!(
                    "{planet} does not cross altitude {altitude} at latitude {} (cos H = {cos_ha:.3})",
                    location.latitude()
                );
                return None;
            }
            let ha = acos_clamped(cos_ha).to_degrees();

            delta = (gha + location.longitude() + sign * ha) / 15.0;
            while delta < -24.0 {
                delta += 24.0;
            }
            while delta > 24.0 {
                delta -= 24.0;
            }
            ut -= delta;
            while ut < 0.0 {
                ut += 24.0;
            }
            while ut > 24.0 {
                ut -= 24.0;
            }
            iterations += 1;
        }

        if delta.abs() > settings.convergence_hours {
            warn!("{planet} {indicator:?} calculation didn't converge after {iterations} iterations");
            return None;
        }
        Some(ut)
    }

    /// Next instant after `now` at which `planet` rises or sets, or `None` when it does not.
    pub fn next_rise_set(
        &self,
        planet: Planet,
        now: &DateTime<Utc>,
        location: &LatLong,
        indicator: RiseSetIndicator,
    ) -> Option<DateTime<Utc>> {
        let ut = self.rise_set_ut_hours(planet, now, location, indicator)?;
        let day_start = utc_day_start(now);
        let mut next = day_start + Duration::milliseconds((ut * MILLIS_PER_HOUR as f64) as i64);
        if next < *now {
            debug!("nearest {indicator:?} of {planet} is in the past, adding one day");
            next += Duration::milliseconds(MILLIS_PER_DAY);
        }
        if next <= *now {
            error!("next {indicator:?} of {planet} ({next}) should be after current time ({now})");
        }
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn hour_angle_at_equator_equinox_is_quarter_turn() {
        assert!((hour_angle(0.0, 0.0, 0.0) - 90.0).abs() < 1e-12);
        assert!(hour_angle_cosine(-0.83, 80.0, 23.4) < -1.0);
        assert_eq!(hour_angle(-0.83, 80.0, 23.4), 180.0);
    }

    #[test]
    fn ut_hours_are_truncated_to_seconds() {
        let day = Utc.with_ymd_and_hms(2010, 3, 21, 0, 0, 0).unwrap();
        let t = at_ut_hours(&day, 17.999_999);
        assert_eq!((t.hour(), t.minute(), t.second()), (17, 59, 59));
        let t = at_ut_hours(&day, 24.0);
        assert_eq!(t, Utc.with_ymd_and_hms(2010, 3, 22, 0, 0, 0).unwrap());
    }

    #[test]
    fn equatorial_sunset_is_near_six_in_the_evening() {
        let eph = Ephemeris::default();
        let noon = Utc.with_ymd_and_hms(2010, 3, 21, 12, 0, 0).unwrap();
        let sunset = eph
            .next_rise_set(Planet::Sun, &noon, &LatLong::new(0.0, 0.0), RiseSetIndicator::Set)
            .expect("sun sets at the equator");
        assert_eq!(sunset.date_naive(), noon.date_naive());
        let hours = (sunset - noon).num_seconds() as f64 / 3_600.0;
        assert!((hours - 6.0).abs() < 0.5, "sunset at {sunset}");
    }

    #[test]
    fn midsummer_sun_never_sets_in_the_arctic() {
        let eph = Ephemeris::default();
        let noon = Utc.with_ymd_and_hms(2010, 6, 21, 12, 0, 0).unwrap();
        let arctic = LatLong::new(80.0, 0.0);
        assert!(eph.next_rise_set(Planet::Sun, &noon, &arctic, RiseSetIndicator::Set).is_none());
        let winter = Utc.with_ymd_and_hms(2010, 12, 21, 12, 0, 0).unwrap();
        assert!(eph.next_rise_set(Planet::Sun, &winter, &arctic, RiseSetIndicator::Rise).is_none());
    }

    #[test]
    fn exhausted_iterations_return_none() {
        let eph = Ephemeris::default().with_rise_set_settings(RiseSetSettings {
            max_iterations: 1,
            convergence_hours: 1e-12,
        });
        let noon = Utc.with_ymd_and_hms(2010, 3, 21, 12, 0, 0).unwrap();
        let out = eph.next_rise_set(Planet::Sun, &noon, &LatLong::new(0.0, 0.0), RiseSetIndicator::Set);
        assert!(out.is_none());
    }

    #[test]
    fn converging_on_the_last_allowed_iteration_succeeds() {
        let eph = Ephemeris::default().with_rise_set_settings(RiseSetSettings {
            max_iterations: 1,
            convergence_hours: 48.0,
        });
        let noon = Utc.with_ymd_and_hms(2010, 3, 21, 12, 0, 0).unwrap();
        let ut = eph.rise_set_ut_hours(Planet::Sun, &noon, &LatLong::new(0.0, 0.0), RiseSetIndicator::Set);
        assert!(ut.is_some_and(|h| (0.0..=24.0).contains(&h)));
    }
}

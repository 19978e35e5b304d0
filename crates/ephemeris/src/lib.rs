//! Positions, phases, magnitudes and rise/set times of the Sun, Moon and planets.
//!
//! Every query is a pure function of the body and the instant; nothing is cached.

use chrono::{DateTime, Duration, Utc};
use sky_core::RaDec;
use sky_core::angles::acos_clamped;
use sky_core::time::julian_centuries;
use sky_core::vector;
use sky_orbits::{AnomalyModel, HeliocentricCoordinates, OrbitalElements};

pub mod moon;
pub mod planet;
pub mod riseset;
pub mod snapshot;

pub use moon::{LUNAR_CYCLE_DAYS, LunarPhase, moon_ra_dec};
pub use planet::{Planet, UnknownPlanet};
pub use riseset::{RiseSetIndicator, RiseSetSettings};
pub use snapshot::BodySnapshot;

/// Entry point for body computations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ephemeris {
    anomaly_model: AnomalyModel,
    rise_set: RiseSetSettings,
}

impl Ephemeris {
    pub fn new(anomaly_model: AnomalyModel) -> Self {
        Self {
            anomaly_model,
            rise_set: RiseSetSettings::default(),
        }
    }

    pub fn with_rise_set_settings(mut self, settings: RiseSetSettings) -> Self {
        self.rise_set = settings;
        self
    }

    pub fn anomaly_model(&self) -> AnomalyModel {
        self.anomaly_model
    }

    pub fn rise_set_settings(&self) -> &RiseSetSettings {
        &self.rise_set
    }

    /// Orbital elements of `planet` at `instant`; `None` for the Moon.
    pub fn orbital_elements(
        &self,
        planet: Planet,
        instant: &DateTime<Utc>,
    ) -> Option<OrbitalElements> {
        planet
            .element_polynomials()
            .map(|poly| poly.evaluate(julian_centuries(instant)))
    }

    /// Ecliptic heliocentric position; for `Sun` this is the Earth's position.
    pub fn heliocentric(
        &self,
        planet: Planet,
        instant: &DateTime<Utc>,
    ) -> Option<HeliocentricCoordinates> {
        self.orbital_elements(planet, instant)
            .map(|el| HeliocentricCoordinates::from_elements(&el, self.anomaly_model))
    }

    fn earth(&self, instant: &DateTime<Utc>) -> HeliocentricCoordinates {
        let elements = planet::EARTH.evaluate(julian_centuries(instant));
        HeliocentricCoordinates::from_elements(&elements, self.anomaly_model)
    }

    /// Ecliptic position relative to the Earth; `None` for the Moon.
    pub fn geocentric(
        &self,
        planet: Planet,
        instant: &DateTime<Utc>,
    ) -> Option<HeliocentricCoordinates> {
        let earth = self.earth(instant);
        match planet {
            Planet::Moon => None,
            Planet::Sun => Some(earth.negated()),
            _ => self
                .heliocentric(planet, instant)
                .map(|p| p.relative_to(&earth)),
        }
    }

    /// Apparent geocentric right ascension and declination.
    pub fn ra_dec(&self, planet: Planet, instant: &DateTime<Utc>) -> RaDec {
        match self.geocentric(planet, instant) {
            Some(geo) => RaDec::from_cartesian(&geo.to_equatorial().as_vector()),
            None => moon_ra_dec(instant),
        }
    }

    /// Sun-body-Earth angle in degrees.
    ///
    /// For the Moon this is 180° minus the Sun-Moon separation seen from the
    /// Earth, so it grows from 0 at new moon to 180 at full. The Sun reports 0.
    pub fn phase_angle(&self, planet: Planet, instant: &DateTime<Utc>) -> f64 {
        match planet {
            Planet::Sun => 0.0,
            Planet::Moon => {
                let moon = moon_ra_dec(instant).to_geocentric();
                let sun = RaDec::from_cartesian(&self.earth(instant).as_vector()).to_geocentric();
                180.0 - acos_clamped(vector::dot(&sun, &moon)).to_degrees()
            }
            _ => {
                let earth = self.earth(instant);
                match self.heliocentric(planet, instant) {
                    Some(body) => triangle_phase_angle(&body, &earth),
                    None => 0.0,
                }
            }
        }
    }

    /// Illuminated fraction of the visible disc, in percent.
    pub fn percent_illuminated(&self, planet: Planet, instant: &DateTime<Utc>) -> f64 {
        let phase = self.phase_angle(planet, instant);
        50.0 * (1.0 + phase.to_radians().cos())
    }

    /// Apparent visual magnitude.
    pub fn magnitude(&self, planet: Planet, instant: &DateTime<Utc>) -> f64 {
        if let Some(fixed) = fixed_magnitude(planet) {
            return fixed;
        }
        let earth = self.earth(instant);
        let Some(body) = self.heliocentric(planet, instant) else {
            return -10.0;
        };
        let distance = body.distance_from(&earth);
        let p = triangle_phase_angle(&body, &earth) / 100.0;
        phase_magnitude(planet, p) + 5.0 * (body.radius * distance).log10()
    }

    /// Image bucket for the Moon at `instant`.
    pub fn lunar_phase(&self, instant: &DateTime<Utc>) -> LunarPhase {
        let phase = self.phase_angle(Planet::Moon, instant);
        if phase < 22.5 || phase > 150.0 {
            return LunarPhase::classify(phase, phase);
        }
        let tomorrow = *instant + Duration::days(1);
        LunarPhase::classify(phase, self.phase_angle(Planet::Moon, &tomorrow))
    }

    fn moon_is_waxing(&self, instant: &DateTime<Utc>) -> (f64, bool) {
        let phase = self.phase_angle(Planet::Moon, instant);
        let later = self.phase_angle(Planet::Moon, &(*instant + Duration::hours(1)));
        (phase, later > phase)
    }

    /// Estimated next full moon from the current phase and the mean synodic month.
    pub fn next_full_moon(&self, instant: &DateTime<Utc>) -> DateTime<Utc> {
        let (phase, waxing) = self.moon_is_waxing(instant);
        moon::offset_by_days(instant, moon::days_to_full(phase, waxing))
    }

    /// Estimated next new moon from the current phase and the mean synodic month.
    pub fn next_new_moon(&self, instant: &DateTime<Utc>) -> DateTime<Utc> {
        let (phase, waxing) = self.moon_is_waxing(instant);
        moon::offset_by_days(instant, moon::days_to_new(phase, waxing))
    }

    /// Next full moon found by stepping hour by hour; accurate to an hour.
    pub fn next_full_moon_by_search(&self, instant: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        moon::search_full_moon(instant, |t| self.phase_angle(Planet::Moon, t))
    }
}

fn fixed_magnitude(planet: Planet) -> Option<f64> {
    match planet {
        Planet::Sun => Some(-27.0),
        Planet::Moon => Some(-10.0),
        _ => None,
    }
}

/// Empirical magnitude at unit distances as a function of `p = phase / 100`.
fn phase_magnitude(planet: Planet, p: f64) -> f64 {
    match planet {
        Planet::Mercury => -0.42 + (3.80 - (2.73 - 2.00 * p) * p) * p,
        Planet::Venus => -4.40 + (0.09 + (2.39 - 0.65 * p) * p) * p,
        Planet::Mars => -1.52 + 1.6 * p,
        Planet::Jupiter => -9.40 + 0.5 * p,
        Planet::Saturn => -8.75,
        Planet::Uranus => -7.19,
        Planet::Neptune => -6.87,
        Planet::Pluto => -1.0,
        // fixed magnitudes short-circuit before this is reached
        Planet::Sun | Planet::Moon => 0.0,
    }
}

/// Phase angle from the Sun-body-Earth triangle, in degrees.
fn triangle_phase_angle(body: &HeliocentricCoordinates, earth: &HeliocentricCoordinates) -> f64 {
    let d = body.distance_from(earth);
    let p = body.radius;
    let e = earth.radius;
    acos_clamped((d * d + p * p - e * e) / (2.0 * d * p)).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn christmas_2010() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2010, 12, 25, 12, 0, 0).unwrap()
    }

    #[test]
    fn sun_and_moon_magnitudes_are_fixed() {
        let eph = Ephemeris::default();
        for t in [christmas_2010(), Utc.with_ymd_and_hms(1987, 3, 3, 3, 3, 3).unwrap()] {
            assert_eq!(eph.magnitude(Planet::Sun, &t), -27.0);
            assert_eq!(eph.magnitude(Planet::Moon, &t), -10.0);
        }
    }

    #[test]
    fn kepler_model_reproduces_regression_values() {
        let eph = Ephemeris::new(AnomalyModel::Kepler);
        let t = christmas_2010();
        let phases = [
            (Planet::Mercury, 139.2326, 12.1317),
            (Planet::Venus, 99.1617, 42.0389),
            (Planet::Mars, 6.7978, 99.6485),
        ];
        for (planet, phase, lit) in phases {
            let got = eph.phase_angle(planet, &t);
            assert!((got - phase).abs() < 1e-3, "{planet} phase {got}");
            let got = eph.percent_illuminated(planet, &t);
            assert!((got - lit).abs() < 1e-3, "{planet} illumination {got}");
        }
        let magnitudes = [
            (Planet::Mercury, 1.79647),
            (Planet::Venus, -4.54474),
            (Planet::Mars, 1.22877),
            (Planet::Jupiter, -2.37794),
            (Planet::Saturn, 1.10066),
            (Planet::Uranus, 5.84858),
            (Planet::Neptune, 7.94433),
            (Planet::Pluto, 14.11068),
        ];
        for (planet, mag) in magnitudes {
            let got = eph.magnitude(planet, &t);
            assert!((got - mag).abs() < 1e-3, "{planet} magnitude {got}");
        }
        let moon = eph.phase_angle(Planet::Moon, &t);
        assert!((moon - 124.41).abs() < 0.05, "moon phase {moon}");
    }

    #[test]
    fn sun_direction_is_negated_earth() {
        let eph = Ephemeris::default();
        let t = christmas_2010();
        let earth = eph.heliocentric(Planet::Sun, &t).unwrap();
        let sun = eph.geocentric(Planet::Sun, &t).unwrap();
        assert_eq!(sun.as_vector(), vector::negate(&earth.as_vector()));
        assert!(eph.geocentric(Planet::Moon, &t).is_none());
    }

    #[test]
    fn full_moon_estimate_lands_inside_one_cycle() {
        let eph = Ephemeris::default();
        let t = christmas_2010();
        let full = eph.next_full_moon(&t);
        let new = eph.next_new_moon(&t);
        for next in [full, new] {
            let days = (next - t).num_hours() as f64 / 24.0;
            assert!(days > 0.0 && days <= LUNAR_CYCLE_DAYS, "{next}");
        }
        assert!(eph.phase_angle(Planet::Moon, &full) > 140.0);
        assert!(eph.phase_angle(Planet::Moon, &new) < 30.0);
    }
}

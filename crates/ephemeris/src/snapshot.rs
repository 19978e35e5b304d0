//! Per-instant summaries of every body, ready for export.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::{Ephemeris, Planet};

/// Position and appearance of one body at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodySnapshot {
    pub body: Planet,
    pub utc: String,
    pub ra_deg: f64,
    pub dec_deg: f64,
    /// Distance from the Sun in AU; absent for the Sun itself and the Moon.
    pub heliocentric_au: Option<f64>,
    /// Distance from the Earth in AU; absent for the Moon.
    pub geocentric_au: Option<f64>,
    pub phase_deg: f64,
    pub illuminated_pct: f64,
    pub magnitude: f64,
}

impl Ephemeris {
    /// Snapshot of a single body.
    pub fn body_snapshot(&self, planet: Planet, instant: &DateTime<Utc>) -> BodySnapshot {
        let ra_dec = self.ra_dec(planet, instant);
        let heliocentric_au = match planet {
            Planet::Sun | Planet::Moon => None,
            _ => self.heliocentric(planet, instant).map(|h| h.radius),
        };
        BodySnapshot {
            body: planet,
            utc: instant.to_rfc3339_opts(SecondsFormat::Secs, true),
            ra_deg: ra_dec.ra,
            dec_deg: ra_dec.dec,
            heliocentric_au,
            geocentric_au: self.geocentric(planet, instant).map(|g| g.radius),
            phase_deg: self.phase_angle(planet, instant),
            illuminated_pct: self.percent_illuminated(planet, instant),
            magnitude: self.magnitude(planet, instant),
        }
    }

    /// Snapshots of every body in table order.
    pub fn snapshot(&self, instant: &DateTime<Utc>) -> Vec<BodySnapshot> {
        Planet::ALL
            .into_iter()
            .map(|planet| self.body_snapshot(planet, instant))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn snapshot_covers_all_bodies_with_valid_coordinates() {
        let eph = Ephemeris::default();
        let t = Utc.with_ymd_and_hms(2024, 4, 8, 18, 0, 0).unwrap();
        let rows = eph.snapshot(&t);
        assert_eq!(rows.len(), Planet::ALL.len());
        for row in &rows {
            assert!((0.0..360.0).contains(&row.ra_deg), "{:?}", row);
            assert!((-90.0..=90.0).contains(&row.dec_deg), "{:?}", row);
            assert!((0.0..=100.0).contains(&row.illuminated_pct), "{:?}", row);
            assert_eq!(row.utc, "2024-04-08T18:00:00Z");
        }
    }

    #[test]
    fn distances_follow_body_kind() {
        let eph = Ephemeris::default();
        let t = Utc.with_ymd_and_hms(2024, 4, 8, 18, 0, 0).unwrap();
        let sun = eph.body_snapshot(Planet::Sun, &t);
        assert!(sun.heliocentric_au.is_none());
        let earth_sun = sun.geocentric_au.unwrap();
        assert!((0.98..1.02).contains(&earth_sun), "{earth_sun}");

        let moon = eph.body_snapshot(Planet::Moon, &t);
        assert!(moon.heliocentric_au.is_none() && moon.geocentric_au.is_none());

        let jupiter = eph.body_snapshot(Planet::Jupiter, &t);
        let r = jupiter.heliocentric_au.unwrap();
        assert!((4.9..5.5).contains(&r), "{r}");
    }
}

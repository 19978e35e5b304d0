//! The solar-system bodies and their fixed data table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sky_core::constants::{MILLIS_PER_HOUR, MILLIS_PER_MINUTE};
use sky_orbits::{ElementPolynomials, Linear};
use thiserror::Error;

/// A body whose position the engine can compute.
///
/// `Sun` carries Earth's orbital elements: the heliocentric position of the
/// Earth is obtained from it, and the Sun's geocentric direction is its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Planet {
    Mercury,
    Venus,
    Sun,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Moon,
}

impl Planet {
    pub const ALL: [Planet; 10] = [
        Planet::Mercury,
        Planet::Venus,
        Planet::Sun,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
        Planet::Pluto,
        Planet::Moon,
    ];

    /// Back-to-front rendering order.
    pub const DRAW_ORDER: [Planet; 10] = [
        Planet::Pluto,
        Planet::Neptune,
        Planet::Uranus,
        Planet::Saturn,
        Planet::Jupiter,
        Planet::Mars,
        Planet::Sun,
        Planet::Mercury,
        Planet::Venus,
        Planet::Moon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Sun => "Sun",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
            Planet::Pluto => "Pluto",
            Planet::Moon => "Moon",
        }
    }

    /// How often recomputing the body's position is worthwhile, in milliseconds.
    pub fn update_frequency_ms(&self) -> i64 {
        match self {
            Planet::Moon => MILLIS_PER_MINUTE,
            _ => MILLIS_PER_HOUR,
        }
    }

    /// Whether a position computed at `last_ms` is stale at `now_ms`.
    pub fn needs_update(&self, last_ms: i64, now_ms: i64) -> bool {
        (now_ms - last_ms).abs() >= self.update_frequency_ms()
    }

    /// Relative size of the body's sprite.
    pub fn image_size(&self) -> f64 {
        match self {
            Planet::Sun | Planet::Moon => 0.02,
            Planet::Mercury | Planet::Venus | Planet::Mars | Planet::Pluto => 0.01,
            Planet::Jupiter => 0.025,
            Planet::Uranus | Planet::Neptune => 0.015,
            Planet::Saturn => 0.035,
        }
    }

    /// Altitude correction applied when solving for rise and set, in degrees.
    pub fn rise_set_altitude(&self) -> f64 {
        match self {
            Planet::Sun | Planet::Moon => -0.83,
            _ => 0.0,
        }
    }

    /// Orbital element polynomials; the Moon has none.
    pub fn element_polynomials(&self) -> Option<&'static ElementPolynomials> {
        let poly = match self {
            Planet::Mercury => &MERCURY,
            Planet::Venus => &VENUS,
            Planet::Sun => &EARTH,
            Planet::Mars => &MARS,
            Planet::Jupiter => &JUPITER,
            Planet::Saturn => &SATURN,
            Planet::Uranus => &URANUS,
            Planet::Neptune => &NEPTUNE,
            Planet::Pluto => &PLUTO,
            Planet::Moon => return None,
        };
        Some(poly)
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a body name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown solar-system body '{0}'")]
pub struct UnknownPlanet(pub String);

impl FromStr for Planet {
    type Err = UnknownPlanet;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Planet::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPlanet(s.to_string()))
    }
}

const fn poly(
    a: (f64, f64),
    e: (f64, f64),
    i: (f64, f64),
    l: (f64, f64),
    w: (f64, f64),
    o: (f64, f64),
) -> ElementPolynomials {
    ElementPolynomials {
        semi_major_axis: Linear::new(a.0, a.1),
        eccentricity: Linear::new(e.0, e.1),
        inclination: Linear::new(i.0, i.1),
        mean_longitude: Linear::new(l.0, l.1),
        perihelion: Linear::new(w.0, w.1),
        ascending_node: Linear::new(o.0, o.1),
    }
}

static MERCURY: ElementPolynomials = poly(
    (0.387_099_27, 0.000_000_37),
    (0.205_635_93, 0.000_019_06),
    (7.004_979_02, -0.005_947_49),
    (252.250_323_50, 149_472.674_111_75),
    (77.457_796_28, 0.160_476_89),
    (48.330_765_93, -0.125_340_81),
);

static VENUS: ElementPolynomials = poly(
    (0.723_335_66, 0.000_003_90),
    (0.006_776_72, -0.000_041_07),
    (3.394_676_05, -0.000_788_90),
    (181.979_099_50, 58_517.815_387_29),
    (131.602_467_18, 0.002_683_29),
    (76.679_842_55, -0.277_694_18),
);

pub(crate) static EARTH: ElementPolynomials = poly(
    (1.000_002_61, 0.000_005_62),
    (0.016_711_23, -0.000_043_92),
    (-0.000_015_31, -0.012_946_68),
    (100.464_571_66, 35_999.372_449_81),
    (102.937_681_93, 0.323_273_64),
    (0.0, 0.0),
);

static MARS: ElementPolynomials = poly(
    (1.523_710_34, 0.000_018_47),
    (0.093_394_10, 0.000_078_82),
    (1.849_691_42, -0.008_131_31),
    (-4.553_432_05, 19_140.302_684_99),
    (-23.943_629_59, 0.444_410_88),
    (49.559_538_91, -0.292_573_43),
);

static JUPITER: ElementPolynomials = poly(
    (5.202_887_00, -0.000_116_07),
    (0.048_386_24, -0.000_132_53),
    (1.304_396_95, -0.001_837_14),
    (34.396_440_51, 3_034.746_127_75),
    (14.728_479_83, 0.212_526_68),
    (100.473_909_09, 0.204_691_06),
);

static SATURN: ElementPolynomials = poly(
    (9.536_675_94, -0.001_250_60),
    (0.053_861_79, -0.000_509_91),
    (2.485_991_87, 0.001_936_09),
    (49.954_244_23, 1_222.493_622_01),
    (92.598_878_31, -0.418_972_16),
    (113.662_424_48, -0.288_677_94),
);

static URANUS: ElementPolynomials = poly(
    (19.189_164_64, -0.001_961_76),
    (0.047_257_44, -0.000_043_97),
    (0.772_637_83, -0.002_429_39),
    (313.238_104_51, 428.482_027_85),
    (170.954_276_30, 0.408_052_81),
    (74.016_925_03, 0.042_405_89),
);

static NEPTUNE: ElementPolynomials = poly(
    (30.069_922_76, 0.000_262_91),
    (0.008_590_48, 0.000_051_05),
    (1.770_043_47, 0.000_353_72),
    (-55.120_029_69, 218.459_453_25),
    (44.964_762_27, -0.322_414_64),
    (131.784_225_74, -0.005_086_64),
);

static PLUTO: ElementPolynomials = poly(
    (39.482_116_75, -0.000_315_96),
    (0.248_827_30, 0.000_051_70),
    (17.140_012_06, 0.000_048_18),
    (238.929_038_33, 145.207_805_15),
    (224.068_916_29, -0.040_629_42),
    (110.303_936_84, -0.011_834_82),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("saturn".parse::<Planet>(), Ok(Planet::Saturn));
        assert_eq!(" MOON ".parse::<Planet>(), Ok(Planet::Moon));
        let err = "earth".parse::<Planet>().unwrap_err();
        assert_eq!(err, UnknownPlanet("earth".into()));
        assert_eq!(err.to_string(), "unknown solar-system body 'earth'");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn moon_updates_every_minute_others_hourly() {
        assert_eq!(Planet::Moon.update_frequency_ms(), 60_000);
        assert!(Planet::ALL
            .iter()
            .filter(|p| **p != Planet::Moon)
            .all(|p| p.update_frequency_ms() == 3_600_000));
        assert!(!Planet::Mars.needs_update(0, 3_599_999));
        assert!(Planet::Moon.needs_update(0, 60_000));
    }

    #[test]
    fn draw_order_covers_every_body_once() {
        for planet in Planet::ALL {
            assert_eq!(Planet::DRAW_ORDER.iter().filter(|p| **p == planet).count(), 1);
        }
        assert_eq!(Planet::DRAW_ORDER[0], Planet::Pluto);
        assert_eq!(Planet::DRAW_ORDER[9], Planet::Moon);
    }

    #[test]
    fn only_the_moon_lacks_elements() {
        for planet in Planet::ALL {
            assert_eq!(planet.element_polynomials().is_none(), planet == Planet::Moon);
        }
    }
}

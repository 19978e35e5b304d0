//! Orbital elements and heliocentric position reconstruction.
//!
//! Elements follow the low-precision linear model of Van Flandern and
//! Pulkkinen as tabulated by JPL: each element is `value + rate * jc`
//! with `jc` in Julian centuries past J2000.

use log::debug;
use sky_core::angles::mod2pi;
use sky_core::constants::OBLIQUITY_J2000_DEG;
use sky_core::vector::{self, Vector3};

/// Convergence tolerance for the eccentric anomaly, in radians.
const KEPLER_TOLERANCE: f64 = 1.0e-6;
/// Newton steps allowed before giving up on the eccentric anomaly.
const KEPLER_MAX_ITERATIONS: usize = 100;

/// How the anomaly fed into the position reconstruction is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnomalyModel {
    /// Use the mean anomaly `L - w` directly, with no Kepler solve.
    #[default]
    Mean,
    /// Solve Kepler's equation and use the true anomaly.
    Kepler,
}

/// A linear polynomial `value + rate * jc`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    pub value: f64,
    pub rate: f64,
}

impl Linear {
    pub const fn new(value: f64, rate: f64) -> Self {
        Self { value, rate }
    }

    #[inline]
    pub fn at(&self, jc: f64) -> f64 {
        self.value + self.rate * jc
    }
}

/// Per-body element polynomials; angles in degrees, distance in AU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementPolynomials {
    pub semi_major_axis: Linear,
    pub eccentricity: Linear,
    pub inclination: Linear,
    pub mean_longitude: Linear,
    pub perihelion: Linear,
    pub ascending_node: Linear,
}

impl ElementPolynomials {
    /// Evaluate the elements at `jc` Julian centuries past J2000.
    pub fn evaluate(&self, jc: f64) -> OrbitalElements {
        OrbitalElements {
            distance: self.semi_major_axis.at(jc),
            eccentricity: self.eccentricity.at(jc),
            inclination: self.inclination.at(jc).to_radians(),
            ascending_node: self.ascending_node.at(jc).to_radians(),
            perihelion: self.perihelion.at(jc).to_radians(),
            mean_longitude: mod2pi(self.mean_longitude.at(jc).to_radians()),
        }
    }
}

/// The six elements describing an orbit at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    /// Mean distance (AU).
    pub distance: f64,
    pub eccentricity: f64,
    /// Inclination (radians).
    pub inclination: f64,
    /// Longitude of the ascending node (radians).
    pub ascending_node: f64,
    /// Longitude of perihelion (radians).
    pub perihelion: f64,
    /// Mean longitude (radians, in `[0, 2π)`).
    pub mean_longitude: f64,
}

impl OrbitalElements {
    pub fn mean_anomaly(&self) -> f64 {
        self.mean_longitude - self.perihelion
    }

    /// True anomaly in `[0, 2π)` from Newton iteration on Kepler's equation.
    pub fn true_anomaly(&self) -> f64 {
        let m = self.mean_anomaly();
        let e = self.eccentricity;
        let mut e0 = m + e * m.sin() * (1.0 + e * m.cos());
        let mut iterations = 0;
        loop {
            let e1 = e0;
            e0 = e1 - (e1 - e * e1.sin() - m) / (1.0 - e * e1.cos());
            iterations += 1;
            if (e0 - e1).abs() <= KEPLER_TOLERANCE {
                break;
            }
            if iterations > KEPLER_MAX_ITERATIONS {
                debug!("eccentric anomaly failed to converge: e1 = {e1}, e0 = {e0}");
                break;
            }
        }
        let v = 2.0 * (((1.0 + e) / (1.0 - e)).sqrt() * (0.5 * e0).tan()).atan();
        mod2pi(v)
    }

    pub fn anomaly(&self, model: AnomalyModel) -> f64 {
        match model {
            AnomalyModel::Mean => self.mean_anomaly(),
            AnomalyModel::Kepler => self.true_anomaly(),
        }
    }
}

/// Cartesian position centred on the Sun, in AU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeliocentricCoordinates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Distance from the origin.
    pub radius: f64,
}

impl HeliocentricCoordinates {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        let radius = (x * x + y * y + z * z).sqrt();
        Self { x, y, z, radius }
    }

    pub fn from_vector(v: Vector3) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    /// Ecliptic position of the orbiting body.
    pub fn from_elements(elements: &OrbitalElements, model: AnomalyModel) -> Self {
        let anomaly = elements.anomaly(model);
        let ecc = elements.eccentricity;
        let radius = elements.distance * (1.0 - ecc * ecc) / (1.0 + ecc * anomaly.cos());

        let per = elements.perihelion;
        let asc = elements.ascending_node;
        let inc = elements.inclination;
        let u = anomaly + per - asc;
        let x = radius * (asc.cos() * u.cos() - asc.sin() * u.sin() * inc.cos());
        let y = radius * (asc.sin() * u.cos() + asc.cos() * u.sin() * inc.cos());
        let z = radius * (u.sin() * inc.sin());
        Self { x, y, z, radius }
    }

    pub fn as_vector(&self) -> Vector3 {
        [self.x, self.y, self.z]
    }

    /// Vector from `other` to `self`.
    pub fn relative_to(&self, other: &Self) -> Self {
        Self::from_vector(vector::sub(&self.as_vector(), &other.as_vector()))
    }

    pub fn distance_from(&self, other: &Self) -> f64 {
        vector::norm(&vector::sub(&self.as_vector(), &other.as_vector()))
    }

    pub fn negated(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            radius: self.radius,
        }
    }

    /// Rotate from the ecliptic frame into the equatorial frame at J2000 obliquity.
    pub fn to_equatorial(&self) -> Self {
        self.rotate_about_x(OBLIQUITY_J2000_DEG.to_radians())
    }

    /// Rotation about the x axis (the equinox direction) by `angle` radians.
    pub fn rotate_about_x(&self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            x: self.x,
            y: self.y * c - self.z * s,
            z: self.y * s + self.z * c,
            radius: self.radius,
        }
    }
}

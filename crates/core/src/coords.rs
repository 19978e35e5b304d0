//! Celestial and terrestrial coordinate types.

use crate::angles::{acos_clamped, floored_mod, mod2pi, normalize_degrees};
use crate::constants::HOURS_TO_DEGREES;
use crate::matrix::Matrix3x3;
use crate::vector::{self, Vector3};

/// Right ascension and declination in degrees.
///
/// `ra` lies in `[0, 360)` and `dec` in `[-90, 90]` for every value built
/// through the constructors below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaDec {
    pub ra: f64,
    pub dec: f64,
}

impl RaDec {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// Direction of a cartesian vector of any length.
    ///
    /// The zero vector has no direction and maps to `(0, 0)`.
    pub fn from_cartesian(v: &Vector3) -> Self {
        let ra = normalize_degrees(mod2pi(v[1].atan2(v[0])).to_degrees());
        let dec = v[2].atan2(v[0].hypot(v[1])).to_degrees();
        Self { ra, dec }
    }

    /// Point on the unit celestial sphere.
    pub fn to_geocentric(&self) -> Vector3 {
        geocentric_coords(self.ra, self.dec)
    }
}

/// Right ascension in degrees from hours, minutes and seconds.
pub fn ra_degrees_from_hms(hours: f64, minutes: f64, seconds: f64) -> f64 {
    HOURS_TO_DEGREES * (hours + minutes / 60.0 + seconds / 3_600.0)
}

/// Declination in degrees from degrees, minutes and seconds; the sign of `degrees` applies to all parts.
pub fn dec_degrees_from_dms(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    let magnitude = degrees.abs() + minutes / 60.0 + seconds / 3_600.0;
    if degrees.is_sign_negative() { -magnitude } else { magnitude }
}

/// Unit vector for an RA/Dec pair given in degrees.
pub fn geocentric_coords(ra_deg: f64, dec_deg: f64) -> Vector3 {
    let (sin_ra, cos_ra) = ra_deg.to_radians().sin_cos();
    let (sin_dec, cos_dec) = dec_deg.to_radians().sin_cos();
    [cos_ra * cos_dec, sin_ra * cos_dec, sin_dec]
}

/// Rotation by `degrees` about a unit `axis`.
pub fn rotation_matrix(degrees: f64, axis: &Vector3) -> Matrix3x3 {
    let (s, c) = degrees.to_radians().sin_cos();
    let m = 1.0 - c;
    let [x, y, z] = *axis;
    let (xs, ys, zs) = (x * s, y * s, z * s);
    let (xm, ym, zm) = (x * m, y * m, z * m);
    let (xym, yzm, zxm) = (x * ym, y * zm, z * xm);
    Matrix3x3::from_rows(
        [x * xm + c, xym + zs, zxm - ys],
        [xym - zs, y * ym + c, yzm + xs],
        [zxm + ys, yzm - xs, z * zm + c],
    )
}

/// Observer location in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLong {
    latitude: f64,
    longitude: f64,
}

impl LatLong {
    /// Latitude is clamped to `[-90, 90]`; longitude is wrapped into `[-180, 180)`.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: floored_mod(longitude + 180.0, 360.0) - 180.0,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle separation from `other`, in degrees.
    pub fn distance_from(&self, other: &LatLong) -> f64 {
        let a = geocentric_coords(self.longitude, self.latitude);
        let b = geocentric_coords(other.longitude, other.latitude);
        acos_clamped(vector::cosine_similarity(&a, &b)).to_degrees()
    }
}

impl Default for LatLong {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latlong_is_normalized() {
        let p = LatLong::new(95.0, 190.0);
        assert_eq!(p.latitude(), 90.0);
        assert!((p.longitude() + 170.0).abs() < 1e-12);
        assert!((LatLong::new(0.0, -190.0).longitude() - 170.0).abs() < 1e-12);
        assert_eq!(LatLong::new(10.0, 180.0).longitude(), -180.0);
    }

    #[test]
    fn latlong_distance_is_great_circle_degrees() {
        let origin = LatLong::new(0.0, 0.0);
        assert!((origin.distance_from(&LatLong::new(0.0, 90.0)) - 90.0).abs() < 1e-9);
        assert!((origin.distance_from(&LatLong::new(-45.0, 0.0)) - 45.0).abs() < 1e-9);
        assert_eq!(origin.distance_from(&origin), 0.0);
    }

    #[test]
    fn radec_round_trips_through_unit_sphere() {
        let original = RaDec::new(201.5, -33.25);
        let v = original.to_geocentric();
        assert!((vector::norm(&v) - 1.0).abs() < 1e-12);
        let back = RaDec::from_cartesian(&v);
        assert!((back.ra - original.ra).abs() < 1e-9);
        assert!((back.dec - original.dec).abs() < 1e-9);
    }

    #[test]
    fn degenerate_vectors_have_finite_directions() {
        let zero = RaDec::from_cartesian(&[0.0, 0.0, 0.0]);
        assert_eq!((zero.ra, zero.dec), (0.0, 0.0));
        let pole = RaDec::from_cartesian(&[0.0, 0.0, -3.0]);
        assert_eq!(pole.dec, -90.0);
        assert!(pole.ra.is_finite());
    }

    #[test]
    fn hms_and_dms_helpers() {
        assert!((ra_degrees_from_hms(9.0, 4.0, 15.0) - 136.0625).abs() < 1e-9);
        assert!((dec_degrees_from_dms(-4.0, 30.0, 0.0) + 4.5).abs() < 1e-12);
    }

    #[test]
    fn rotation_about_z_turns_x_clockwise() {
        let r = rotation_matrix(90.0, &[0.0, 0.0, 1.0]);
        let v = r * [1.0, 0.0, 0.0];
        assert!(v[0].abs() < 1e-12 && (v[1] + 1.0).abs() < 1e-12 && v[2].abs() < 1e-12);
        let back = rotation_matrix(-90.0, &[0.0, 0.0, 1.0]) * v;
        assert!((back[0] - 1.0).abs() < 1e-12);
    }
}

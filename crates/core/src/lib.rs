//! Core angles, time scales, vectors and coordinate primitives for the sky map engine.

pub mod coords;
pub mod matrix;

pub use coords::{LatLong, RaDec, geocentric_coords, rotation_matrix};
pub use matrix::Matrix3x3;

/// Astronomical and calendar constants.
pub mod constants {
    /// Julian day of the J2000.0 epoch (2000-01-01 12:00 TT).
    pub const J2000_JD: f64 = 2_451_545.0;
    /// Days in a Julian century.
    pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
    /// Julian day of the Unix epoch.
    pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
    /// Obliquity of the ecliptic at J2000, in degrees.
    pub const OBLIQUITY_J2000_DEG: f64 = 23.439_281;
    /// Right ascension hours to degrees.
    pub const HOURS_TO_DEGREES: f64 = 15.0;

    pub const SECONDS_PER_SECOND: f64 = 1.0;
    pub const SECONDS_PER_MINUTE: f64 = 60.0;
    pub const SECONDS_PER_10_MINUTES: f64 = 600.0;
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    pub const SECONDS_PER_WEEK: f64 = 604_800.0;

    pub const MILLIS_PER_SECOND: i64 = 1_000;
    pub const MILLIS_PER_MINUTE: i64 = 60_000;
    pub const MILLIS_PER_HOUR: i64 = 3_600_000;
    pub const MILLIS_PER_DAY: i64 = 86_400_000;
}

/// Angle normalization and guarded inverse trigonometry.
pub mod angles {
    use std::f64::consts::TAU;

    /// Wrap an angle in radians into `[0, 2π)`, including negative inputs.
    #[inline]
    pub fn mod2pi(x: f64) -> f64 {
        let r = x.rem_euclid(TAU);
        // rem_euclid rounds tiny negative inputs up to TAU itself
        if r >= TAU { 0.0 } else { r }
    }

    /// Wrap an angle in degrees into `[0, 360)`.
    #[inline]
    pub fn normalize_degrees(x: f64) -> f64 {
        let r = x.rem_euclid(360.0);
        if r >= 360.0 { 0.0 } else { r }
    }

    /// Modulus whose result takes the sign of the divisor.
    #[inline]
    pub fn floored_mod(a: f64, n: f64) -> f64 {
        a - n * (a / n).floor()
    }

    /// `acos` with its argument clamped to `[-1, 1]`.
    #[inline]
    pub fn acos_clamped(x: f64) -> f64 {
        x.clamp(-1.0, 1.0).acos()
    }

    /// `asin` with its argument clamped to `[-1, 1]`.
    #[inline]
    pub fn asin_clamped(x: f64) -> f64 {
        x.clamp(-1.0, 1.0).asin()
    }
}

/// Julian dates, sidereal time and instant conversions.
pub mod time {
    use chrono::{DateTime, Datelike, Timelike, Utc};
    use thiserror::Error;

    use super::angles::normalize_degrees;
    use super::constants::{
        DAYS_PER_JULIAN_CENTURY, J2000_JD, MILLIS_PER_DAY, UNIX_EPOCH_JD,
    };

    /// Errors raised when converting between numeric time scales and calendar instants.
    #[derive(Debug, Error, Clone, PartialEq)]
    pub enum TimeError {
        #[error("{millis} ms since the epoch is outside the representable range")]
        OutOfRange { millis: i64 },
        #[error("julian day {0} cannot be represented as a calendar instant")]
        InvalidJulianDay(f64),
    }

    /// Julian day of a UTC instant.
    ///
    /// Uses the integer calendar formula valid from 1900 to 2099; the hour
    /// fraction includes minutes and whole seconds.
    pub fn julian_day(instant: &DateTime<Utc>) -> f64 {
        let year = f64::from(instant.year());
        let month = f64::from(instant.month());
        let day = f64::from(instant.day());
        let hour = f64::from(instant.hour())
            + f64::from(instant.minute()) / 60.0
            + f64::from(instant.second()) / 3_600.0;

        367.0 * year - (7.0 * (year + ((month + 9.0) / 12.0).floor()) / 4.0).floor()
            + (275.0 * month / 9.0).floor()
            + day
            + 1_721_013.5
            + hour / 24.0
    }

    /// Julian centuries elapsed since J2000.0.
    #[inline]
    pub fn julian_centuries(instant: &DateTime<Utc>) -> f64 {
        (julian_day(instant) - J2000_JD) / DAYS_PER_JULIAN_CENTURY
    }

    /// Calendar instant for a Julian day, rounded to the millisecond.
    pub fn gregorian_date(jd: f64) -> Result<DateTime<Utc>, TimeError> {
        if !jd.is_finite() {
            return Err(TimeError::InvalidJulianDay(jd));
        }
        let millis = ((jd - UNIX_EPOCH_JD) * MILLIS_PER_DAY as f64).round();
        if millis.abs() > i64::MAX as f64 {
            return Err(TimeError::InvalidJulianDay(jd));
        }
        instant_from_millis(millis as i64)
    }

    /// Mean sidereal time in degrees for a longitude (east positive), in `[0, 360)`.
    pub fn mean_sidereal_time(instant: &DateTime<Utc>, longitude_deg: f64) -> f64 {
        let delta = julian_day(instant) - J2000_JD;
        normalize_degrees(280.461 + 360.985_647_37 * delta + longitude_deg)
    }

    /// Convert milliseconds since the Unix epoch into a UTC instant.
    pub fn instant_from_millis(millis: i64) -> Result<DateTime<Utc>, TimeError> {
        DateTime::from_timestamp_millis(millis).ok_or(TimeError::OutOfRange { millis })
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector; units depend on context (AU, unit sphere, sensor units).
    pub type Vector3 = [f64; 3];

    pub const UNIT_X: Vector3 = [1.0, 0.0, 0.0];
    pub const UNIT_Y: Vector3 = [0.0, 1.0, 0.0];
    pub const UNIT_Z: Vector3 = [0.0, 0.0, 1.0];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Squared Euclidean norm.
    #[inline]
    pub fn length2(v: &Vector3) -> f64 {
        dot(v, v)
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Cross product `a × b`.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Reverse a vector.
    #[inline]
    pub fn negate(v: &Vector3) -> Vector3 {
        [-v[0], -v[1], -v[2]]
    }

    /// Unit vector in the direction of `v`; the zero vector is returned unchanged.
    #[inline]
    pub fn normalize(v: &Vector3) -> Vector3 {
        let n = norm(v);
        if n == 0.0 { *v } else { scale(v, 1.0 / n) }
    }

    /// Cosine of the angle between two vectors.
    #[inline]
    pub fn cosine_similarity(a: &Vector3, b: &Vector3) -> f64 {
        dot(a, b) / (length2(a) * length2(b)).sqrt()
    }
}

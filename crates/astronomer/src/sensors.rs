//! Conversions from raw orientation readings to local axes in phone coordinates.

use sky_core::Matrix3x3;
use sky_core::vector::{self, Vector3};

/// Accelerometer reading used before any sample arrives.
pub const INITIAL_DOWN: Vector3 = [0.0, -1.0, -9.0];
/// Magnetometer reading used before any sample arrives.
pub const INITIAL_SOUTH: Vector3 = [0.0, -1.0, 0.0];

/// Squared length below which the field's ground component cannot define north.
const MIN_GROUND_FIELD2: f64 = 1e-12;

/// Local north, up and east expressed in phone coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhoneAxes {
    pub north: Vector3,
    pub up: Vector3,
    pub east: Vector3,
}

impl PhoneAxes {
    /// Axes from gravity and magnetic field; north is the field's component along the ground.
    ///
    /// Returns `None` when the field is parallel to gravity and has no ground component.
    pub fn from_acceleration_and_field(acceleration: &Vector3, magnetic_field: &Vector3) -> Option<Self> {
        let up = vector::normalize(acceleration);
        let to_north = vector::normalize(magnetic_field);
        let rejection = vector::scale(&up, vector::dot(&to_north, &up));
        let ground = vector::sub(&to_north, &rejection);
        if vector::length2(&ground) < MIN_GROUND_FIELD2 {
            return None;
        }
        let north = vector::normalize(&ground);
        let east = vector::cross(&north, &up);
        Some(Self { north, up, east })
    }

    /// Axes from a rotation-vector sample; rows of its matrix are east, north and up.
    pub fn from_rotation_vector(rotation_vector: &[f64; 4]) -> Self {
        let m = rotation_matrix_from_vector(rotation_vector);
        Self {
            east: m.row(0),
            north: m.row(1),
            up: m.row(2),
        }
    }

    /// `[north, up, east]` as rows, which inverts the orthonormal column matrix.
    pub fn inverse_matrix(&self) -> Matrix3x3 {
        Matrix3x3::from_rows(self.north, self.up, self.east)
    }
}

/// Rotation matrix for a unit quaternion stored as `(x, y, z, w)`.
pub fn rotation_matrix_from_vector(rotation_vector: &[f64; 4]) -> Matrix3x3 {
    let [q1, q2, q3, q0] = *rotation_vector;

    let sq_q1 = 2.0 * q1 * q1;
    let sq_q2 = 2.0 * q2 * q2;
    let sq_q3 = 2.0 * q3 * q3;
    let q1_q2 = 2.0 * q1 * q2;
    let q3_q0 = 2.0 * q3 * q0;
    let q1_q3 = 2.0 * q1 * q3;
    let q2_q0 = 2.0 * q2 * q0;
    let q2_q3 = 2.0 * q2 * q3;
    let q1_q0 = 2.0 * q1 * q0;

    Matrix3x3::from_rows(
        [1.0 - sq_q2 - sq_q3, q1_q2 - q3_q0, q1_q3 + q2_q0],
        [q1_q2 + q3_q0, 1.0 - sq_q1 - sq_q3, q2_q3 - q1_q0],
        [q1_q3 - q2_q0, q2_q3 + q1_q0, 1.0 - sq_q1 - sq_q2],
    )
}

/// Copy up to four components of a raw sample over `current`.
///
/// Three-component samples keep the previous scalar part.
pub fn truncate_rotation_vector(sample: &[f64], current: &[f64; 4]) -> [f64; 4] {
    let mut out = *current;
    for (slot, value) in out.iter_mut().zip(sample.iter().take(4)) {
        *slot = *value;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &Vector3, b: &Vector3) -> bool {
        vector::norm(&vector::sub(a, b)) < 1e-9
    }

    #[test]
    fn identity_quaternion_is_identity_matrix() {
        assert_eq!(rotation_matrix_from_vector(&[0.0, 0.0, 0.0, 1.0]), Matrix3x3::IDENTITY);
    }

    #[test]
    fn quarter_turn_about_z() {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let m = rotation_matrix_from_vector(&[0.0, 0.0, h, h]);
        assert!(close(&m.mul_vector(&vector::UNIT_X), &vector::UNIT_Y));
        assert!((m.determinant() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flat_phone_axes_from_sensors() {
        let axes =
            PhoneAxes::from_acceleration_and_field(&[0.0, 0.0, 9.81], &[0.0, 22.0, -40.0]).unwrap();
        assert!(close(&axes.up, &vector::UNIT_Z));
        assert!(close(&axes.north, &vector::UNIT_Y));
        assert!(close(&axes.east, &vector::UNIT_X));

        let from_rv = PhoneAxes::from_rotation_vector(&[0.0, 0.0, 0.0, 1.0]);
        assert!(close(&from_rv.north, &axes.north));
        assert!(close(&from_rv.east, &axes.east));
    }

    #[test]
    fn vertical_field_defines_no_north() {
        assert!(PhoneAxes::from_acceleration_and_field(&[0.0, 0.0, 9.81], &[0.0, 0.0, -45.0]).is_none());
        assert!(PhoneAxes::from_acceleration_and_field(&[0.0, 0.0, 9.81], &[0.0, 1e-3, -45.0]).is_some());
    }

    #[test]
    fn oversized_samples_are_truncated() {
        let out = truncate_rotation_vector(&[0.1, 0.2, 0.3, 0.4, 0.9], &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(out, [0.1, 0.2, 0.3, 0.4]);
        let out = truncate_rotation_vector(&[0.5, 0.5, 0.5], &[1.0, 0.0, 0.0, 0.25]);
        assert_eq!(out, [0.5, 0.5, 0.5, 0.25]);
    }
}

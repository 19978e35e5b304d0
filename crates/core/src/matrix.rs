//! 3×3 matrices for frame changes between phone, local and celestial axes.

use std::ops::Mul;

use crate::vector::Vector3;

/// Threshold below which a matrix is treated as singular.
const SINGULAR_DETERMINANT: f64 = 1e-5;

/// Row-major 3×3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3x3 {
    pub rows: [[f64; 3]; 3],
}

impl Matrix3x3 {
    pub const IDENTITY: Matrix3x3 = Matrix3x3 {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Build a matrix whose columns are the given vectors.
    pub fn from_columns(c1: Vector3, c2: Vector3, c3: Vector3) -> Self {
        Self {
            rows: [
                [c1[0], c2[0], c3[0]],
                [c1[1], c2[1], c3[1]],
                [c1[2], c2[2], c3[2]],
            ],
        }
    }

    /// Build a matrix whose rows are the given vectors.
    pub fn from_rows(r1: Vector3, r2: Vector3, r3: Vector3) -> Self {
        Self { rows: [r1, r2, r3] }
    }

    pub fn row(&self, i: usize) -> Vector3 {
        self.rows[i]
    }

    pub fn column(&self, j: usize) -> Vector3 {
        [self.rows[0][j], self.rows[1][j], self.rows[2][j]]
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.rows;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Inverse via the adjugate, or `None` when the matrix is (nearly) singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < SINGULAR_DETERMINANT {
            return None;
        }
        let m = &self.rows;
        let inv = 1.0 / det;
        Some(Self {
            rows: [
                [
                    (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv,
                    (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv,
                    (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv,
                ],
                [
                    (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv,
                    (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv,
                    (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv,
                ],
                [
                    (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv,
                    (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv,
                    (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv,
                ],
            ],
        })
    }

    pub fn transpose(&self) -> Self {
        Self::from_rows(self.column(0), self.column(1), self.column(2))
    }

    pub fn mul_vector(&self, v: &Vector3) -> Vector3 {
        let m = &self.rows;
        [
            m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
            m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
            m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
        ]
    }

    pub fn mul_matrix(&self, other: &Self) -> Self {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.rows[i][k] * other.rows[k][j]).sum();
            }
        }
        Self { rows }
    }
}

impl Mul for Matrix3x3 {
    type Output = Matrix3x3;

    fn mul(self, rhs: Matrix3x3) -> Matrix3x3 {
        self.mul_matrix(&rhs)
    }
}

impl Mul<Vector3> for Matrix3x3 {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        self.mul_vector(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &Matrix3x3, b: &Matrix3x3) -> bool {
        a.rows
            .iter()
            .flatten()
            .zip(b.rows.iter().flatten())
            .all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let m = Matrix3x3::from_rows([1.0, 2.0, 4.0], [6.0, 8.0, 10.0], [1.0, 0.5, 3.0]);
        let inv = m.inverse().expect("invertible");
        assert!(close(&(m * inv), &Matrix3x3::IDENTITY));
        assert!(close(&(inv * m), &Matrix3x3::IDENTITY));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Matrix3x3::from_rows([1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 1.0, 1.0]);
        assert_eq!(m.determinant(), 0.0);
        assert!(m.inverse().is_none());
    }

    #[test]
    fn columns_and_rows_are_transposes() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let c = [7.0, 8.0, 9.0];
        let by_cols = Matrix3x3::from_columns(a, b, c);
        let by_rows = Matrix3x3::from_rows(a, b, c);
        assert_eq!(by_cols.transpose(), by_rows);
        assert_eq!(by_cols * [1.0, 0.0, 0.0], a);
        assert_eq!(by_rows * [0.0, 1.0, 0.0], [2.0, 5.0, 8.0]);
    }
}

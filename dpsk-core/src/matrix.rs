//! Fixed-size 2x2 real matrix backing the I/Q decorrelation step.

use std::fmt;
use std::ops::Mul;

use num_complex::Complex64;

use crate::errors::MatrixError;

/// Determinants below this magnitude are treated as singular.
const SINGULARITY_EPSILON: f64 = 1e-12;

/// A 2x2 real matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix2 {
    rows: [[f64; 2]; 2],
}

impl Matrix2 {
    pub const fn new(rows: [[f64; 2]; 2]) -> Self {
        Self { rows }
    }

    pub const fn identity() -> Self {
        Self::new([[1.0, 0.0], [0.0, 1.0]])
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }

    pub fn put(&mut self, row: usize, col: usize, value: f64) {
        self.rows[row][col] = value;
    }

    pub fn determinant(&self) -> f64 {
        self.rows[0][0] * self.rows[1][1] - self.rows[0][1] * self.rows[1][0]
    }

    /// Invert the matrix, failing when it is singular.
    pub fn invert(&self) -> Result<Matrix2, MatrixError> {
        let determinant = self.determinant();
        if determinant.abs() < SINGULARITY_EPSILON {
            return Err(MatrixError::Singular { determinant });
        }
        let scale = 1.0 / determinant;
        Ok(Self::new([
            [self.rows[1][1] * scale, -self.rows[0][1] * scale],
            [-self.rows[1][0] * scale, self.rows[0][0] * scale],
        ]))
    }

    /// Multiply the matrix with an (I, Q) pair treated as a column vector.
    pub fn apply(&self, iq: Complex64) -> Complex64 {
        Complex64::new(
            self.rows[0][0] * iq.re + self.rows[0][1] * iq.im,
            self.rows[1][0] * iq.re + self.rows[1][1] * iq.im,
        )
    }
}

impl Mul for Matrix2 {
    type Output = Matrix2;

    fn mul(self, rhs: Matrix2) -> Matrix2 {
        let mut rows = [[0.0; 2]; 2];
        for (row, out) in rows.iter_mut().enumerate() {
            for (col, cell) in out.iter_mut().enumerate() {
                *cell = self.rows[row][0] * rhs.rows[0][col] + self.rows[row][1] * rhs.rows[1][col];
            }
        }
        Matrix2::new(rows)
    }
}

impl fmt::Display for Matrix2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{:.6} {:.6}]", self.rows[0][0], self.rows[0][1])?;
        write!(f, "[{:.6} {:.6}]", self.rows[1][0], self.rows[1][1])
    }
}

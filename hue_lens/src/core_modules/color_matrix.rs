// THEORY:
// A `ColorMatrix` is a 3x3 linear map over normalized RGB. Every step of the
// correction engine is one: simulation is a matrix, error redistribution is a
// matrix, and because both are linear their composition is a single matrix that a
// rendering surface can apply on its own. This module keeps the arithmetic in one
// place so the per-pixel path and the surface path share it.

use serde::{Deserialize, Serialize};

pub type Vector3 = [f32; 3];

/// Row-major 3x3 matrix; `m[row][col]`, output channel = row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorMatrix {
    pub m: [[f32; 3]; 3],
}

impl ColorMatrix {
    pub const IDENTITY: ColorMatrix = ColorMatrix::new([
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ]);

    pub const ZERO: ColorMatrix = ColorMatrix::new([[0.0; 3]; 3]);

    pub const fn new(m: [[f32; 3]; 3]) -> Self {
        Self { m }
    }

    pub fn apply(&self, v: Vector3) -> Vector3 {
        let m = &self.m;
        [
            m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
            m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
            m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
        ]
    }

    pub fn multiply(&self, other: &ColorMatrix) -> ColorMatrix {
        let mut result = [[0.0f32; 3]; 3];
        for (i, row) in result.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        ColorMatrix::new(result)
    }

    pub fn add(&self, other: &ColorMatrix) -> ColorMatrix {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn subtract(&self, other: &ColorMatrix) -> ColorMatrix {
        self.zip_with(other, |a, b| a - b)
    }

    fn zip_with(&self, other: &ColorMatrix, f: impl Fn(f32, f32) -> f32) -> ColorMatrix {
        let mut result = [[0.0f32; 3]; 3];
        for (i, row) in result.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = f(self.m[i][j], other.m[i][j]);
            }
        }
        ColorMatrix::new(result)
    }

    pub fn row_sums(&self) -> Vector3 {
        self.m.map(|row| row.iter().sum())
    }

    pub fn row(&self, index: usize) -> Vector3 {
        self.m[index]
    }

    /// The 20 values of an SVG `feColorMatrix type="matrix"`: each RGB row extended
    /// with a zero alpha column and zero offset, plus an alpha pass-through row.
    pub fn to_svg_values(&self) -> String {
        let mut values = Vec::with_capacity(20);
        for row in &self.m {
            values.extend(row.iter().map(|v| format_coefficient(*v)));
            values.push("0".to_string());
            values.push("0".to_string());
        }
        values.extend(["0", "0", "0", "1", "0"].map(String::from));
        values.join(" ")
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn format_coefficient(value: f32) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

// src/transform.rs
//! Coordinate transformer: joint matrices to position/orientation/scale.
//!
//! Joint transforms arrive as column-major 4x4 float arrays, 16 floats per
//! joint, expressed in the active reference space.

use nalgebra::{Matrix3, Matrix4, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Floats per joint transform.
pub const MATRIX_LEN: usize = 16;

/// Decomposed rigid transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_parts(position: Vector3<f32>, orientation: UnitQuaternion<f32>) -> Self {
        Self {
            position,
            orientation,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        compose(&self.position, &self.orientation, &self.scale)
    }
}

/// Load a column-major 4x4 matrix from `data[offset..offset + 16]`.
pub fn matrix_from_slice(data: &[f32], offset: usize) -> Matrix4<f32> {
    Matrix4::from_column_slice(&data[offset..offset + MATRIX_LEN])
}

/// Write `matrix` column-major into `out[offset..offset + 16]`.
pub fn matrix_to_slice(matrix: &Matrix4<f32>, out: &mut [f32], offset: usize) {
    out[offset..offset + MATRIX_LEN].copy_from_slice(matrix.as_slice());
}

pub fn position_of(matrix: &Matrix4<f32>) -> Vector3<f32> {
    Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)])
}

/// Rotation of the upper 3x3 block with scale removed.
pub fn orientation_of(matrix: &Matrix4<f32>) -> UnitQuaternion<f32> {
    let scale = scale_of(matrix);
    rotation_from_basis(&matrix.fixed_view::<3, 3>(0, 0).into_owned(), &scale)
}

/// Column lengths of the upper 3x3 block. A negative determinant flips the
/// sign of the x scale so that the remaining basis is a proper rotation.
pub fn scale_of(matrix: &Matrix4<f32>) -> Vector3<f32> {
    let basis: Matrix3<f32> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    let mut sx = basis.column(0).norm();
    let sy = basis.column(1).norm();
    let sz = basis.column(2).norm();
    if basis.determinant() < 0.0 {
        sx = -sx;
    }
    Vector3::new(sx, sy, sz)
}

pub fn decompose(matrix: &Matrix4<f32>) -> Pose {
    let scale = scale_of(matrix);
    let basis: Matrix3<f32> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    Pose {
        position: position_of(matrix),
        orientation: rotation_from_basis(&basis, &scale),
        scale,
    }
}

pub fn compose(
    position: &Vector3<f32>,
    orientation: &UnitQuaternion<f32>,
    scale: &Vector3<f32>,
) -> Matrix4<f32> {
    Matrix4::new_translation(position)
        * orientation.to_homogeneous()
        * Matrix4::new_nonuniform_scaling(scale)
}

fn rotation_from_basis(basis: &Matrix3<f32>, scale: &Vector3<f32>) -> UnitQuaternion<f32> {
    if scale.iter().any(|s| s.abs() <= f32::EPSILON) {
        return UnitQuaternion::identity();
    }

    let mut rotation = *basis;
    for (i, s) in scale.iter().enumerate() {
        let mut column = rotation.column_mut(i);
        column /= *s;
    }

    UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation))
}

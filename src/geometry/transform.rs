use nalgebra::{Affine3, Matrix4, RowVector4};
use thiserror::Error;

use super::{FloatType, WorldPoint, WorldVector};

/// Placement of an object in the world, together with its precomputed inverse.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectTransform {
    forward: Affine3<FloatType>,
    inverse: Affine3<FloatType>,
}

#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    #[error("Object transform must be affine, got last row {0}")]
    NotAffine(RowVector4<FloatType>),

    #[error("Object transform is not invertible")]
    NotInvertible,
}

impl ObjectTransform {
    pub fn identity() -> ObjectTransform {
        ObjectTransform {
            forward: Affine3::identity(),
            inverse: Affine3::identity(),
        }
    }

    /// Creates the transform from an object to world matrix.
    pub fn try_new(matrix: Matrix4<FloatType>) -> Result<ObjectTransform, TransformError> {
        let last_row = matrix.row(3).clone_owned();
        if last_row != RowVector4::new(0.0, 0.0, 0.0, 1.0) {
            return Err(TransformError::NotAffine(last_row));
        }

        let forward = Affine3::from_matrix_unchecked(matrix);
        let inverse = forward.try_inverse().ok_or(TransformError::NotInvertible)?;

        Ok(ObjectTransform { forward, inverse })
    }

    pub fn transform_point(&self, p: &WorldPoint) -> WorldPoint {
        self.forward.transform_point(p)
    }

    pub fn transform_vector(&self, v: &WorldVector) -> WorldVector {
        self.forward.transform_vector(v)
    }

    pub fn inverse_transform_point(&self, p: &WorldPoint) -> WorldPoint {
        self.inverse.transform_point(p)
    }

    pub fn inverse_transform_vector(&self, v: &WorldVector) -> WorldVector {
        self.inverse.transform_vector(v)
    }

    /// Transforms an object space normal to world space (multiplies by inverse transpose).
    /// The result is not normalized.
    pub fn transform_normal(&self, n: &WorldVector) -> WorldVector {
        self.inverse.matrix().fixed_view::<3, 3>(0, 0).tr_mul(n)
    }

    /// True if the transform mirrors the object, flipping its triangle winding.
    pub fn is_negative_scale(&self) -> bool {
        self.forward
            .matrix()
            .fixed_view::<3, 3>(0, 0)
            .clone_owned()
            .determinant()
            < 0.0
    }
}

impl Default for ObjectTransform {
    fn default() -> Self {
        ObjectTransform::identity()
    }
}

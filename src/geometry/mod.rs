mod ray_triangle_intersection;
mod transform;
mod triangle;

pub use ray_triangle_intersection::TriangleHit;
pub use transform::{ObjectTransform, TransformError};
pub use triangle::{BarycentricCoordinates, Triangle};

pub type FloatType = f32;
pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;

pub const EPSILON: FloatType = 1e-6;

/// Visibility bit mask of rays and primitives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Visibility(pub u32);

impl Visibility {
    pub const NONE: Visibility = Visibility(0);
    pub const ALL: Visibility = Visibility(u32::MAX);

    /// Returns true if the two masks share at least one set bit.
    pub fn intersects(self, other: Visibility) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::ALL
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Direction of the ray.
    /// Normalized for rays from `Ray::new`, rays moved to object space with
    /// `to_object_space` carry the scale of the object transform.
    pub direction: WorldVector,

    /// Hits further than this distance along the ray are ignored
    pub tmax: FloatType,

    /// Ray time within the shutter interval, 0 (shutter open) to 1 (shutter close)
    pub time: FloatType,

    pub visibility: Visibility,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        Ray {
            origin,
            direction: direction.normalize(),
            tmax: FloatType::INFINITY,
            time: 0.0,
            visibility: Visibility::ALL,
        }
    }

    pub fn with_tmax(self, tmax: FloatType) -> Ray {
        Ray { tmax, ..self }
    }

    pub fn with_time(self, time: FloatType) -> Ray {
        Ray { time, ..self }
    }

    pub fn with_visibility(self, visibility: Visibility) -> Ray {
        Ray { visibility, ..self }
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction * distance
    }

    /// Expresses the ray in the object's local frame, keeping its parameterization:
    /// `point_at(t)` of the result is the object space image of `point_at(t)` of `self`,
    /// so hit distances stay in world units.
    pub fn to_object_space(&self, transform: &ObjectTransform) -> Ray {
        Ray {
            origin: transform.inverse_transform_point(&self.origin),
            direction: transform.inverse_transform_vector(&self.direction),
            ..*self
        }
    }

    /// Expresses the ray in the object's local frame with a normalized direction.
    /// Hit distances of the result are object space distances, `tmax` is rescaled to match.
    pub fn to_object_space_normalized(&self, transform: &ObjectTransform) -> Ray {
        let mut direction = transform.inverse_transform_vector(&self.direction);
        let scale = direction.normalize_mut();
        Ray {
            origin: transform.inverse_transform_point(&self.origin),
            direction,
            tmax: self.tmax * scale,
            ..*self
        }
    }
}

mod local;
mod primary;
mod refine;
mod shading;

use bon::bon;

use crate::{
    geometry::{BarycentricCoordinates, FloatType},
    scene::{ObjectIdx, PrimIdx},
};

pub use local::{HitSelection, LocalHit, LocalIntersection, intersect_local};
pub use primary::intersect;
pub use refine::{RefineError, RefinedHit, refine, refine_local, try_refine, try_refine_local};
pub use shading::{HitKind, ShadingPoint, shader_setup};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrimitiveType {
    MotionTriangle,
}

/// A single ray hit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub t: FloatType,
    pub uv: BarycentricCoordinates,
    pub prim: PrimIdx,
    pub object: ObjectIdx,
    pub primitive_type: PrimitiveType,
}

/// What the caller's traversal should do after a primitive was tested.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraversalControl {
    Continue,
    Stop,
}

/// Space in which distances of local intersections are expressed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LocalDistanceSpace {
    /// Local rays were moved to object space with a normalized direction,
    /// distances are object space lengths.
    #[default]
    Object,
    /// Local hit distances are world space distances (hardware ray tracing style traversal).
    World,
}

/// Switches between alternate intersection code paths.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntersectionConfig {
    /// Re-intersect accepted hits from close to the surface for a more precise hit point.
    pub refine: bool,
    /// Reject primary hits on primitives whose visibility doesn't match the ray.
    pub visibility_culling: bool,
    pub local_distance_space: LocalDistanceSpace,
}

#[bon]
impl IntersectionConfig {
    #[builder]
    pub fn new(
        #[builder(default = true)] refine: bool,
        #[builder(default = true)] visibility_culling: bool,
        #[builder(default)] local_distance_space: LocalDistanceSpace,
    ) -> Self {
        IntersectionConfig {
            refine,
            visibility_culling,
            local_distance_space,
        }
    }
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        IntersectionConfig::builder().build()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;

    #[test]
    fn default_config() {
        let config = IntersectionConfig::default();
        assert!(config.refine);
        assert!(config.visibility_culling);
        assert!(config.local_distance_space == LocalDistanceSpace::Object);
    }

    #[test]
    fn builder_overrides() {
        let config = IntersectionConfig::builder()
            .refine(false)
            .local_distance_space(LocalDistanceSpace::World)
            .build();
        assert!(!config.refine);
        assert!(config.visibility_culling);
        assert!(config.local_distance_space == LocalDistanceSpace::World);
    }
}

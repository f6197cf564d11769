use nalgebra::Unit;

use super::{Intersection, IntersectionConfig, refine, refine_local};
use crate::{
    geometry::{BarycentricCoordinates, FloatType, Ray, WorldPoint, WorldVector},
    scene::{ObjectIdx, ObjectSpace, PrimIdx, SceneData},
};

/// Which query produced an intersection, selects the matching refinement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HitKind {
    /// From `intersect`, distance in world ray parameterization.
    Primary,
    /// From `intersect_local`, distance in the space given by `LocalDistanceSpace`.
    Local,
}

/// Surface point of an accepted hit, in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShadingPoint {
    pub position: WorldPoint,
    /// Flat face normal, oriented by the world space vertex winding.
    pub geometric_normal: Unit<WorldVector>,
    /// Interpolated vertex normal, or the geometric normal for meshes without normals.
    pub normal: Unit<WorldVector>,
    pub uv: BarycentricCoordinates,
    /// Refined hit distance.
    pub t: FloatType,
    pub object: ObjectIdx,
    pub prim: PrimIdx,
    pub time: FloatType,
}

/// Builds the shading point for an intersection of a world space ray.
pub fn shader_setup<S: SceneData + ?Sized>(
    scene: &S,
    config: &IntersectionConfig,
    ray: &Ray,
    isect: &Intersection,
    kind: HitKind,
) -> ShadingPoint {
    let vertices = scene.motion_vertices(isect.object, isect.prim, ray.time);
    let space = scene.object_space(isect.object);

    let refined = match kind {
        HitKind::Primary => refine(config, ray, isect.t, &vertices, space),
        HitKind::Local => refine_local(config, ray, isect.t, &vertices, space),
    };

    let geometric_normal = match space {
        ObjectSpace::TransformApplied => vertices.normal(),
        ObjectSpace::Instanced(transform) => {
            let n = transform.transform_normal(&vertices.normal());
            if transform.is_negative_scale() { -n } else { n }
        }
    };
    let geometric_normal = Unit::new_normalize(geometric_normal);

    let normal = scene
        .motion_normals(isect.object, isect.prim, ray.time)
        .map(|normals| {
            let n = isect.uv.interpolate_triangle(&normals);
            match space {
                ObjectSpace::TransformApplied => n,
                ObjectSpace::Instanced(transform) => transform.transform_normal(&n),
            }
        })
        .and_then(|n| Unit::try_new(n, FloatType::EPSILON))
        .unwrap_or(geometric_normal);

    ShadingPoint {
        position: refined.position,
        geometric_normal,
        normal,
        uv: isect.uv,
        t: refined.t,
        object: isect.object,
        prim: isect.prim,
        time: ray.time,
    }
}

use super::{Intersection, IntersectionConfig, PrimitiveType};
use crate::{
    geometry::Ray,
    scene::{ObjectIdx, PrimIdx, SceneData},
};

/// Intersects a ray with a motion triangle at the ray's time.
///
/// The ray must be in the frame the object's vertices are stored in (see `SceneData::object_space`);
/// for instanced objects use `Ray::to_object_space` so that the hit distance stays in world units.
/// The hit is not refined, that only needs to happen for the hit that gets shaded.
pub fn intersect<S: SceneData + ?Sized>(
    scene: &S,
    config: &IntersectionConfig,
    ray: &Ray,
    object: ObjectIdx,
    prim: PrimIdx,
) -> Option<Intersection> {
    let vertices = scene.motion_vertices(object, prim, ray.time);
    let hit = vertices.intersect(ray)?;

    // Checked after the geometry test, assuming most primitives get culled by node
    // visibility during traversal already.
    if config.visibility_culling && !scene.prim_visibility(object, prim).intersects(ray.visibility)
    {
        return None;
    }

    Some(Intersection {
        t: hit.t,
        uv: hit.uv,
        prim,
        object,
        primitive_type: PrimitiveType::MotionTriangle,
    })
}

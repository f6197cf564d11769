mod motion_mesh;
mod motion_scene;

use crate::geometry::{FloatType, ObjectTransform, Triangle, Visibility, WorldPoint, WorldVector};

pub use motion_mesh::{MotionDataError, MotionMesh};
pub use motion_scene::MotionScene;

index_vec::define_index_type! {
    pub struct ObjectIdx = u32;
}

index_vec::define_index_type! {
    pub struct PrimIdx = u32;
}

/// Frame in which an object's triangle vertices are stored.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ObjectSpace<'a> {
    /// Vertices were already transformed to world space, rays can be used directly.
    TransformApplied,
    /// Vertices are in object space, placed in the world by the transform.
    Instanced(&'a ObjectTransform),
}

/// Scene data the intersection routines read.
///
/// Vertex and normal positions are in the frame given by `object_space`.
/// Out of range object or primitive indices are a contract violation and implementations
/// may panic.
pub trait SceneData {
    /// Triangle vertex positions of a primitive at the given shutter time.
    fn motion_vertices(&self, object: ObjectIdx, prim: PrimIdx, time: FloatType)
    -> Triangle<WorldPoint>;

    /// Per vertex normals of a primitive at the given shutter time, if the object has any.
    /// Not normalized.
    fn motion_normals(
        &self,
        object: ObjectIdx,
        prim: PrimIdx,
        time: FloatType,
    ) -> Option<Triangle<WorldVector>>;

    fn prim_visibility(&self, object: ObjectIdx, prim: PrimIdx) -> Visibility;

    fn object_space(&self, object: ObjectIdx) -> ObjectSpace<'_>;
}

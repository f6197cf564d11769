use index_vec::IndexVec;

use super::{MotionMesh, ObjectIdx, ObjectSpace, PrimIdx, SceneData};
use crate::geometry::{FloatType, ObjectTransform, Triangle, Visibility, WorldPoint, WorldVector};

/// In-memory collection of motion mesh objects.
#[derive(Clone, Debug, Default)]
pub struct MotionScene {
    objects: IndexVec<ObjectIdx, SceneObject>,
}

#[derive(Clone, Debug)]
struct SceneObject {
    mesh: MotionMesh,
    placement: Placement,
}

#[derive(Clone, Debug)]
enum Placement {
    /// Mesh data was moved to world space when the object was added
    Baked,
    Instanced(ObjectTransform),
}

impl MotionScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object whose vertices get transformed to world space right away.
    pub fn add_baked(&mut self, mesh: &MotionMesh, transform: &ObjectTransform) -> ObjectIdx {
        self.push(SceneObject {
            mesh: mesh.transformed(transform),
            placement: Placement::Baked,
        })
    }

    /// Adds an object that keeps its vertices in object space.
    /// Rays need to be moved to object space before intersecting it.
    pub fn add_instanced(&mut self, mesh: MotionMesh, transform: ObjectTransform) -> ObjectIdx {
        self.push(SceneObject {
            mesh,
            placement: Placement::Instanced(transform),
        })
    }

    fn push(&mut self, object: SceneObject) -> ObjectIdx {
        let index = self.objects.push(object);
        log::debug!(
            "Added object {index:?}: {} triangles, {} motion steps, {}",
            self.objects[index].mesh.prim_count(),
            self.objects[index].mesh.step_count(),
            match self.objects[index].placement {
                Placement::Baked => "baked",
                Placement::Instanced(_) => "instanced",
            }
        );
        index
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn objects(&self) -> impl Iterator<Item = ObjectIdx> + use<> {
        self.objects.indices()
    }

    pub fn prims(&self, object: ObjectIdx) -> impl Iterator<Item = PrimIdx> + use<> {
        (0..self.objects[object].mesh.prim_count()).map(PrimIdx::from_usize)
    }

    /// Mesh data of an object, in the frame given by `object_space`.
    pub fn mesh(&self, object: ObjectIdx) -> &MotionMesh {
        &self.objects[object].mesh
    }
}

impl SceneData for MotionScene {
    fn motion_vertices(
        &self,
        object: ObjectIdx,
        prim: PrimIdx,
        time: FloatType,
    ) -> Triangle<WorldPoint> {
        self.objects[object].mesh.vertices_at(prim, time)
    }

    fn motion_normals(
        &self,
        object: ObjectIdx,
        prim: PrimIdx,
        time: FloatType,
    ) -> Option<Triangle<WorldVector>> {
        self.objects[object].mesh.normals_at(prim, time)
    }

    fn prim_visibility(&self, object: ObjectIdx, prim: PrimIdx) -> Visibility {
        self.objects[object].mesh.prim_visibility(prim)
    }

    fn object_space(&self, object: ObjectIdx) -> ObjectSpace<'_> {
        match &self.objects[object].placement {
            Placement::Baked => ObjectSpace::TransformApplied,
            Placement::Instanced(transform) => ObjectSpace::Instanced(transform),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scene::test::{moving_triangle_mesh, stacked_triangles_mesh};

    use assert2::{assert, let_assert};
    use nalgebra::Matrix4;

    fn translation() -> ObjectTransform {
        ObjectTransform::try_new(Matrix4::new_translation(&WorldVector::new(0.0, 0.0, 10.0)))
            .unwrap()
    }

    #[test]
    fn baked_object_is_in_world_space() {
        let mut scene = MotionScene::new();
        let mesh = moving_triangle_mesh();
        let object = scene.add_baked(&mesh, &translation());

        assert!(scene.object_space(object) == ObjectSpace::TransformApplied);
        let vertices = scene.motion_vertices(object, PrimIdx::new(0), 0.0);
        assert!(vertices[2] == WorldPoint::new(0.0, 0.0, 15.0));
    }

    #[test]
    fn instanced_object_keeps_object_space() {
        let mut scene = MotionScene::new();
        let object = scene.add_instanced(moving_triangle_mesh(), translation());

        let_assert!(ObjectSpace::Instanced(transform) = scene.object_space(object));
        assert!(*transform == translation());
        let vertices = scene.motion_vertices(object, PrimIdx::new(0), 0.0);
        assert!(vertices[2] == WorldPoint::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn enumerates_objects_and_prims() {
        let mut scene = MotionScene::new();
        let a = scene.add_instanced(stacked_triangles_mesh(&[1.0, 2.0, 3.0]), translation());
        let b = scene.add_baked(&stacked_triangles_mesh(&[1.0]), &translation());

        assert!(scene.object_count() == 2);
        assert!(scene.objects().collect::<Vec<_>>() == vec![a, b]);
        assert!(scene.prims(a).count() == 3);
        assert!(scene.prims(b).count() == 1);
        assert!(scene.mesh(a).prim_count() == 3);
    }
}

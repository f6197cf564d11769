pub mod geometry;
pub mod intersect;
pub mod scene;
pub mod util;

pub use intersect::{
    HitSelection, Intersection, IntersectionConfig, LocalIntersection, TraversalControl,
    intersect, intersect_local, shader_setup,
};
pub use scene::{MotionMesh, MotionScene, SceneData};

use assert2::debug_assert;
use bon::bon;
use index_vec::IndexVec;
use itertools::Itertools as _;
use thiserror::Error;

use super::PrimIdx;
use crate::geometry::{FloatType, ObjectTransform, Triangle, Visibility, WorldPoint, WorldVector};

/// Triangle mesh with vertex positions (and optionally normals) sampled at several
/// motion steps. Steps are spread evenly over the shutter interval: with `n` steps,
/// step `i` is at time `i / (n - 1)`.
#[derive(Clone, Debug)]
pub struct MotionMesh {
    triangles: IndexVec<PrimIdx, Triangle<usize>>,
    steps: Vec<Vec<WorldPoint>>,
    normal_steps: Option<Vec<Vec<WorldVector>>>,
    prim_visibility: IndexVec<PrimIdx, Visibility>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MotionDataError {
    #[error("Motion mesh needs at least one motion step")]
    NoSteps,

    #[error("Motion step {step} has {actual} vertices, expected {expected}")]
    VertexCountMismatch {
        step: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Triangle {triangle} references vertex {vertex}, but there are only {vertex_count} vertices")]
    VertexIndexOutOfRange {
        triangle: usize,
        vertex: usize,
        vertex_count: usize,
    },

    #[error("Got normals for {actual} motion steps, expected {expected}")]
    NormalStepCountMismatch { expected: usize, actual: usize },

    #[error("Normals of motion step {step} have {actual} entries, expected {expected}")]
    NormalCountMismatch {
        step: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Got visibility for {actual} triangles, expected {expected}")]
    VisibilityCountMismatch { expected: usize, actual: usize },
}

#[bon]
impl MotionMesh {
    /// Creates the mesh, validating that all motion steps describe the same vertices.
    /// Primitives without explicit visibility are visible to all rays.
    #[builder]
    pub fn new(
        triangles: Vec<Triangle<usize>>,
        steps: Vec<Vec<WorldPoint>>,
        normal_steps: Option<Vec<Vec<WorldVector>>>,
        prim_visibility: Option<Vec<Visibility>>,
    ) -> Result<MotionMesh, MotionDataError> {
        let Some(first_step) = steps.first() else {
            return Err(MotionDataError::NoSteps);
        };
        let vertex_count = first_step.len();

        if let Some((step, vertices)) = steps.iter().find_position(|s| s.len() != vertex_count) {
            return Err(MotionDataError::VertexCountMismatch {
                step,
                expected: vertex_count,
                actual: vertices.len(),
            });
        }

        for (triangle, indices) in triangles.iter().enumerate() {
            if let Some(&vertex) = indices.iter().find(|&&i| i >= vertex_count) {
                return Err(MotionDataError::VertexIndexOutOfRange {
                    triangle,
                    vertex,
                    vertex_count,
                });
            }
        }

        if let Some(normal_steps) = &normal_steps {
            if normal_steps.len() != steps.len() {
                return Err(MotionDataError::NormalStepCountMismatch {
                    expected: steps.len(),
                    actual: normal_steps.len(),
                });
            }
            if let Some((step, normals)) = normal_steps
                .iter()
                .find_position(|s| s.len() != vertex_count)
            {
                return Err(MotionDataError::NormalCountMismatch {
                    step,
                    expected: vertex_count,
                    actual: normals.len(),
                });
            }
        }

        let prim_visibility = match prim_visibility {
            Some(v) if v.len() != triangles.len() => {
                return Err(MotionDataError::VisibilityCountMismatch {
                    expected: triangles.len(),
                    actual: v.len(),
                });
            }
            Some(v) => IndexVec::from_vec(v),
            None => IndexVec::from_vec(vec![Visibility::ALL; triangles.len()]),
        };

        log::debug!(
            "Motion mesh: {} triangles, {} vertices, {} motion steps, normals: {}",
            triangles.len(),
            vertex_count,
            steps.len(),
            normal_steps.is_some()
        );

        Ok(MotionMesh {
            triangles: IndexVec::from_vec(triangles),
            steps,
            normal_steps,
            prim_visibility,
        })
    }
}

impl MotionMesh {
    pub fn prim_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn has_normals(&self) -> bool {
        self.normal_steps.is_some()
    }

    /// Vertex positions of a triangle at the given shutter time.
    /// Time is clamped to the shutter interval; at the time of a motion step the stored
    /// positions are returned exactly.
    pub fn vertices_at(&self, prim: PrimIdx, time: FloatType) -> Triangle<WorldPoint> {
        interpolate_steps(
            &self.steps,
            &self.triangles[prim],
            time,
            Triangle::<WorldPoint>::lerp,
        )
    }

    /// Vertex normals of a triangle at the given shutter time, interpolated the same way
    /// as vertex positions. Not normalized.
    pub fn normals_at(&self, prim: PrimIdx, time: FloatType) -> Option<Triangle<WorldVector>> {
        let normal_steps = self.normal_steps.as_ref()?;
        Some(interpolate_steps(
            normal_steps,
            &self.triangles[prim],
            time,
            Triangle::<WorldVector>::lerp,
        ))
    }

    pub fn prim_visibility(&self, prim: PrimIdx) -> Visibility {
        self.prim_visibility[prim]
    }

    /// Returns a copy of this mesh with all positions and normals moved to world space.
    pub(super) fn transformed(&self, transform: &ObjectTransform) -> MotionMesh {
        MotionMesh {
            triangles: self.triangles.clone(),
            steps: self
                .steps
                .iter()
                .map(|step| step.iter().map(|p| transform.transform_point(p)).collect())
                .collect(),
            normal_steps: self.normal_steps.as_ref().map(|normal_steps| {
                normal_steps
                    .iter()
                    .map(|step| step.iter().map(|n| transform.transform_normal(n)).collect())
                    .collect()
            }),
            prim_visibility: self.prim_visibility.clone(),
        }
    }
}

fn interpolate_steps<T: Copy>(
    steps: &[Vec<T>],
    indices: &Triangle<usize>,
    time: FloatType,
    lerp: impl Fn(&Triangle<T>, &Triangle<T>, FloatType) -> Triangle<T>,
) -> Triangle<T> {
    let (step, fraction) = step_position(steps.len(), time);
    let a = indices.map(|&i| steps[step][i]);
    if steps.len() < 2 {
        return a;
    }
    let b = indices.map(|&i| steps[step + 1][i]);
    lerp(&a, &b, fraction)
}

/// Returns index of the motion step preceding `time` and the fraction of the way
/// to the next step.
fn step_position(step_count: usize, time: FloatType) -> (usize, FloatType) {
    debug_assert!(!time.is_nan());
    if step_count < 2 {
        return (0, 0.0);
    }

    let last_step = step_count - 1;
    let position = time.clamp(0.0, 1.0) * last_step as FloatType;
    let step = (position as usize).min(last_step - 1);
    (step, position - step as FloatType)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scene::test::{moving_triangle_mesh, static_triangle_mesh};

    use assert2::{assert, let_assert};
    use test_case::test_case;
    use test_strategy::proptest;

    fn offset(triangle: &Triangle<WorldPoint>, dx: FloatType) -> Triangle<WorldPoint> {
        triangle.map(|p| p + WorldVector::new(dx, 0.0, 0.0))
    }

    #[test_case(0.0, 0 ; "first")]
    #[test_case(0.5, 1 ; "middle")]
    #[test_case(1.0, 2 ; "last")]
    fn exact_at_step_times(time: FloatType, step: usize) {
        let mesh = moving_triangle_mesh();
        let base = mesh.vertices_at(PrimIdx::new(0), 0.0);
        assert!(mesh.vertices_at(PrimIdx::new(0), time) == offset(&base, step as FloatType));
    }

    #[test_case(0.25, 0.5)]
    #[test_case(0.75, 1.5)]
    #[test_case(0.6, 1.2)]
    fn linear_between_steps(time: FloatType, expected_offset: FloatType) {
        let mesh = moving_triangle_mesh();
        let base = mesh.vertices_at(PrimIdx::new(0), 0.0);
        let expected = offset(&base, expected_offset);
        let actual = mesh.vertices_at(PrimIdx::new(0), time);
        for i in 0..3 {
            assert!((actual[i] - expected[i]).norm() < 1e-6);
        }
    }

    #[test_case(-0.5, 0.0 ; "before_shutter")]
    #[test_case(1.5, 2.0 ; "after_shutter")]
    fn clamped_outside_shutter(time: FloatType, expected_offset: FloatType) {
        let mesh = moving_triangle_mesh();
        let base = mesh.vertices_at(PrimIdx::new(0), 0.0);
        assert!(mesh.vertices_at(PrimIdx::new(0), time) == offset(&base, expected_offset));
    }

    #[proptest]
    fn two_steps_interpolate_linearly(#[strategy(0.0f32..=1.0f32)] time: f32) {
        let a = vec![
            WorldPoint::new(1.0, 0.0, 5.0),
            WorldPoint::new(0.0, 1.0, 5.0),
            WorldPoint::new(0.0, 0.0, 5.0),
        ];
        let b: Vec<_> = a
            .iter()
            .map(|p| p + WorldVector::new(-3.0, 0.25, 7.0))
            .collect();
        let mesh = MotionMesh::builder()
            .triangles(vec![Triangle::new(0, 1, 2)])
            .steps(vec![a.clone(), b.clone()])
            .build()
            .unwrap();

        let expected = Triangle::new(a[0], a[1], a[2]).lerp(&Triangle::new(b[0], b[1], b[2]), time);
        assert!(mesh.vertices_at(PrimIdx::new(0), time) == expected);
    }

    #[proptest]
    fn single_step_is_static(#[strategy(0.0f32..=1.0f32)] time: f32) {
        let mesh = static_triangle_mesh();
        let prim = PrimIdx::new(0);
        assert!(mesh.vertices_at(prim, time) == mesh.vertices_at(prim, 0.0));
        assert!(mesh.normals_at(prim, time) == None);
    }

    #[test]
    fn normals_interpolate() {
        let mesh = moving_triangle_mesh();
        let_assert!(Some(normals) = mesh.normals_at(PrimIdx::new(0), 0.25));
        for i in 0..3 {
            assert!((normals[i] - WorldVector::new(0.25, 0.0, 1.0)).norm() < 1e-6);
        }
    }

    #[test]
    fn default_visibility() {
        let mesh = static_triangle_mesh();
        assert!(mesh.prim_visibility(PrimIdx::new(0)) == Visibility::ALL);
    }

    #[test]
    fn transformed_moves_positions_and_normals() {
        let transform = ObjectTransform::try_new(nalgebra::Matrix4::new_nonuniform_scaling(
            &WorldVector::new(2.0, 1.0, 1.0),
        ))
        .unwrap();
        let mesh = moving_triangle_mesh();
        let world = mesh.transformed(&transform);

        let local = mesh.vertices_at(PrimIdx::new(0), 0.5);
        let expected = local.map(|p| transform.transform_point(p));
        assert!(world.vertices_at(PrimIdx::new(0), 0.5) == expected);

        let_assert!(Some(normals) = world.normals_at(PrimIdx::new(0), 1.0));
        assert!(normals[0] == WorldVector::new(0.5, 0.0, 1.0));
    }

    #[test]
    fn no_steps() {
        let result = MotionMesh::builder()
            .triangles(vec![])
            .steps(vec![])
            .build();
        assert!(let Err(MotionDataError::NoSteps) = result);
    }

    #[test]
    fn vertex_count_mismatch() {
        let result = MotionMesh::builder()
            .triangles(vec![Triangle::new(0, 1, 2)])
            .steps(vec![vec![WorldPoint::origin(); 3], vec![WorldPoint::origin(); 4]])
            .build();
        assert!(
            result.unwrap_err()
                == MotionDataError::VertexCountMismatch {
                    step: 1,
                    expected: 3,
                    actual: 4
                }
        );
    }

    #[test]
    fn vertex_index_out_of_range() {
        let result = MotionMesh::builder()
            .triangles(vec![Triangle::new(0, 1, 2), Triangle::new(1, 2, 3)])
            .steps(vec![vec![WorldPoint::origin(); 3]])
            .build();
        assert!(
            result.unwrap_err()
                == MotionDataError::VertexIndexOutOfRange {
                    triangle: 1,
                    vertex: 3,
                    vertex_count: 3
                }
        );
    }

    #[test]
    fn normal_step_count_mismatch() {
        let result = MotionMesh::builder()
            .triangles(vec![Triangle::new(0, 1, 2)])
            .steps(vec![vec![WorldPoint::origin(); 3]; 2])
            .normal_steps(vec![vec![WorldVector::z(); 3]])
            .build();
        assert!(
            result.unwrap_err()
                == MotionDataError::NormalStepCountMismatch {
                    expected: 2,
                    actual: 1
                }
        );
    }

    #[test]
    fn normal_count_mismatch() {
        let result = MotionMesh::builder()
            .triangles(vec![Triangle::new(0, 1, 2)])
            .steps(vec![vec![WorldPoint::origin(); 3]])
            .normal_steps(vec![vec![WorldVector::z(); 2]])
            .build();
        assert!(
            result.unwrap_err()
                == MotionDataError::NormalCountMismatch {
                    step: 0,
                    expected: 3,
                    actual: 2
                }
        );
    }

    #[test]
    fn visibility_count_mismatch() {
        let result = MotionMesh::builder()
            .triangles(vec![Triangle::new(0, 1, 2)])
            .steps(vec![vec![WorldPoint::origin(); 3]])
            .prim_visibility(vec![])
            .build();
        assert!(
            result.unwrap_err()
                == MotionDataError::VisibilityCountMismatch {
                    expected: 1,
                    actual: 0
                }
        );
    }
}

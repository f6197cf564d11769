use arrayvec::ArrayVec;
use assert2::debug_assert;
use nalgebra::Unit;
use rand::RngCore;

use super::{Intersection, PrimitiveType, TraversalControl};
use crate::{
    geometry::{Ray, WorldVector},
    scene::{ObjectIdx, PrimIdx, SceneData},
};

/// Hit recorded by a local intersection query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LocalHit {
    pub isect: Intersection,
    /// Flat face normal of the triangle at the ray time.
    pub normal: Unit<WorldVector>,
}

/// Hits gathered during one local traversal, up to `N` of them.
#[derive(Clone, Debug, Default)]
pub struct LocalIntersection<const N: usize> {
    hits: ArrayVec<LocalHit, N>,
    num_hits: usize,
}

impl<const N: usize> LocalIntersection<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hits currently kept.
    pub fn hits(&self) -> &[LocalHit] {
        &self.hits
    }

    /// Number of distinct hits seen so far. Can exceed the number of hits kept.
    pub fn num_hits(&self) -> usize {
        self.num_hits
    }

    pub fn clear(&mut self) {
        self.hits.clear();
        self.num_hits = 0;
    }

    fn store(&mut self, slot: usize, hit: LocalHit) {
        debug_assert!(slot <= self.hits.len());
        if slot < self.hits.len() {
            self.hits[slot] = hit;
        } else {
            self.hits.push(hit);
        }
    }
}

/// How `intersect_local` picks the hits to keep.
pub enum HitSelection<'a> {
    /// Keep only the closest hit.
    Closest,
    /// Keep up to `max_hits` hits, uniformly sampled from all distinct hits seen.
    Reservoir(&'a mut dyn RngCore),
}

/// Intersects a ray with a single motion triangle of an object and records the hit
/// in the accumulator.
///
/// The ray must be in the frame of the object's vertices. For instanced objects this is
/// `Ray::to_object_space_normalized` (or `Ray::to_object_space` when local distances are
/// world distances, see `LocalDistanceSpace`).
///
/// With `max_hits == 0` the caller only wants to know if there is any hit; traversal
/// stops on the first one and the accumulator is not touched.
/// Otherwise traversal always continues.
pub fn intersect_local<S: SceneData + ?Sized, const N: usize>(
    scene: &S,
    ray: &Ray,
    object: ObjectIdx,
    prim: PrimIdx,
    local: &mut LocalIntersection<N>,
    selection: HitSelection<'_>,
    max_hits: usize,
) -> TraversalControl {
    debug_assert!(max_hits <= N, "max_hits exceeds accumulator capacity");

    let vertices = scene.motion_vertices(object, prim, ray.time);
    let Some(hit) = vertices.intersect(ray) else {
        return TraversalControl::Continue;
    };

    if max_hits == 0 {
        return TraversalControl::Stop;
    }

    let slot = match selection {
        HitSelection::Reservoir(rng) => {
            let stored = max_hits.min(local.num_hits);
            if local.hits[..stored].iter().any(|h| h.isect.t == hit.t) {
                return TraversalControl::Continue;
            }

            local.num_hits += 1;
            if local.num_hits <= max_hits {
                local.num_hits - 1
            } else {
                let draw = (u64::from(rng.next_u32()) % local.num_hits as u64) as usize;
                if draw >= max_hits {
                    return TraversalControl::Continue;
                }
                log::trace!(
                    "Hit {} of {:?} replaces slot {draw} ({} hits so far)",
                    hit.t,
                    prim,
                    local.num_hits
                );
                draw
            }
        }
        HitSelection::Closest => {
            if local.num_hits > 0 && local.hits.first().is_some_and(|h| h.isect.t < hit.t) {
                return TraversalControl::Continue;
            }
            local.hits.truncate(1);
            local.num_hits = 1;
            0
        }
    };

    local.store(
        slot,
        LocalHit {
            isect: Intersection {
                t: hit.t,
                uv: hit.uv,
                prim,
                object,
                primitive_type: PrimitiveType::MotionTriangle,
            },
            normal: vertices.face_normal(),
        },
    );

    TraversalControl::Continue
}

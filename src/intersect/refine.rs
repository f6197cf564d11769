//! Refinement of hit points.
//!
//! For rays that travel far, the hit point computed by the first intersection test
//! is often imprecise. Refinement moves to the approximate hit point and re-intersects
//! the triangle plane from there, which is much better conditioned.

use thiserror::Error;

use super::{IntersectionConfig, LocalDistanceSpace};
use crate::{
    geometry::{FloatType, Ray, Triangle, WorldPoint, WorldVector},
    scene::ObjectSpace,
};

/// Refined hit position in world space and the matching distance along the ray.
/// The distance is in the same units as the distance that was refined.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RefinedHit {
    pub position: WorldPoint,
    pub t: FloatType,
}

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum RefineError {
    #[error("Hit refinement is numerically degenerate")]
    Degenerate,
}

/// Refines a hit at distance `t` along a world space ray, falling back to the unrefined
/// hit point if the refinement is degenerate.
pub fn refine(
    config: &IntersectionConfig,
    ray: &Ray,
    t: FloatType,
    vertices: &Triangle<WorldPoint>,
    space: ObjectSpace<'_>,
) -> RefinedHit {
    try_refine(config, ray, t, vertices, space).unwrap_or_else(|err| {
        log::debug!("{err} (t = {t}), using unrefined hit point");
        RefinedHit {
            position: ray.point_at(t),
            t,
        }
    })
}

/// Refines a hit at distance `t` along a world space ray.
/// `t` is measured in the ray's own parameterization even for instanced objects.
pub fn try_refine(
    config: &IntersectionConfig,
    ray: &Ray,
    t: FloatType,
    vertices: &Triangle<WorldPoint>,
    space: ObjectSpace<'_>,
) -> Result<RefinedHit, RefineError> {
    if !config.refine {
        return Ok(RefinedHit {
            position: ray.point_at(t),
            t,
        });
    }

    match space {
        ObjectSpace::TransformApplied => {
            let (position, rt) = reintersect(&ray.origin, &ray.direction, t, vertices)?;
            Ok(RefinedHit {
                position,
                t: t + rt,
            })
        }
        ObjectSpace::Instanced(transform) => {
            if t == 0.0 {
                return Ok(RefinedHit {
                    position: ray.origin,
                    t,
                });
            }

            let origin = transform.inverse_transform_point(&ray.origin);
            let mut direction = transform.inverse_transform_vector(&(ray.direction * t));
            let object_t = direction.normalize_mut();

            let (position, rt) = reintersect(&origin, &direction, object_t, vertices)?;
            Ok(RefinedHit {
                position: transform.transform_point(&position),
                t: (object_t + rt) * (t / object_t),
            })
        }
    }
}

/// Refines a local hit, falling back to the unrefined hit point if the refinement
/// is degenerate.
pub fn refine_local(
    config: &IntersectionConfig,
    ray: &Ray,
    t: FloatType,
    vertices: &Triangle<WorldPoint>,
    space: ObjectSpace<'_>,
) -> RefinedHit {
    try_refine_local(config, ray, t, vertices, space).unwrap_or_else(|err| {
        log::debug!("{err} (local t = {t}), using unrefined hit point");
        unrefined_local(config, ray, t, space)
    })
}

/// Refines a hit of a local intersection with a world space ray.
/// With `LocalDistanceSpace::Object`, `t` is a distance along the ray moved to object space
/// with normalized direction (see `Ray::to_object_space_normalized`), otherwise it is
/// a world space distance and this is the same as `try_refine`.
pub fn try_refine_local(
    config: &IntersectionConfig,
    ray: &Ray,
    t: FloatType,
    vertices: &Triangle<WorldPoint>,
    space: ObjectSpace<'_>,
) -> Result<RefinedHit, RefineError> {
    if config.local_distance_space == LocalDistanceSpace::World {
        return try_refine(config, ray, t, vertices, space);
    }
    if !config.refine {
        return Ok(unrefined_local(config, ray, t, space));
    }

    match space {
        ObjectSpace::TransformApplied => {
            let (position, rt) = reintersect(&ray.origin, &ray.direction, t, vertices)?;
            Ok(RefinedHit {
                position,
                t: t + rt,
            })
        }
        ObjectSpace::Instanced(transform) => {
            let origin = transform.inverse_transform_point(&ray.origin);
            let direction = transform
                .inverse_transform_vector(&ray.direction)
                .normalize();

            let (position, rt) = reintersect(&origin, &direction, t, vertices)?;
            Ok(RefinedHit {
                position: transform.transform_point(&position),
                t: t + rt,
            })
        }
    }
}

fn unrefined_local(
    config: &IntersectionConfig,
    ray: &Ray,
    t: FloatType,
    space: ObjectSpace<'_>,
) -> RefinedHit {
    let position = match (config.local_distance_space, space) {
        (LocalDistanceSpace::World, _) | (_, ObjectSpace::TransformApplied) => ray.point_at(t),
        (LocalDistanceSpace::Object, ObjectSpace::Instanced(transform)) => {
            let local_ray = ray.to_object_space_normalized(transform);
            transform.transform_point(&local_ray.point_at(t))
        }
    };
    RefinedHit { position, t }
}

/// Moves to the approximate hit point and intersects the triangle plane again from there.
/// Returns the refined point and the distance correction.
fn reintersect(
    origin: &WorldPoint,
    direction: &WorldVector,
    t: FloatType,
    vertices: &Triangle<WorldPoint>,
) -> Result<(WorldPoint, FloatType), RefineError> {
    let p = origin + direction * t;

    let e1 = vertices[0] - vertices[2];
    let e2 = vertices[1] - vertices[2];
    let s1 = direction.cross(&e2);

    let divisor = s1.dot(&e1);
    if divisor == 0.0 {
        return Err(RefineError::Degenerate);
    }
    let inv_divisor = 1.0 / divisor;
    let d = p - vertices[2];
    let s2 = d.cross(&e1);
    let rt = e2.dot(&s2) * inv_divisor;

    let refined = p + direction * rt;
    if !rt.is_finite() || !refined.iter().all(|x| x.is_finite()) {
        return Err(RefineError::Degenerate);
    }

    Ok((refined, rt))
}

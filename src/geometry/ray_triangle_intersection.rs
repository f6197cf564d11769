use super::{BarycentricCoordinates, FloatType, Ray, Triangle, WorldPoint};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleHit {
    pub t: FloatType,
    pub uv: BarycentricCoordinates,
}

impl Triangle<WorldPoint> {
    /// Calculates ray intersection with the (two sided) triangle.
    /// Returns distance along ray and barycentric uv coordinates, only for hits with
    /// distance in (0, ray.tmax].
    /// Edges are taken relative to the last vertex, matching `BarycentricCoordinates`.
    /// Adapted from https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm#Rust_implementation
    pub fn intersect(&self, ray: &Ray) -> Option<TriangleHit> {
        let e1 = self[0] - self[2];
        let e2 = self[1] - self[2];

        let ray_cross_e2 = ray.direction.cross(&e2);
        let det = e1.dot(&ray_cross_e2);

        let inv_det = 1.0 / det; // May be infinite
        let s = ray.origin - self[2];
        let u = inv_det * s.dot(&ray_cross_e2);

        let s_cross_e1 = s.cross(&e1);
        let v = inv_det * ray.direction.dot(&s_cross_e1);
        let t = inv_det * e2.dot(&s_cross_e1);

        // Negated comparisons so that NaNs from parallel rays count as misses
        if !(u >= 0.0 && v >= 0.0 && u + v <= 1.0) {
            return None;
        }
        if !(t > 0.0 && t <= ray.tmax) {
            return None;
        }

        Some(TriangleHit {
            t,
            uv: BarycentricCoordinates { u, v },
        })
    }
}

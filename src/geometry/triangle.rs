use std::ops::{Add, Index, IndexMut, Mul};

use nalgebra::Unit;

use super::{FloatType, WorldPoint, WorldVector};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle<Point>([Point; 3]);

impl<Point> Triangle<Point> {
    pub fn new(a: Point, b: Point, c: Point) -> Triangle<Point> {
        Triangle([a, b, c])
    }

    pub fn iter<'a>(&'a self) -> impl Iterator<Item = &'a Point> {
        self.0.iter()
    }

    pub fn map<Point2, F: FnMut(&Point) -> Point2>(&self, mut f: F) -> Triangle<Point2> {
        Triangle([f(&self[0]), f(&self[1]), f(&self[2])])
    }

    pub fn zip_map<Point2, Point3, F: FnMut(&Point, &Point2) -> Point3>(
        &self,
        rhs: &Triangle<Point2>,
        mut f: F,
    ) -> Triangle<Point3> {
        Triangle([
            f(&self.0[0], &rhs.0[0]),
            f(&self.0[1], &rhs.0[1]),
            f(&self.0[2], &rhs.0[2]),
        ])
    }
}

impl<Point: Default> Default for Triangle<Point> {
    fn default() -> Self {
        Triangle([Default::default(), Default::default(), Default::default()])
    }
}

impl<Point> Index<usize> for Triangle<Point> {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<Point> IndexMut<usize> for Triangle<Point> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Triangle<WorldPoint> {
    /// Returns edge vectors, coming from self[0]
    pub fn edges(&self) -> [WorldVector; 2] {
        [self[1] - self[0], self[2] - self[0]]
    }

    /// Returns a normal vector of the triangle, not normalized.
    pub fn normal(&self) -> WorldVector {
        let [e1, e2] = self.edges();
        e1.cross(&e2)
    }

    /// Returns the flat face normal, oriented by the vertex winding.
    pub fn face_normal(&self) -> Unit<WorldVector> {
        Unit::new_normalize(self.normal())
    }

    /// Linear interpolation between two snapshots of the same triangle.
    /// Exact for `f` equal to 0 or 1.
    pub fn lerp(&self, other: &Self, f: FloatType) -> Self {
        self.zip_map(other, |a, b| a.lerp(b, f))
    }
}

impl Triangle<WorldVector> {
    /// Linear interpolation between two snapshots of per vertex vectors.
    /// Exact for `f` equal to 0 or 1.
    pub fn lerp(&self, other: &Self, f: FloatType) -> Self {
        self.zip_map(other, |a, b| a.lerp(b, f))
    }
}

/// Barycentric coordinates of a point in a triangle.
/// `u` weights the first vertex, `v` the second one and `1 - u - v` the last one.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BarycentricCoordinates {
    pub u: FloatType,
    pub v: FloatType,
}

impl BarycentricCoordinates {
    pub fn w(&self) -> FloatType {
        1.0 - self.u - self.v
    }

    pub fn interpolate<T2>(&self, a: &T2, b: &T2, c: &T2) -> T2
    where
        T2: Copy + Mul<FloatType, Output = T2> + Add<Output = T2>,
    {
        *a * self.u + *b * self.v + *c * self.w()
    }

    pub fn interpolate_triangle<T2>(&self, triangle: &Triangle<T2>) -> T2
    where
        T2: Copy + Mul<FloatType, Output = T2> + Add<Output = T2>,
    {
        self.interpolate(&triangle[0], &triangle[1], &triangle[2])
    }

    /// Point on a triangle given by these coordinates
    pub fn point_on(&self, triangle: &Triangle<WorldPoint>) -> WorldPoint {
        WorldPoint::from(self.interpolate_triangle(&triangle.map(|p| p.coords)))
    }
}

//! Core data types: points, facets, and the simplex mesh

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Index;

use crate::{DEFAULT_TOLERANCE, Result};

/// A point in Euclidean k-dimensional space.
///
/// Immutable once constructed. Within one hull computation a point is
/// identified by its position in the input point sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    coords: Vec<f64>,
}

impl Point {
    /// Create a new point from its coordinates
    pub fn new(coords: Vec<f64>) -> Self {
        Self { coords }
    }

    /// Dimension of the ambient space
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// Coordinates as a slice
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Dot product with another point
    pub fn dot(&self, other: &Point) -> f64 {
        self.coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Coordinate-wise difference
    pub fn sub(&self, other: &Point) -> Point {
        Point::new(
            self.coords
                .iter()
                .zip(&other.coords)
                .map(|(a, b)| a - b)
                .collect(),
        )
    }

    /// Coordinate-wise sum
    pub fn add(&self, other: &Point) -> Point {
        Point::new(
            self.coords
                .iter()
                .zip(&other.coords)
                .map(|(a, b)| a + b)
                .collect(),
        )
    }

    /// Scale by a scalar
    pub fn scale(&self, s: f64) -> Point {
        Point::new(self.coords.iter().map(|v| v * s).collect())
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        self.sub(other).norm()
    }
}

impl From<Vec<f64>> for Point {
    fn from(coords: Vec<f64>) -> Self {
        Point::new(coords)
    }
}

impl Index<usize> for Point {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.coords[i]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v:.6}")?;
        }
        write!(f, ")")
    }
}

/// A facet of the hull: an ordered sequence of exactly `dim` point indices.
///
/// Represents one (dim−1)-dimensional face of the hull (a segment endpoint
/// in 1D, an edge in 2D, a triangle in 3D, and so on). Orientation is not
/// stored; visibility tests derive it from an interior observation point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Facet {
    indices: Vec<usize>,
}

impl Facet {
    /// Create a new facet from point indices
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// Number of vertices (equals the ambient dimension in a valid mesh)
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True if the facet has no vertices
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Point indices as a slice
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Check if this facet contains a point index
    pub fn contains(&self, v: usize) -> bool {
        self.indices.contains(&v)
    }

    /// Number of point indices shared with another facet
    pub fn shared_count(&self, other: &Facet) -> usize {
        self.indices.iter().filter(|v| other.contains(**v)).count()
    }

    /// The point indices shared with another facet, in this facet's order.
    ///
    /// When the two facets are neighbours this is the ridge between them
    /// (a (dim−2)-face, `dim−1` indices).
    pub fn ridge(&self, other: &Facet) -> Vec<usize> {
        self.indices
            .iter()
            .copied()
            .filter(|v| other.contains(*v))
            .collect()
    }
}

/// The result of a convex hull computation: a mesh formed by simplices
/// (edges in 2D, triangles in 3D, tetrahedra in 4D and so on).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplexMesh {
    /// Copy of the input point sequence; facet indices point into it
    points: Vec<Point>,
    /// Facets of the convex hull
    facets: Vec<Facet>,
}

impl SimplexMesh {
    /// Create a mesh from points and facets
    pub(crate) fn new(points: Vec<Point>, facets: Vec<Facet>) -> Self {
        Self { points, facets }
    }

    /// Build a convex hull using the Quickhull algorithm with the
    /// [default tolerance](crate::DEFAULT_TOLERANCE)
    pub fn build(points: &[Point]) -> Result<Self> {
        crate::quickhull::quickhull(points, DEFAULT_TOLERANCE)
    }

    /// Build a convex hull with an explicit tolerance governing
    /// coplanarity and distance comparisons
    pub fn build_with_tolerance(points: &[Point], tolerance: f64) -> Result<Self> {
        crate::quickhull::quickhull(points, tolerance)
    }

    /// Get the points
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Get the facets
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Get the number of facets
    pub fn num_facets(&self) -> usize {
        self.facets.len()
    }

    /// Get the number of points (input points, not hull vertices)
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Dimension of the ambient space
    pub fn dim(&self) -> usize {
        self.points.first().map_or(0, Point::dim)
    }

    /// Indices of all facets containing the given point index
    pub fn facets_with_point(&self, point: usize) -> Vec<usize> {
        self.facets
            .iter()
            .enumerate()
            .filter(|(_, f)| f.contains(point))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of all neighbours of the given facet.
    ///
    /// Two facets are neighbours iff they share exactly `dim−1` point
    /// indices, i.e. a ridge.
    pub fn neighbouring_facets(&self, facet: usize) -> Vec<usize> {
        let dim = self.dim();
        self.facets
            .iter()
            .enumerate()
            .filter(|(i, f)| *i != facet && self.facets[facet].shared_count(f) == dim - 1)
            .map(|(i, _)| i)
            .collect()
    }

    /// Coordinates of the points that define the given facet
    pub fn facet_points(&self, facet: usize) -> Vec<Point> {
        self.facets[facet]
            .indices()
            .iter()
            .map(|&i| self.points[i].clone())
            .collect()
    }

    /// Sorted set of all point indices appearing in any facet
    pub fn hull_vertex_indices(&self) -> BTreeSet<usize> {
        self.facets
            .iter()
            .flat_map(|f| f.indices().iter().copied())
            .collect()
    }
}

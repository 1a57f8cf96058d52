//! Test data for convex hull tests
//!
//! Deterministic polytopes in any dimension plus random point clouds,
//! consumed by the integration tests.

use crate::types::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The 2^dim corners of an axis-aligned hypercube centered at the origin
pub fn hypercube_points(dim: usize, size: f64) -> Vec<Point> {
    let s = size / 2.0;
    (0..1usize << dim)
        .map(|corner| {
            Point::new(
                (0..dim)
                    .map(|axis| if corner >> axis & 1 == 1 { s } else { -s })
                    .collect(),
            )
        })
        .collect()
}

/// The 8 corners of a cube in 3D
pub fn cube_points(size: f64) -> Vec<Point> {
    hypercube_points(3, size)
}

/// Hypercube corners plus random interior points
pub fn hypercube_with_interior_points(dim: usize, size: f64, n_interior: usize) -> Vec<Point> {
    let mut points = hypercube_points(dim, size);
    let mut rng = rand::rng();
    let s = size / 2.0;

    for _ in 0..n_interior {
        points.push(Point::new(
            (0..dim).map(|_| rng.random::<f64>() * size - s).collect(),
        ));
    }

    points
}

/// The 2·dim vertices of the cross-polytope (±e_i); the octahedron in 3D
pub fn cross_polytope_points(dim: usize) -> Vec<Point> {
    let mut points = Vec::with_capacity(2 * dim);
    for sign in [1.0, -1.0] {
        for axis in 0..dim {
            let mut coords = vec![0.0; dim];
            coords[axis] = sign;
            points.push(Point::new(coords));
        }
    }
    points
}

/// The dim+1 vertices of the standard simplex (origin plus unit basis vectors)
pub fn simplex_points(dim: usize) -> Vec<Point> {
    let mut points = vec![Point::new(vec![0.0; dim])];
    for axis in 0..dim {
        let mut coords = vec![0.0; dim];
        coords[axis] = 1.0;
        points.push(Point::new(coords));
    }
    points
}

/// `n` points drawn uniformly from an axis-aligned cube centered at the
/// origin, deterministic in `seed`
pub fn random_cloud_points(dim: usize, n: usize, size: f64, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let s = size / 2.0;

    (0..n)
        .map(|_| Point::new((0..dim).map(|_| rng.random::<f64>() * size - s).collect()))
        .collect()
}

/// Unit square corners followed by the square's centroid (an interior point)
pub fn unit_square_with_centroid() -> Vec<Point> {
    vec![
        Point::new(vec![0.0, 0.0]),
        Point::new(vec![1.0, 0.0]),
        Point::new(vec![1.0, 1.0]),
        Point::new(vec![0.0, 1.0]),
        Point::new(vec![0.5, 0.5]),
    ]
}

/// Generate random points on a sphere in 3D
pub fn random_sphere_points(n: usize, radius: f64) -> Vec<Point> {
    let mut rng = rand::rng();
    let mut points = Vec::with_capacity(n);

    for _ in 0..n {
        let azimuth = rng.random::<f64>() * 2.0 * std::f64::consts::PI;
        let elevation = (rng.random::<f64>() * 2.0 - 1.0).asin();

        points.push(Point::new(vec![
            radius * elevation.cos() * azimuth.cos(),
            radius * elevation.cos() * azimuth.sin(),
            radius * elevation.sin(),
        ]));
    }

    points
}

/// Generate uniformly distributed points on a 3D sphere using a Fibonacci lattice
pub fn fibonacci_sphere_points(n: usize, radius: f64) -> Vec<Point> {
    let mut points = Vec::with_capacity(n);
    let golden_ratio = (1.0 + 5.0_f64.sqrt()) / 2.0;

    for i in 0..n {
        let theta = 2.0 * std::f64::consts::PI * (i as f64) / golden_ratio;
        let phi = ((2 * i + 1) as f64 / n as f64 - 1.0).acos();

        points.push(Point::new(vec![
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
        ]));
    }

    points
}

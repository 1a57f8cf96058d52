//! Quickhull: initial simplex selection and incremental horizon expansion
//!
//! The expansion loop recomputes the hull centroid once per iteration and
//! uses it as the single interior observation point for every visibility
//! test in that iteration, so all facets share one orientation reference.

use crate::geometry::{centroid, orient_away};
use crate::hyperplane::{HyperplaneFit, fit_hyperplane};
use crate::types::{Facet, Point, SimplexMesh};
use crate::{ConvexHullError, Result};
use nalgebra::{DMatrix, SVD};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Safety cap on expansion iterations; each iteration absorbs one point,
/// so a well-formed run never comes close.
const MAX_ITERATIONS: usize = 100_000;

/// Threshold for parallel processing (below this, sequential is faster)
const PARALLEL_THRESHOLD: usize = 100;

/// Compute the convex hull of `points` with the given tolerance.
///
/// Input must hold at least `dim + 1` points of equal dimension
/// `dim >= 1`. Facet order in the result and vertex order within a facet
/// depend on traversal order and are not stable across equivalent inputs.
pub fn quickhull(points: &[Point], tolerance: f64) -> Result<SimplexMesh> {
    let dim = validate_input(points)?;
    let simplex = initial_simplex(points, tolerance)?;
    let mut facets = initial_facets(&simplex);
    // Orientation-free plane fits, cached per facet across iterations;
    // `None` marks facets created since the last fit pass.
    let mut fits: Vec<Option<HyperplaneFit>> = vec![None; facets.len()];

    let mut iterations = 0usize;
    loop {
        iterations += 1;
        if iterations > MAX_ITERATIONS {
            log::error!(
                "expansion did not terminate after {} iterations ({} facets)",
                MAX_ITERATIONS,
                facets.len()
            );
            return Err(ConvexHullError::MaxIterationsExceeded(MAX_ITERATIONS));
        }

        // Points already absorbed as hull vertices are excluded from the
        // outside sets; the remaining candidates are partitioned below.
        // Vertices dropped by a later expansion re-enter the candidate
        // pool automatically since the set is rebuilt every iteration.
        let absorbed = vertex_set(&facets);
        let hull_vertices: Vec<Point> = absorbed.iter().map(|&i| points[i].clone()).collect();
        let observation = centroid(&hull_vertices)?;
        let candidates: Vec<usize> =
            (0..points.len()).filter(|i| !absorbed.contains(i)).collect();

        let planes = facet_planes(points, &facets, &mut fits, &observation)?;

        let target = if candidates.len() >= PARALLEL_THRESHOLD {
            furthest_outside_parallel(points, &planes, &candidates, tolerance)
        } else {
            furthest_outside_sequential(points, &planes, &candidates, tolerance)
        };
        let Some((facet_idx, point_idx)) = target else {
            // No facet has outside points: the hull is closed. Check the
            // result before handing it out.
            validate_hull(points, &facets, &planes, dim, tolerance)?;
            break;
        };

        log::debug!(
            "iteration {}: {} facets, {} candidates, expanding facet {} towards point {}",
            iterations,
            facets.len(),
            candidates.len(),
            facet_idx,
            point_idx
        );

        let visible = visible_region(points, &facets, &planes, facet_idx, point_idx, tolerance);
        let horizon = horizon_ridges(&facets, &visible, dim);
        if horizon.is_empty() {
            return Err(ConvexHullError::InvariantViolation(format!(
                "horizon around facet {facet_idx} as seen from point {point_idx} has no boundary ridges"
            )));
        }

        // Replace the visible region: keep invisible facets together with
        // their cached fits, append one new facet per boundary ridge
        // joined with the new point.
        let mut next_facets = Vec::with_capacity(facets.len());
        let mut next_fits = Vec::with_capacity(facets.len());
        for (i, f) in facets.iter().enumerate() {
            if !visible.contains(&i) {
                next_facets.push(f.clone());
                next_fits.push(fits[i].clone());
            }
        }
        for mut ridge in horizon {
            ridge.push(point_idx);
            next_facets.push(Facet::new(ridge));
            next_fits.push(None);
        }
        facets = next_facets;
        fits = next_fits;
    }

    Ok(SimplexMesh::new(points.to_vec(), facets))
}

/// Select the vertices of the initial simplex greedily by input order:
/// starting from the first point, take each subsequent point lying
/// measurably outside the affine span of the vertices chosen so far,
/// until `dim + 1` vertices are found.
///
/// Deterministic and dependent only on input order; any valid simplex
/// leads to the same final hull. Fails with `DegenerateInput` only when
/// the whole input spans a proper affine subspace, regardless of how the
/// points are ordered.
pub fn initial_simplex(points: &[Point], tolerance: f64) -> Result<Vec<usize>> {
    let dim = validate_input(points)?;

    let mut simplex = vec![0usize];
    for i in 1..points.len() {
        if extends_affine_span(points, &simplex, i, tolerance) {
            simplex.push(i);
            if simplex.len() == dim + 1 {
                return Ok(simplex);
            }
        }
    }

    Err(ConvexHullError::DegenerateInput { tolerance })
}

/// True when `points[candidate]` lies outside the affine span of the
/// already chosen vertices: the matrix of edges from the first chosen
/// vertex keeps full column rank (smallest singular value above the
/// tolerance) after appending the candidate's edge.
fn extends_affine_span(
    points: &[Point],
    chosen: &[usize],
    candidate: usize,
    tolerance: f64,
) -> bool {
    let base = &points[chosen[0]];
    let edges: Vec<usize> = chosen[1..].iter().copied().chain([candidate]).collect();
    let m = DMatrix::from_fn(base.dim(), edges.len(), |r, c| points[edges[c]][r] - base[r]);

    match SVD::try_new(m, false, false, f64::EPSILON, 0) {
        Some(svd) => svd.singular_values.iter().all(|s| *s > tolerance),
        None => false,
    }
}

/// The `dim + 1` facets of a simplex: facet `i` omits vertex `i`,
/// preserving the relative order of the remaining indices.
pub fn initial_facets(simplex: &[usize]) -> Vec<Facet> {
    (0..simplex.len())
        .map(|omit| {
            Facet::new(
                simplex
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != omit)
                    .map(|(_, &v)| v)
                    .collect(),
            )
        })
        .collect()
}

fn validate_input(points: &[Point]) -> Result<usize> {
    let Some(first) = points.first() else {
        return Err(ConvexHullError::InvalidInput(
            "empty point collection".to_string(),
        ));
    };
    let dim = first.dim();
    if dim == 0 {
        return Err(ConvexHullError::InvalidInput(
            "points must have dimension at least 1".to_string(),
        ));
    }
    if let Some((i, p)) = points.iter().enumerate().find(|(_, p)| p.dim() != dim) {
        return Err(ConvexHullError::InvalidInput(format!(
            "point {} has dimension {} but expected {}",
            i,
            p.dim(),
            dim
        )));
    }
    if points.len() < dim + 1 {
        return Err(ConvexHullError::InvalidInput(format!(
            "{} points cannot span a {}-dimensional hull (need at least {})",
            points.len(),
            dim,
            dim + 1
        )));
    }
    Ok(dim)
}

/// All point indices currently used by any facet
fn vertex_set(facets: &[Facet]) -> BTreeSet<usize> {
    facets
        .iter()
        .flat_map(|f| f.indices().iter().copied())
        .collect()
}

/// One hyperplane per facet, oriented away from the observation point.
///
/// Fits are orientation-free and depend only on the facet's points, so
/// they are computed once per facet and reused across iterations; only
/// the flip against the current observation point is rederived.
fn facet_planes(
    points: &[Point],
    facets: &[Facet],
    fits: &mut [Option<HyperplaneFit>],
    observation: &Point,
) -> Result<Vec<HyperplaneFit>> {
    facets
        .iter()
        .zip(fits.iter_mut())
        .map(|(f, slot)| {
            let fit = match slot {
                Some(fit) => fit.clone(),
                None => {
                    let facet_points: Vec<Point> =
                        f.indices().iter().map(|&i| points[i].clone()).collect();
                    let fit = fit_hyperplane(&facet_points)?;
                    *slot = Some(fit.clone());
                    fit
                }
            };
            Ok(orient_away(&fit, observation))
        })
        .collect()
}

/// First facet (by index) with a non-empty outside set, paired with its
/// furthest outside point.
///
/// Candidates within the tolerance of a facet's hyperplane count as
/// on-hull, never as outside. Equidistant candidates resolve to the
/// lowest input index (strict `>` over an input-order scan).
fn furthest_outside_sequential(
    points: &[Point],
    planes: &[HyperplaneFit],
    candidates: &[usize],
    tolerance: f64,
) -> Option<(usize, usize)> {
    planes.iter().enumerate().find_map(|(fi, plane)| {
        furthest_for_plane(points, plane, candidates, tolerance).map(|ci| (fi, ci))
    })
}

/// Parallel variant: scans all facets across worker threads and reduces
/// to the lowest facet index, matching the sequential result exactly.
fn furthest_outside_parallel(
    points: &[Point],
    planes: &[HyperplaneFit],
    candidates: &[usize],
    tolerance: f64,
) -> Option<(usize, usize)> {
    planes
        .par_iter()
        .enumerate()
        .filter_map(|(fi, plane)| {
            furthest_for_plane(points, plane, candidates, tolerance).map(|ci| (fi, ci))
        })
        .min_by_key(|&(fi, _)| fi)
}

fn furthest_for_plane(
    points: &[Point],
    plane: &HyperplaneFit,
    candidates: &[usize],
    tolerance: f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for &ci in candidates {
        let d = plane.signed_distance(&points[ci]);
        if d > tolerance && best.is_none_or(|(_, bd)| d > bd) {
            best = Some((ci, d));
        }
    }
    best.map(|(ci, _)| ci)
}

/// Maximal connected set of facets the chosen point can see, grown from
/// the starting facet across ridge-sharing neighbours.
///
/// A neighbour joins when the point lies above its plane *or within
/// tolerance of it*. The coplanar neighbours must be replaced along with
/// the strictly visible ones: left in place they would sit flush against
/// the new facets as slivers whose ill-conditioned plane fits
/// misclassify later candidates.
fn visible_region(
    points: &[Point],
    facets: &[Facet],
    planes: &[HyperplaneFit],
    start: usize,
    point_idx: usize,
    tolerance: f64,
) -> BTreeSet<usize> {
    let point = &points[point_idx];
    let dim = point.dim();

    let mut visible = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(f) = queue.pop_front() {
        for (n, other) in facets.iter().enumerate() {
            if visible.contains(&n) || facets[f].shared_count(other) != dim - 1 {
                continue;
            }
            if planes[n].signed_distance(point) > -tolerance {
                visible.insert(n);
                queue.push_back(n);
            }
        }
    }
    visible
}

/// Boundary ridges between the visible region and the invisible
/// remainder. Each ridge is shared by exactly one visible and one
/// invisible facet, so every boundary ridge appears exactly once.
fn horizon_ridges(facets: &[Facet], visible: &BTreeSet<usize>, dim: usize) -> Vec<Vec<usize>> {
    let mut ridges = Vec::new();
    for &v in visible {
        for (n, other) in facets.iter().enumerate() {
            if n == v || visible.contains(&n) {
                continue;
            }
            if facets[v].shared_count(other) == dim - 1 {
                ridges.push(facets[v].ridge(other));
            }
        }
    }
    ridges
}

/// Consistency check on the finished hull: for `dim >= 2` every ridge
/// must be shared by exactly two facets (closed manifold), and no input
/// point may lie strictly outside any facet plane. A breach means the
/// expansion produced a wrong mesh and is reported instead of it.
fn validate_hull(
    points: &[Point],
    facets: &[Facet],
    planes: &[HyperplaneFit],
    dim: usize,
    tolerance: f64,
) -> Result<()> {
    if dim >= 2 {
        let mut ridge_counts: HashMap<Vec<usize>, usize> = HashMap::new();
        for f in facets {
            for omit in 0..f.len() {
                let mut ridge: Vec<usize> = f
                    .indices()
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != omit)
                    .map(|(_, &v)| v)
                    .collect();
                ridge.sort_unstable();
                *ridge_counts.entry(ridge).or_insert(0) += 1;
            }
        }
        for (ridge, count) in ridge_counts {
            if count != 2 {
                return Err(ConvexHullError::InvariantViolation(format!(
                    "ridge {ridge:?} is shared by {count} facets instead of 2"
                )));
            }
        }
    }

    for (pi, p) in points.iter().enumerate() {
        for (fi, plane) in planes.iter().enumerate() {
            let d = plane.signed_distance(p);
            if d > tolerance {
                return Err(ConvexHullError::InvariantViolation(format!(
                    "point {pi} lies {d:e} outside facet {fi}"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_TOLERANCE;

    fn pts(coords: &[&[f64]]) -> Vec<Point> {
        coords.iter().map(|c| Point::new(c.to_vec())).collect()
    }

    #[test]
    fn test_simple_tetrahedron() {
        let points = pts(&[
            &[0.0, 0.0, 0.0],
            &[1.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0],
        ]);

        let hull = quickhull(&points, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(hull.num_facets(), 4);
        assert_eq!(hull.hull_vertex_indices().len(), 4);
    }

    #[test]
    fn test_insufficient_points() {
        let points = pts(&[&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]]);
        assert!(matches!(
            quickhull(&points, DEFAULT_TOLERANCE),
            Err(ConvexHullError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            quickhull(&[], DEFAULT_TOLERANCE),
            Err(ConvexHullError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_mismatched_dimensions() {
        let points = vec![
            Point::new(vec![0.0, 0.0, 0.0]),
            Point::new(vec![1.0, 0.0]),
            Point::new(vec![0.0, 1.0, 0.0]),
            Point::new(vec![0.0, 0.0, 1.0]),
        ];
        assert!(matches!(
            quickhull(&points, DEFAULT_TOLERANCE),
            Err(ConvexHullError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_initial_simplex_facet_layout() {
        // Non-degenerate quartet: the simplex is the four input points and
        // facet i omits vertex i.
        let points = pts(&[
            &[1.0, -1.0, 0.0],
            &[3.0, -3.1, 1.0],
            &[-1.0, 1.0, -1.0],
            &[-2.0, 1.0, 1.5],
        ]);

        let simplex = initial_simplex(&points, 1e-6).unwrap();
        assert_eq!(simplex, vec![0, 1, 2, 3]);

        let facets = initial_facets(&simplex);
        assert_eq!(facets.len(), 4);
        assert_eq!(facets[0].indices(), &[1, 2, 3]);
        assert_eq!(facets[1].indices(), &[0, 2, 3]);
        assert_eq!(facets[2].indices(), &[0, 1, 3]);
        assert_eq!(facets[3].indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_initial_simplex_skips_coplanar_candidates() {
        // Point 3 lies in the plane of the first three; point 4 breaks it.
        let points = pts(&[
            &[0.0, 0.0, 0.0],
            &[1.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0],
            &[1.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0],
        ]);

        let simplex = initial_simplex(&points, 1e-6).unwrap();
        assert_eq!(simplex, vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_initial_simplex_dependent_prefix() {
        // The first three points are collinear; the selection must grow
        // past them instead of reporting a degenerate input.
        let points = pts(&[
            &[0.0, 0.0, 0.0],
            &[1.0, 0.0, 0.0],
            &[2.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0],
        ]);

        let simplex = initial_simplex(&points, 1e-6).unwrap();
        assert_eq!(simplex, vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_initial_simplex_hypercube_4d() {
        // The leading corners of a hypercube are affinely dependent (the
        // first four span a 2-face); the greedy selection walks through
        // to a full 4-simplex.
        let points = crate::testdata::hypercube_points(4, 2.0);
        let simplex = initial_simplex(&points, 1e-6).unwrap();
        assert_eq!(simplex, vec![0, 1, 2, 4, 8]);
    }

    #[test]
    fn test_degenerate_input() {
        // This quartet is exactly coplanar: p3 = p0 + 10(p1-p0) + 11.5(p2-p0).
        let points = pts(&[
            &[1.0, -1.0, 0.0],
            &[3.0, -3.1, 1.0],
            &[-1.0, 1.0, -1.0],
            &[-2.0, 1.0, -1.5],
        ]);

        assert!(matches!(
            quickhull(&points, 1e-6),
            Err(ConvexHullError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn test_square_2d() {
        let points = pts(&[&[0.0, 0.0], &[1.0, 0.0], &[1.0, 1.0], &[0.0, 1.0]]);
        let hull = quickhull(&points, DEFAULT_TOLERANCE).unwrap();

        assert_eq!(hull.num_facets(), 4);
        assert_eq!(hull.hull_vertex_indices().len(), 4);
        // Each edge shares exactly one vertex with each of its two neighbours
        for i in 0..hull.num_facets() {
            assert_eq!(hull.neighbouring_facets(i).len(), 2);
        }
    }

    #[test]
    fn test_segment_1d() {
        let points = pts(&[&[0.0], &[2.0], &[1.0], &[-1.0]]);
        let hull = quickhull(&points, DEFAULT_TOLERANCE).unwrap();

        // A 1D hull is its two extreme endpoints
        assert_eq!(hull.num_facets(), 2);
        let vertices: Vec<usize> = hull.hull_vertex_indices().into_iter().collect();
        assert_eq!(vertices, vec![1, 3]);
    }

    #[test]
    fn test_interior_point_excluded() {
        let points = pts(&[
            &[0.0, 0.0, 0.0],
            &[1.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0],
            &[0.25, 0.25, 0.25],
        ]);

        let hull = quickhull(&points, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(hull.num_facets(), 4);
        assert!(!hull.hull_vertex_indices().contains(&4));
    }

    #[test]
    fn test_coplanar_facet_absorbed_on_expansion() {
        // The apex sits above one roof slope and exactly in the plane of
        // the other; the flush facet must be replaced together with the
        // visible one, leaving a convex manifold mesh.
        let points = pts(&[
            &[0.0, 0.0, 0.0],
            &[4.0, 0.0, 0.0],
            &[0.0, 4.0, 0.0],
            &[4.0, 4.0, 0.0],
            &[2.0, 2.0, 2.0],
        ]);

        let hull = quickhull(&points, DEFAULT_TOLERANCE).unwrap();
        // A square pyramid: 4 side triangles plus the base split in 2
        assert_eq!(hull.hull_vertex_indices().len(), 5);
        assert_eq!(hull.num_facets(), 6);
    }
}

//! Geometric predicates: centroids, coplanarity, and facet visibility

use crate::hyperplane::{HyperplaneFit, fit_hyperplane};
use crate::types::Point;
use crate::{ConvexHullError, Result};

/// Coordinate-wise mean of a non-empty point collection.
///
/// Fails with `InvalidInput` on an empty collection or mismatched
/// dimensionality.
pub fn centroid(points: &[Point]) -> Result<Point> {
    let Some(first) = points.first() else {
        return Err(ConvexHullError::InvalidInput(
            "cannot compute the centroid of an empty point collection".to_string(),
        ));
    };
    let dim = first.dim();

    let mut sum = vec![0.0; dim];
    for (i, p) in points.iter().enumerate() {
        if p.dim() != dim {
            return Err(ConvexHullError::InvalidInput(format!(
                "point {} has dimension {} but expected {}",
                i,
                p.dim(),
                dim
            )));
        }
        for (s, v) in sum.iter_mut().zip(p.coords()) {
            *s += v;
        }
    }

    let n = points.len() as f64;
    Ok(Point::new(sum.into_iter().map(|v| v / n).collect()))
}

/// True iff all points lie within `tolerance` of a common hyperplane.
///
/// An empty collection is vacuously coplanar, as are `dim` or fewer
/// points (too few to over-determine a hyperplane). Otherwise each
/// point's distance along the fitted unit normal is compared against
/// the tolerance.
pub fn share_hyperplane(points: &[Point], tolerance: f64) -> Result<bool> {
    let Some(first) = points.first() else {
        return Ok(true);
    };
    let dim = first.dim();
    if let Some((i, p)) = points.iter().enumerate().find(|(_, p)| p.dim() != dim) {
        return Err(ConvexHullError::InvalidInput(format!(
            "point {} has dimension {} but expected {}",
            i,
            p.dim(),
            dim
        )));
    }
    if points.len() <= dim {
        return Ok(true);
    }

    let fit = fit_hyperplane(points)?;
    Ok(points.iter().all(|p| fit.distance(p) <= tolerance))
}

/// Hyperplane through `facet_points` with the unit normal oriented away
/// from `observation`.
///
/// Orientation convention: the normal is flipped so the observation point
/// (an interior reference, typically the current hull centroid) has
/// negative signed distance. A positive signed distance against the
/// returned fit therefore means a point lies on the outside of the facet.
pub fn oriented_facet_plane(
    facet_points: &[Point],
    observation: &Point,
) -> Result<HyperplaneFit> {
    let fit = fit_hyperplane(facet_points)?;
    if observation.dim() != fit.centroid.dim() {
        return Err(ConvexHullError::InvalidInput(format!(
            "observation point has dimension {} but expected {}",
            observation.dim(),
            fit.centroid.dim()
        )));
    }
    Ok(orient_away(&fit, observation))
}

/// Flip the normal of a fitted plane, if needed, so `observation` ends up
/// on the negative side. The fit itself is orientation-free and reusable
/// against different observation points.
pub fn orient_away(fit: &HyperplaneFit, observation: &Point) -> HyperplaneFit {
    let mut oriented = fit.clone();
    if oriented.normal.dot(&observation.sub(&oriented.centroid)) > 0.0 {
        oriented.normal = oriented.normal.scale(-1.0);
    }
    oriented
}

/// Signed distance of `candidate` to the hyperplane through
/// `facet_points`, with the unit normal oriented away from `observation`.
pub fn signed_distance_above(
    facet_points: &[Point],
    candidate: &Point,
    observation: &Point,
) -> Result<f64> {
    let fit = oriented_facet_plane(facet_points, observation)?;
    if candidate.dim() != fit.centroid.dim() {
        return Err(ConvexHullError::InvalidInput(format!(
            "candidate has dimension {} but expected {}",
            candidate.dim(),
            fit.centroid.dim()
        )));
    }
    Ok(fit.signed_distance(candidate))
}

/// True iff `candidate` lies on the side of the hyperplane through
/// `facet_points` facing away from `observation` by more than `tolerance`.
///
/// Points within `tolerance` of the hyperplane count as on-hull, not
/// above; this keeps near-tangent points from oscillating in and out of
/// outside sets.
pub fn is_above(
    facet_points: &[Point],
    candidate: &Point,
    observation: &Point,
    tolerance: f64,
) -> Result<bool> {
    Ok(signed_distance_above(facet_points, candidate, observation)? > tolerance)
}

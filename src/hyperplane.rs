//! Best-fit hyperplane through a point set via singular value decomposition

use nalgebra::{DMatrix, SVD};

use crate::geometry::centroid;
use crate::types::Point;
use crate::{ConvexHullError, Result};

/// A hyperplane fitted through a point set: the centroid of the set and a
/// unit normal.
///
/// Valid only for the point set it was computed from; never persisted
/// beyond one predicate evaluation.
#[derive(Debug, Clone)]
pub struct HyperplaneFit {
    /// Centroid of the fitted point set; lies on the hyperplane
    pub centroid: Point,
    /// Unit normal, the direction of least variance of the centered set.
    /// Sign is arbitrary; callers orient it against a reference point.
    pub normal: Point,
}

impl HyperplaneFit {
    /// Signed distance of a point to the hyperplane along the normal
    pub fn signed_distance(&self, p: &Point) -> f64 {
        self.normal.dot(&p.sub(&self.centroid))
    }

    /// Absolute distance of a point to the hyperplane
    pub fn distance(&self, p: &Point) -> f64 {
        self.signed_distance(p).abs()
    }
}

/// Fit a hyperplane through `n >= dim` points of dimension `dim`.
///
/// The points are centered on their centroid and the centered coordinates
/// are stacked as the columns of a `dim × n` matrix. The left singular
/// vector of the smallest singular value is the direction orthogonal to
/// the best-fit hyperplane. Input where the rank drops by more than 1
/// (points spanning a lower-dimensional affine subspace) still yields a
/// valid normal with near-zero residuals, which the coplanarity test
/// treats the same as ordinary coplanarity.
pub fn fit_hyperplane(points: &[Point]) -> Result<HyperplaneFit> {
    let c = centroid(points)?;
    let dim = c.dim();
    if points.len() < dim {
        return Err(ConvexHullError::InvalidInput(format!(
            "cannot fit a hyperplane in dimension {} through {} points",
            dim,
            points.len()
        )));
    }

    let centered = DMatrix::from_fn(dim, points.len(), |i, j| points[j][i] - c[i]);

    // eps bounds the singular-value cutoff, max_niter 0 runs to convergence
    let svd = SVD::try_new(centered, true, false, f64::EPSILON, 0).ok_or_else(|| {
        ConvexHullError::InvariantViolation(
            "SVD of the centered point matrix did not converge".to_string(),
        )
    })?;
    let u = svd.u.as_ref().ok_or_else(|| {
        ConvexHullError::InvariantViolation(
            "SVD did not produce left singular vectors".to_string(),
        )
    })?;

    // Singular values come back in descending order; the last left
    // singular vector is the least-variance direction.
    let smallest = svd.singular_values.len() - 1;
    let normal = Point::new(u.column(smallest).iter().copied().collect());

    Ok(HyperplaneFit {
        centroid: c,
        normal,
    })
}

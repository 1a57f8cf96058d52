//! Convex Hull Library for Arbitrary Dimension
//!
//! This library implements the Quickhull algorithm for computing convex hulls
//! of finite point sets in a Euclidean space of any dimension k: build an
//! initial simplex from the input, then iteratively absorb points lying
//! outside the current hull by replacing the horizon region of facets with
//! new facets connecting the horizon boundary to the outlying point.
//!
//! Based on:
//! - Barber, C.B., Dobkin, D.P., and Huhdanpaa, H.T., "The Quickhull algorithm
//!   for convex hulls," ACM Trans. on Mathematical Software, 22(4):469-483, 1996.
//!
//! # Example
//! ```
//! use math_quickhull::{Point, SimplexMesh};
//!
//! let points = vec![
//!     Point::new(vec![0.0, 0.0, 0.0]),
//!     Point::new(vec![1.0, 0.0, 0.0]),
//!     Point::new(vec![0.0, 1.0, 0.0]),
//!     Point::new(vec![0.0, 0.0, 1.0]),
//! ];
//!
//! let hull = SimplexMesh::build(&points).unwrap();
//! println!("Number of facets: {}", hull.num_facets());
//! ```

pub mod geometry;
pub mod hyperplane;
mod quickhull;
mod types;

// Make testdata publicly available for tests
pub mod testdata;

pub use hyperplane::{HyperplaneFit, fit_hyperplane};
pub use quickhull::{initial_facets, initial_simplex, quickhull};
pub use types::{Facet, Point, SimplexMesh};

/// Error types for convex hull operations
#[derive(Debug, thiserror::Error)]
pub enum ConvexHullError {
    /// Empty input, mismatched point dimensionality, or fewer than dim+1 points
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// All points lie in a proper affine subspace; no full-dimensional hull exists
    #[error("degenerate input: all points share a hyperplane within tolerance {tolerance}")]
    DegenerateInput { tolerance: f64 },

    /// An internal consistency check failed; fatal for this computation
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The expansion loop did not terminate within the iteration cap
    #[error("maximum of {0} expansion iterations exceeded")]
    MaxIterationsExceeded(usize),
}

pub type Result<T> = std::result::Result<T, ConvexHullError>;

/// Default tolerance for coplanarity and distance comparisons.
/// Callers needing a looser or tighter threshold pass their own value to
/// [`SimplexMesh::build_with_tolerance`].
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

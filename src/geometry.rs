//! # Planar geometry primitives
//!
//! Small, allocation-free helpers on image-plane points used by every other module:
//!
//! * [`angle`] / [`distance`] – direction and length of the vector between two points,
//! * [`segments_intersect`] / [`polygons_intersect`] – exact 2D intersection tests based on the
//!   orientation predicate,
//! * [`lines_intersection`] – crossing point of two infinite lines,
//! * [`Footprint`] – the robot outline used by the footprint collision predicate.
//!
//! Coordinates are image pixels: `x` grows to the right and `y` grows **downwards**, so a
//! positive [`angle`] is a clockwise rotation on screen.
use std::cmp::Ordering::Greater;

use itertools::{Itertools, MinMaxResult};
use nalgebra::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{
    Centimeter, Degree, DEG2RAD, FOOTPRINT_SHRINK_FACTOR, RAD2DEG, SEGMENT_EPS,
    STADIUM_OUTLINE_CM, STADIUM_VERTICES,
};
use crate::swarm_errors::SwarmError;

/// Vertex storage of a placed footprint, inline for the stadium outline.
pub type Polygon = SmallVec<[Point2<f64>; STADIUM_VERTICES]>;

/// Angle in degrees between the x-axis and the vector `b − a`, in `(−180, 180]`.
///
/// `angle(a, a)` has no meaningful direction; IEEE `atan2(0, 0)` evaluates to `0.0`.
#[inline]
pub fn angle(a: &Point2<f64>, b: &Point2<f64>) -> Degree {
    RAD2DEG * (b.y - a.y).atan2(b.x - a.x)
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    nalgebra::distance(a, b)
}

/// Orientation class of the ordered triplet `(p, q, r)`.
///
/// Return
/// ----------
/// * `0` if the points are exactly collinear, `1` for a counter-clockwise turn in the
///   mathematical frame, `-1` for a clockwise turn.
#[inline]
fn orientation(p: &Point2<f64>, q: &Point2<f64>, r: &Point2<f64>) -> i8 {
    let cross = (q - p).perp(&(r - p));
    if cross > 0.0 {
        1
    } else if cross < 0.0 {
        -1
    } else {
        0
    }
}

/// Whether `q` lies within the bounding extent of segment `pr`, up to [`SEGMENT_EPS`].
#[inline]
fn within_extent(p: &Point2<f64>, q: &Point2<f64>, r: &Point2<f64>) -> bool {
    let inside = |a: f64, b: f64, v: f64| match [a, b].into_iter().minmax() {
        MinMaxResult::MinMax(lo, hi) => v >= lo - SEGMENT_EPS && v <= hi + SEGMENT_EPS,
        MinMaxResult::OneElement(x) => (v - x).abs() <= SEGMENT_EPS,
        MinMaxResult::NoElements => false,
    };
    inside(p.x, r.x, q.x) && inside(p.y, r.y, q.y)
}

/// Test whether segments `p1p2` and `q1q2` share at least one point.
///
/// Arguments
/// -----------------
/// * `p1`, `p2`: end points of the first segment.
/// * `q1`, `q2`: end points of the second segment.
///
/// Return
/// ----------
/// * `true` when the segments cross, touch, or overlap along a common line.
///
/// Notes
/// ----------
/// * General case: each segment separates the two end points of the other one (orientation
///   classes differ pairwise).
/// * Degenerate case: an orientation is exactly zero and the collinear end point lies within
///   the bounding extent of the other segment.
pub fn segments_intersect(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    q1: &Point2<f64>,
    q2: &Point2<f64>,
) -> bool {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && within_extent(p1, q1, p2))
        || (o2 == 0 && within_extent(p1, q2, p2))
        || (o3 == 0 && within_extent(q1, p1, q2))
        || (o4 == 0 && within_extent(q1, p2, q2))
}

/// Test whether the outlines of two closed polygons cross.
///
/// Every edge of `p` (including the closing edge) is tested against every edge of `q`; the scan
/// stops at the first intersecting pair. A polygon strictly nested inside the other one without
/// touching its boundary is **not** reported.
pub fn polygons_intersect(p: &[Point2<f64>], q: &[Point2<f64>]) -> bool {
    p.iter().circular_tuple_windows().any(|(a1, a2)| {
        q.iter()
            .circular_tuple_windows()
            .any(|(b1, b2)| segments_intersect(a1, a2, b1, b2))
    })
}

/// Crossing point of the infinite line through `(p1, q1)` and the one through `(p2, q2)`.
///
/// Return
/// ----------
/// * `None` if the lines are parallel (or one of them is degenerate).
pub fn lines_intersection(
    p1: &Point2<f64>,
    q1: &Point2<f64>,
    p2: &Point2<f64>,
    q2: &Point2<f64>,
) -> Option<Point2<f64>> {
    let s1 = q1 - p1;
    let s2 = q2 - p2;
    let delta = s2.perp(&s1);
    if delta == 0.0 {
        return None;
    }
    let t2 = (p1 - p2).perp(&s1) / delta;
    Some(p2 + s2 * t2)
}

/// Overrides for the footprint calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintParams {
    /// Centimetres per pixel of the recording.
    pub metric_constant: f64,
    /// Empirical factor dividing the metric outline before placement.
    pub shrink_factor: f64,
    /// Closed body-frame outline in centimetres, long axis along +x.
    pub outline_cm: Vec<[Centimeter; 2]>,
}

impl FootprintParams {
    /// Default calibration for a given metric constant.
    pub fn new(metric_constant: f64) -> Self {
        Self {
            metric_constant,
            shrink_factor: FOOTPRINT_SHRINK_FACTOR,
            outline_cm: STADIUM_OUTLINE_CM.to_vec(),
        }
    }

    pub fn shrink_factor(mut self, v: f64) -> Self {
        self.shrink_factor = v;
        self
    }

    pub fn outline_cm(mut self, v: Vec<[Centimeter; 2]>) -> Self {
        self.outline_cm = v;
        self
    }

    /// Validate the calibration and convert the outline to pixels.
    ///
    /// Validation rules
    /// -----------------
    /// * `metric_constant > 0` and `shrink_factor > 0` (NaN rejected).
    /// * The outline holds at least 3 vertices.
    pub fn build(self) -> Result<Footprint, SwarmError> {
        if self.metric_constant.partial_cmp(&0.0) != Some(Greater) {
            return Err(SwarmError::InvalidParameter(format!(
                "metric_constant must be > 0 (got {})",
                self.metric_constant
            )));
        }
        if self.shrink_factor.partial_cmp(&0.0) != Some(Greater) {
            return Err(SwarmError::InvalidParameter(format!(
                "shrink_factor must be > 0 (got {})",
                self.shrink_factor
            )));
        }
        if self.outline_cm.len() < 3 {
            return Err(SwarmError::InvalidParameter(format!(
                "footprint outline needs at least 3 vertices (got {})",
                self.outline_cm.len()
            )));
        }

        let scale = 1.0 / (self.metric_constant * self.shrink_factor);
        let outline_px = self
            .outline_cm
            .iter()
            .map(|[x, y]| Vector2::new(x * scale, y * scale))
            .collect();
        Ok(Footprint { outline_px })
    }
}

/// Robot outline in body-frame pixel offsets, ready to be placed at any pose.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    outline_px: SmallVec<[Vector2<f64>; STADIUM_VERTICES]>,
}

impl Footprint {
    /// Stadium footprint with the default shrink factor.
    ///
    /// Arguments
    /// -----------------
    /// * `metric_constant`: centimetres per pixel, see
    ///   [`metric_constant`](crate::kinematics::markers::metric_constant).
    pub fn new(metric_constant: f64) -> Result<Self, SwarmError> {
        FootprintParams::new(metric_constant).build()
    }

    /// Outline vertices relative to the robot center, unrotated.
    pub fn outline(&self) -> &[Vector2<f64>] {
        &self.outline_px
    }

    /// Rotate the outline by `heading` and translate it to `position`.
    pub fn place(&self, position: &Point2<f64>, heading: Degree) -> Polygon {
        let rot = Rotation2::new(heading * DEG2RAD);
        self.outline_px
            .iter()
            .map(|v| position + rot * v)
            .collect()
    }
}

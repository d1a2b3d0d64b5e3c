//! # Marker geometry at the detector boundary
//!
//! The fiducial-marker detector itself is an external collaborator. This module holds the pure
//! geometry applied to what it reports:
//!
//! * [`detection_from_corners`] – center and heading of a marker from its four corners,
//! * [`metric_constant`] – centimetres per pixel from a marker of known size,
//! * [`field_center_from_markers`] – field center as the crossing of two marker-defined lines.
//!
//! Corner coordinates are truncated to whole pixels and midpoints are floored, so detections
//! produced here sit on the integer pixel grid.
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::constants::{Centimeter, MarkerId, FULL_TURN_DEG};
use crate::geometry::{angle, distance, lines_intersection};
use crate::kinematics::detection::Detection;

/// The four corners of a detected square marker, in the detector's order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerCorners {
    pub top_left: Point2<f64>,
    pub top_right: Point2<f64>,
    pub bottom_right: Point2<f64>,
    pub bottom_left: Point2<f64>,
}

impl MarkerCorners {
    pub fn new(corners: [[f64; 2]; 4]) -> Self {
        let [tl, tr, br, bl] = corners.map(|[x, y]| Point2::new(x, y));
        MarkerCorners {
            top_left: tl,
            top_right: tr,
            bottom_right: br,
            bottom_left: bl,
        }
    }
}

#[inline]
fn truncated(p: &Point2<f64>) -> Point2<f64> {
    Point2::new(p.x.trunc(), p.y.trunc())
}

#[inline]
fn floored_midpoint(a: &Point2<f64>, b: &Point2<f64>) -> Point2<f64> {
    Point2::new(((a.x + b.x) / 2.0).floor(), ((a.y + b.y) / 2.0).floor())
}

/// Build a [`Detection`] from the corners of a marker.
///
/// Arguments
/// -----------------
/// * `id`: identifier decoded from the marker.
/// * `corners`: the four corners as reported by the detector.
///
/// Return
/// ----------
/// * A detection located at the floored midpoint of the top-left/bottom-right diagonal, whose
///   heading points from that center to the midpoint of the top edge, in `[0, 360)` degrees
///   (increasing clockwise on screen).
pub fn detection_from_corners(id: MarkerId, corners: &MarkerCorners) -> Detection {
    let tl = truncated(&corners.top_left);
    let tr = truncated(&corners.top_right);
    let br = truncated(&corners.bottom_right);

    let center = floored_midpoint(&tl, &br);
    let top_mid = floored_midpoint(&tl, &tr);

    let mut heading = angle(&center, &top_mid);
    if heading < 0.0 {
        heading += FULL_TURN_DEG;
    }
    Detection {
        id,
        heading,
        position: center,
    }
}

/// Centimetres per pixel, from a marker of known physical size.
///
/// Arguments
/// -----------------
/// * `marker_size`: side length of the printed marker in centimetres.
/// * `corners`: corners of that marker in one frame; the top edge is measured.
///
/// Return
/// ----------
/// * `None` if the top edge collapses to a single pixel.
pub fn metric_constant(marker_size: Centimeter, corners: &MarkerCorners) -> Option<f64> {
    let edge = distance(
        &truncated(&corners.top_left),
        &truncated(&corners.top_right),
    );
    (edge > 0.0).then(|| marker_size / edge)
}

/// Field center as the crossing of two lines, each going through a pair of markers.
///
/// Arguments
/// -----------------
/// * `frame`: detections of a single frame.
/// * `first_line`, `second_line`: marker ids defining each line.
///
/// Return
/// ----------
/// * `None` if one of the four markers is absent from `frame` or the two lines are parallel.
pub fn field_center_from_markers(
    frame: &[Detection],
    first_line: (MarkerId, MarkerId),
    second_line: (MarkerId, MarkerId),
) -> Option<Point2<f64>> {
    let locate = |id: MarkerId| frame.iter().find(|d| d.id == id).map(|d| d.position);
    let (a, b) = (locate(first_line.0)?, locate(first_line.1)?);
    let (c, d) = (locate(second_line.0)?, locate(second_line.1)?);
    lines_intersection(&a, &b, &c, &d)
}

#[cfg(test)]
mod markers_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_detection_from_upright_marker() {
        // top edge facing −y on screen
        let corners = MarkerCorners::new([[10.0, 10.0], [20.0, 10.0], [20.0, 20.0], [10.0, 20.0]]);
        let d = detection_from_corners(7, &corners);
        assert_eq!(d.id, 7);
        assert_eq!(d.position, Point2::new(15.0, 15.0));
        assert_relative_eq!(d.heading, 270.0);
    }

    #[test]
    fn test_detection_truncates_and_floors() {
        let corners = MarkerCorners::new([[10.9, 0.7], [10.9, 11.2], [0.5, 11.9], [0.2, 0.3]]);
        let d = detection_from_corners(1, &corners);
        // tl → (10, 0), br → (0, 11), center = (5, 5); tr → (10, 11), top mid = (10, 5)
        assert_eq!(d.position, Point2::new(5.0, 5.0));
        assert_relative_eq!(d.heading, 0.0);
    }

    #[test]
    fn test_metric_constant() {
        let corners = MarkerCorners::new([[0.0, 0.0], [40.9, 0.0], [40.0, 40.0], [0.0, 40.0]]);
        assert_relative_eq!(metric_constant(5.0, &corners).unwrap(), 0.125);

        let degenerate = MarkerCorners::new([[3.2, 3.0], [3.7, 3.1], [4.0, 4.0], [3.0, 4.0]]);
        assert!(metric_constant(5.0, &degenerate).is_none());
    }

    #[test]
    fn test_field_center_from_markers() {
        let frame = vec![
            Detection::new(1, 0.0, 0.0, 0.0),
            Detection::new(2, 0.0, 100.0, 100.0),
            Detection::new(3, 0.0, 0.0, 100.0),
            Detection::new(4, 0.0, 100.0, 0.0),
        ];
        let c = field_center_from_markers(&frame, (1, 2), (3, 4)).unwrap();
        assert_relative_eq!(c.x, 50.0);
        assert_relative_eq!(c.y, 50.0);

        assert!(field_center_from_markers(&frame, (1, 2), (3, 9)).is_none());
        assert!(field_center_from_markers(&frame, (1, 4), (3, 2)).is_none());
    }
}

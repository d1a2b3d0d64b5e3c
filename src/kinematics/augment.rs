//! # Kinematic augmentation
//!
//! Pure, order-preserving transforms of a [`Trajectory`]:
//!
//! * [`polar_extend`] – attach the polar angle and radius of every particle around a field
//!   center, required by the rotation and distance statistics,
//! * [`velocities`] – per-frame displacement vectors of every particle.
use nalgebra::{Point2, Vector2};

use crate::geometry::{angle, distance};
use crate::kinematics::detection::{Detection, PolarDetection, Trajectory};

/// Per-frame velocity vectors, indexed `[frame][particle]` in id order.
pub type Velocities = Vec<Vec<Vector2<f64>>>;

/// Extend every detection with its polar coordinates around `center`.
///
/// Arguments
/// -----------------
/// * `trajectory`: complete trajectory, left untouched.
/// * `center`: field center in pixels, e.g. from
///   [`field_center_from_markers`](crate::kinematics::markers::field_center_from_markers).
///
/// Return
/// ----------
/// * A trajectory of [`PolarDetection`] with the same frames, ids and order, where
///   `polar_angle = angle(center, position)` and `radius = distance(center, position)`.
pub fn polar_extend(
    trajectory: &Trajectory<Detection>,
    center: &Point2<f64>,
) -> Trajectory<PolarDetection> {
    let frames = trajectory
        .frames()
        .iter()
        .map(|frame| {
            frame
                .iter()
                .map(|d| PolarDetection {
                    detection: d.clone(),
                    polar_angle: angle(center, &d.position),
                    radius: distance(center, &d.position),
                })
                .collect()
        })
        .collect();
    Trajectory::from_parts(trajectory.population(), frames)
}

/// Displacement of every particle between consecutive frames.
///
/// Frame 0 has no predecessor and gets zero vectors. For `k > 0` the velocity of the particle at
/// index `i` is `position_k[i] − position_{k−1}[i]`; particles are matched by index, which is
/// valid because a [`Trajectory`] keeps the same id order in every frame.
pub fn velocities<D: AsRef<Detection>>(trajectory: &Trajectory<D>) -> Velocities {
    let frames = trajectory.frames();
    let mut out = Vec::with_capacity(frames.len());
    if let Some(first) = frames.first() {
        out.push(vec![Vector2::zeros(); first.len()]);
    }
    out.extend(frames.windows(2).map(|w| {
        w[1].iter()
            .zip(&w[0])
            .map(|(cur, prev)| cur.as_ref().position - prev.as_ref().position)
            .collect()
    }));
    out
}

#[cfg(test)]
mod augment_test {
    use super::*;
    use approx::assert_relative_eq;

    fn trajectory() -> Trajectory {
        Trajectory::from_frames(vec![
            vec![
                Detection::new(1, 10.0, 1.0, 0.0),
                Detection::new(2, 20.0, 0.0, 2.0),
            ],
            vec![
                Detection::new(1, 10.0, 2.0, 1.0),
                Detection::new(2, 20.0, -3.0, 2.0),
            ],
        ])
        .unwrap()
    }

    #[test]
    fn test_polar_extend() {
        let traj = trajectory();
        let polar = polar_extend(&traj, &Point2::new(0.0, 0.0));
        assert_eq!(polar.len(), 2);
        assert_eq!(polar.population(), 2);

        let p = &polar.frame(0).unwrap()[1];
        assert_eq!(p.detection, traj.frame(0).unwrap()[1]);
        assert_relative_eq!(p.polar_angle, 90.0);
        assert_relative_eq!(p.radius, 2.0);

        let q = &polar.frame(1).unwrap()[1];
        assert_relative_eq!(q.polar_angle, angle(&Point2::origin(), &Point2::new(-3.0, 2.0)));
        assert_relative_eq!(q.radius, 13f64.sqrt());
    }

    #[test]
    fn test_velocities() {
        let v = velocities(&trajectory());
        assert_eq!(v.len(), 2);
        assert_eq!(v[0], vec![Vector2::zeros(); 2]);
        assert_eq!(v[1], vec![Vector2::new(1.0, 1.0), Vector2::new(-3.0, 0.0)]);
    }

    #[test]
    fn test_velocities_empty() {
        let traj: Trajectory = Trajectory::from_parts(3, vec![]);
        assert!(velocities(&traj).is_empty());
    }
}

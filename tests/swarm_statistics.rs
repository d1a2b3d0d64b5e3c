mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra::Point2;
use swarmkin::geometry::Footprint;
use swarmkin::kinematics::augment::{polar_extend, velocities};
use swarmkin::kinematics::detection::Trajectory;
use swarmkin::kinematics::gap_filling::reconstruct;
use swarmkin::statistics::clustering::{cluster_dynamics, DistanceThreshold, FootprintOverlap};
use swarmkin::statistics::correlation_field::{
    orientation_correlation, position_correlation, velocity_correlation, FieldWindow,
};
use swarmkin::statistics::heterogeneity::{chi4, spatio_temporal_correlation_peak};
use swarmkin::statistics::scalar::{
    bond_orientational_order, mean_cartesian_displacement, mean_distance_from_center,
    mean_polar_angle, mean_polar_angle_absolute, BondOrderParams,
};
use swarmkin::swarm_errors::SwarmError;

use common::{rotating_arc, stationary_square};

#[test]
fn test_stationary_square_has_no_heterogeneity() {
    let traj = reconstruct(4, &stationary_square(5, 10.0)).unwrap();
    for tau in 0..5 {
        assert_eq!(chi4(&traj, tau, 20.0).unwrap(), 0.0);
    }
    let (peak, curve) = spatio_temporal_correlation_peak(&traj, 20.0, None).unwrap();
    assert_eq!(peak, 0.0);
    assert_eq!(curve, vec![0.0; 4]);
    assert!(matches!(
        chi4(&traj, 5, 20.0),
        Err(SwarmError::InsufficientHistory { .. })
    ));
}

#[test]
fn test_rotating_arc_scalars() {
    let center = Point2::new(300.0, 300.0);
    let traj = reconstruct(5, &rotating_arc(5, 20, center, 100.0, 30.0, 5.0)).unwrap();
    let polar = polar_extend(&traj, &center);

    for r in mean_distance_from_center(&polar) {
        assert_relative_eq!(r, 100.0, epsilon = 1e-9);
    }

    let signed = mean_polar_angle(&polar);
    let absolute = mean_polar_angle_absolute(&polar);
    assert_eq!(signed.len(), 20);
    for k in 1..20 {
        assert_abs_diff_eq!(signed[k] - signed[k - 1], 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(absolute[k], signed[k], epsilon = 1e-9);
    }

    let displacement = mean_cartesian_displacement(&traj);
    assert_eq!(displacement[0], 0.0);
    // chord of a 5° rotation on a 100 px circle
    assert_relative_eq!(
        displacement[1],
        2.0 * 100.0 * (2.5f64).to_radians().sin(),
        epsilon = 1e-9
    );
    assert!(displacement.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn test_square_bond_order_is_fourfold() {
    let traj = reconstruct(4, &stationary_square(3, 10.0)).unwrap();
    let params = BondOrderParams::builder()
        .neighbours(2)
        .folds(4)
        .exclude_self(true)
        .frame_stride(2)
        .build()
        .unwrap();
    let order = bond_orientational_order(&traj, &params).unwrap();
    assert_eq!(order.len(), 2);
    for psi in order {
        assert_abs_diff_eq!(psi, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_cluster_dynamics_predicates() {
    let traj = reconstruct(4, &stationary_square(4, 10.0)).unwrap();

    // diagonals included: complete graph
    let complete = cluster_dynamics(&traj, &DistanceThreshold::new(15.0)).unwrap();
    assert_eq!(complete, vec![1.0; 4]);

    // sides only: a 4-cycle closes no triangle
    let cycle = cluster_dynamics(&traj, &DistanceThreshold::new(12.0)).unwrap();
    assert_eq!(cycle, vec![0.0; 4]);

    // default 300 px radius swallows the whole square
    let default = cluster_dynamics(&traj, &DistanceThreshold::default()).unwrap();
    assert_eq!(default, vec![1.0; 4]);

    // 1 cm/px: footprints of ~7.5 px length, 10 px apart
    let apart = FootprintOverlap::new(Footprint::new(1.0).unwrap());
    assert_eq!(cluster_dynamics(&traj, &apart).unwrap(), vec![0.0; 4]);

    let closure = |a: &swarmkin::kinematics::detection::Detection,
                   b: &swarmkin::kinematics::detection::Detection| a.id + b.id == 5;
    // pairs (1,4) and (2,3): a matching, no triangle
    assert_eq!(cluster_dynamics(&traj, &closure).unwrap(), vec![0.0; 4]);
}

#[test]
fn test_correlation_fields_on_rotating_arc() {
    let center = Point2::new(300.0, 300.0);
    let traj: Trajectory = reconstruct(6, &rotating_arc(6, 10, center, 80.0, 90.0, 3.0)).unwrap();
    let window = FieldWindow::new(200, 200).unwrap();

    let position = position_correlation(&traj, &window).unwrap();
    let orientation = orientation_correlation(&traj, &window).unwrap();
    let velocity = velocity_correlation(&traj, &window).unwrap();

    assert_eq!(position.len(), 10);
    assert_eq!(orientation.len(), 10);
    assert_eq!(velocity.len(), 9);

    for (p, o) in position.iter().zip(&orientation) {
        assert_eq!(p.shape(), (200, 200));
        assert!(p.sum() > 0.0 && p.sum() <= 1.0);
        // cosine weights never exceed the plain density
        assert!(o.sum() <= p.sum() + 1e-12);
        assert!(o.iter().zip(p.iter()).all(|(ov, pv)| (*ov == 0.0) == (*pv == 0.0)));
    }

    // rigid rotation: every velocity has the same norm, so weights are cos(Δ) / N²
    let v = velocities(&traj);
    let speed = v[1][0].norm();
    assert!(v[1..].iter().flatten().all(|vi| (vi.norm() - speed).abs() < 1e-9));
    for (vel, p) in velocity.iter().zip(&position[1..]) {
        assert!(vel.sum() <= p.sum() + 1e-12);
    }
}

//! # Cluster dynamics
//!
//! Per-frame **collision graph** of the swarm and its average local clustering coefficient.
//!
//! Whether two robots touch is decided by a pluggable [`CollisionPredicate`]:
//!
//! * [`DistanceThreshold`] – centers closer than a fixed radius,
//! * [`FootprintOverlap`] – the rotated, metric-scaled robot outlines intersect,
//! * any `Fn(&Detection, &Detection) -> bool + Sync` closure.
//!
//! ## Example
//!
//! ```rust
//! use swarmkin::kinematics::detection::{Detection, Trajectory};
//! use swarmkin::statistics::clustering::{cluster_dynamics, DistanceThreshold};
//!
//! let frame = vec![
//!     Detection::new(1, 0.0, 0.0, 0.0),
//!     Detection::new(2, 0.0, 5.0, 0.0),
//!     Detection::new(3, 0.0, 0.0, 5.0),
//! ];
//! let trajectory = Trajectory::from_frames(vec![frame]).unwrap();
//! let coefficients = cluster_dynamics(&trajectory, &DistanceThreshold::new(10.0)).unwrap();
//! assert_eq!(coefficients, vec![1.0]);
//! ```
use itertools::iproduct;
use nalgebra::DMatrix;
use tracing::debug;

use crate::constants::DEFAULT_COLLISION_RADIUS_PX;
use crate::geometry::{distance, polygons_intersect, Footprint};
use crate::kinematics::detection::{Detection, Trajectory};
use crate::statistics::worker_pool::WorkerPool;
use crate::swarm_errors::SwarmError;

/// Strategy deciding whether two robots of the same frame are in contact.
pub trait CollisionPredicate: Sync {
    fn collide(&self, a: &Detection, b: &Detection) -> bool;
}

impl<F> CollisionPredicate for F
where
    F: Fn(&Detection, &Detection) -> bool + Sync,
{
    fn collide(&self, a: &Detection, b: &Detection) -> bool {
        self(a, b)
    }
}

/// Collide iff the center-to-center distance is `≤ radius` pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceThreshold {
    pub radius: f64,
}

impl DistanceThreshold {
    pub fn new(radius: f64) -> Self {
        DistanceThreshold { radius }
    }
}

impl Default for DistanceThreshold {
    fn default() -> Self {
        DistanceThreshold::new(DEFAULT_COLLISION_RADIUS_PX)
    }
}

impl CollisionPredicate for DistanceThreshold {
    fn collide(&self, a: &Detection, b: &Detection) -> bool {
        distance(&a.position, &b.position) <= self.radius
    }
}

/// Collide iff the footprints placed at both poses have intersecting edges.
///
/// Robots farther apart than twice the footprint circumradius are rejected without building
/// their polygons.
#[derive(Debug, Clone)]
pub struct FootprintOverlap {
    footprint: Footprint,
    reach: f64,
}

impl FootprintOverlap {
    pub fn new(footprint: Footprint) -> Self {
        let reach = 2.0
            * footprint
                .outline()
                .iter()
                .map(|v| v.norm())
                .fold(0.0, f64::max);
        FootprintOverlap { footprint, reach }
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }
}

impl CollisionPredicate for FootprintOverlap {
    fn collide(&self, a: &Detection, b: &Detection) -> bool {
        if distance(&a.position, &b.position) > self.reach {
            return false;
        }
        let pa = self.footprint.place(&a.position, a.heading);
        let pb = self.footprint.place(&b.position, b.heading);
        polygons_intersect(&pa, &pb)
    }
}

/// Adjacency matrix of the collision graph of one frame.
///
/// Arguments
/// -----------------
/// * `frame`: detections of a single frame, `N` particles.
/// * `predicate`: contact test, evaluated on every ordered pair `(i, j)` with `i ≠ j`.
///
/// Return
/// ----------
/// * An `N × N` matrix of `0`/`1` with a zero diagonal.
pub fn collision_graph<D, P>(frame: &[D], predicate: &P) -> DMatrix<u8>
where
    D: AsRef<Detection>,
    P: CollisionPredicate + ?Sized,
{
    let n = frame.len();
    DMatrix::from_fn(n, n, |i, j| {
        u8::from(i != j && predicate.collide(frame[i].as_ref(), frame[j].as_ref()))
    })
}

/// Average local clustering coefficient of a graph.
///
/// For a node of out-degree `k ≥ 2`, `c_i = Σ_{j,l} A_ij A_jl A_li / (k (k − 1))`. Only directed
/// cycles `i → j → l → i` are counted, so an asymmetric matrix is not symmetrised first. Nodes of
/// out-degree `0` or `1` contribute `0`. The sum is divided by the total node count `N`, isolated nodes
/// included. An empty graph has coefficient `0`.
pub fn local_clustering_coefficient(adjacency: &DMatrix<u8>) -> f64 {
    let n = adjacency.nrows();
    if n == 0 {
        return 0.0;
    }
    let linked = |i: usize, j: usize| adjacency[(i, j)] != 0;

    let total: f64 = (0..n)
        .filter_map(|i| {
            let k = (0..n).filter(|&j| linked(i, j)).count();
            if k < 2 {
                return None;
            }
            let closed = iproduct!(0..n, 0..n)
                .filter(|&(j, l)| linked(i, j) && linked(j, l) && linked(l, i))
                .count();
            Some(closed as f64 / (k * (k - 1)) as f64)
        })
        .sum();
    total / n as f64
}

/// Average local clustering coefficient of every frame, computed in parallel.
///
/// Arguments
/// -----------------
/// * `trajectory`: complete trajectory.
/// * `predicate`: contact test shared by all frames.
///
/// Return
/// ----------
/// * One coefficient per frame, in frame order.
/// * `Err(SwarmError::WorkerPool)` if the worker pool cannot be started.
pub fn cluster_dynamics<D, P>(trajectory: &Trajectory<D>, predicate: &P) -> Result<Vec<f64>, SwarmError>
where
    D: AsRef<Detection> + Sync,
    P: CollisionPredicate + ?Sized,
{
    let pool = WorkerPool::new()?;
    debug!(frames = trajectory.len(), "computing cluster dynamics");
    pool.map_ordered(trajectory.frames(), |frame| {
        Ok(local_clustering_coefficient(&collision_graph(frame, predicate)))
    })
}

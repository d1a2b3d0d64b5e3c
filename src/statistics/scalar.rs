//! # Scalar swarm statistics
//!
//! One scalar per frame, computed sequentially:
//!
//! * [`mean_distance_from_center`] – mean radius around the field center,
//! * [`mean_polar_angle`] – unwrapped mean polar angle ("total rotation" of the swarm),
//! * [`mean_polar_angle_absolute`] – accumulated absolute rotation ("rotation path length"),
//! * [`mean_cartesian_displacement`] – mean distance travelled since the first frame,
//! * [`bond_orientational_order`] – `m`-fold bond-orientational order parameter.
//!
//! The polar statistics need a [`Trajectory`] of [`PolarDetection`], see
//! [`polar_extend`](crate::kinematics::augment::polar_extend).
//!
//! Unwrapping
//! -----------------
//! The per-frame mean polar angle lives in `(−180, 180]`. A frame-to-frame change whose
//! magnitude reaches the unwrap threshold ([`POLAR_UNWRAP_THRESHOLD_DEG`] by default) is
//! attributed to the bounded representation and corrected by a full turn; anything below is
//! taken as genuine motion. The unwrapping is inherently sequential.
use nalgebra::Complex;
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, DEG2RAD, FULL_TURN_DEG, POLAR_UNWRAP_THRESHOLD_DEG};
use crate::geometry::{angle, distance};
use crate::kinematics::detection::{Detection, PolarDetection, Trajectory};
use crate::swarm_errors::SwarmError;

/// Mean of `value` over the particles of each frame.
fn frame_means<D, F>(trajectory: &Trajectory<D>, value: F) -> Vec<f64>
where
    F: Fn(&D) -> f64,
{
    trajectory
        .frames()
        .iter()
        .map(|frame| frame.iter().map(&value).sum::<f64>() / frame.len() as f64)
        .collect()
}

/// Mean distance of the particles from the field center, per frame.
pub fn mean_distance_from_center(trajectory: &Trajectory<PolarDetection>) -> Vec<f64> {
    frame_means(trajectory, |d| d.radius)
}

/// Unwrapped mean polar angle per frame, with the default unwrap threshold.
///
/// The first value is the raw mean of frame 0; every following value adds the frame-to-frame
/// change of the raw mean, corrected for wraparound.
///
/// See also
/// ------------
/// * [`mean_polar_angle_with_threshold`] – same with a custom threshold.
pub fn mean_polar_angle(trajectory: &Trajectory<PolarDetection>) -> Vec<Degree> {
    mean_polar_angle_with_threshold(trajectory, POLAR_UNWRAP_THRESHOLD_DEG)
}

/// Unwrapped mean polar angle per frame.
///
/// Arguments
/// -----------------
/// * `trajectory`: polar-extended trajectory.
/// * `threshold`: change (degrees) from which a jump is treated as a wraparound.
///
/// Return
/// ----------
/// * `u[0] = raw[0]`; for `k ≥ 1`, with `d = raw[k] − raw[k−1]`:
///   * `|d| < threshold` → `u[k] = u[k−1] + d`,
///   * `d > 0` → `u[k] = u[k−1] + d − 360`,
///   * otherwise → `u[k] = u[k−1] − d + 360`.
pub fn mean_polar_angle_with_threshold(
    trajectory: &Trajectory<PolarDetection>,
    threshold: Degree,
) -> Vec<Degree> {
    let raw = frame_means(trajectory, |d| d.polar_angle);
    accumulate(&raw, |d| {
        if d.abs() < threshold {
            d
        } else if d > 0.0 {
            d - FULL_TURN_DEG
        } else {
            -d + FULL_TURN_DEG
        }
    })
}

/// Accumulated absolute change of the mean polar angle, with the default unwrap threshold.
///
/// Non-decreasing after the first frame.
pub fn mean_polar_angle_absolute(trajectory: &Trajectory<PolarDetection>) -> Vec<Degree> {
    mean_polar_angle_absolute_with_threshold(trajectory, POLAR_UNWRAP_THRESHOLD_DEG)
}

/// Accumulated absolute change of the mean polar angle.
///
/// `u[0] = raw[0]`; each step adds `|d|` when `|d| < threshold`, `360 − |d|` otherwise.
pub fn mean_polar_angle_absolute_with_threshold(
    trajectory: &Trajectory<PolarDetection>,
    threshold: Degree,
) -> Vec<Degree> {
    let raw = frame_means(trajectory, |d| d.polar_angle);
    accumulate(&raw, |d| {
        let abs = d.abs();
        if abs < threshold {
            abs
        } else {
            FULL_TURN_DEG - abs
        }
    })
}

/// Running sum starting at `raw[0]`, adding `step(raw[k] − raw[k−1])` for every `k ≥ 1`.
fn accumulate<F: Fn(f64) -> f64>(raw: &[f64], step: F) -> Vec<f64> {
    let Some(&first) = raw.first() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(raw.len());
    out.push(first);
    let mut current = first;
    for w in raw.windows(2) {
        current += step(w[1] - w[0]);
        out.push(current);
    }
    out
}

/// Mean distance of every particle from its position in the first frame, per frame.
///
/// Raw (not squared) displacement; the first value is always `0`.
pub fn mean_cartesian_displacement<D: AsRef<Detection>>(trajectory: &Trajectory<D>) -> Vec<f64> {
    let Some(origin) = trajectory.frames().first() else {
        return Vec::new();
    };
    trajectory
        .frames()
        .iter()
        .map(|frame| {
            frame
                .iter()
                .zip(origin)
                .map(|(cur, init)| distance(&cur.as_ref().position, &init.as_ref().position))
                .sum::<f64>()
                / frame.len() as f64
        })
        .collect()
}

/// Parameters of [`bond_orientational_order`].
///
/// Fields
/// -----------------
/// * `neighbours` – number `k` of nearest particles used for each local order.
/// * `folds` – symmetry order `m` (6 for hexatic order, 4 for square order…).
/// * `frame_stride` – evaluate every `frame_stride`-th frame, starting with frame 0.
/// * `exclude_self` – drop the particle itself from its candidate neighbours. When `false`, the
///   particle (at distance 0) always ranks first and contributes `exp(0) = 1` to its own sum.
///
/// Defaults
/// -----------------
/// `neighbours = 6`, `folds = 6`, `frame_stride = 1`, `exclude_self = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondOrderParams {
    pub neighbours: usize,
    pub folds: u32,
    pub frame_stride: usize,
    pub exclude_self: bool,
}

impl Default for BondOrderParams {
    fn default() -> Self {
        BondOrderParams {
            neighbours: 6,
            folds: 6,
            frame_stride: 1,
            exclude_self: false,
        }
    }
}

impl BondOrderParams {
    pub fn builder() -> BondOrderParamsBuilder {
        BondOrderParamsBuilder::default()
    }

    fn validate(&self) -> Result<(), SwarmError> {
        if self.frame_stride == 0 {
            return Err(SwarmError::InvalidParameter(
                "frame_stride must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`BondOrderParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct BondOrderParamsBuilder {
    params: BondOrderParams,
}

impl BondOrderParamsBuilder {
    pub fn neighbours(mut self, v: usize) -> Self {
        self.params.neighbours = v;
        self
    }
    pub fn folds(mut self, v: u32) -> Self {
        self.params.folds = v;
        self
    }
    pub fn frame_stride(mut self, v: usize) -> Self {
        self.params.frame_stride = v;
        self
    }
    pub fn exclude_self(mut self, v: bool) -> Self {
        self.params.exclude_self = v;
        self
    }

    /// Finalize the builder; `frame_stride` must be at least 1.
    pub fn build(self) -> Result<BondOrderParams, SwarmError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

/// Local bond order of particle `reference` among `positions`.
///
/// Return
/// ----------
/// * `|Σ exp(i·m·θ_n)| / n` over the `n = min(k, candidates)` nearest candidates, `0` if no
///   candidate is left.
fn local_bond_order(
    positions: &[nalgebra::Point2<f64>],
    reference: usize,
    params: &BondOrderParams,
) -> f64 {
    let origin = &positions[reference];
    let mut candidates: Vec<(f64, usize)> = positions
        .iter()
        .enumerate()
        .filter(|(j, _)| !(params.exclude_self && *j == reference))
        .map(|(j, p)| (distance(origin, p), j))
        .collect();
    // stable: equidistant candidates keep id order
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
    candidates.truncate(params.neighbours);

    if candidates.is_empty() {
        return 0.0;
    }
    let m = params.folds as f64;
    let sum: Complex<f64> = candidates
        .iter()
        .map(|(_, j)| Complex::from_polar(1.0, m * angle(origin, &positions[*j]) * DEG2RAD))
        .sum();
    sum.norm() / candidates.len() as f64
}

/// Bond-orientational order parameter per sampled frame.
///
/// Arguments
/// -----------------
/// * `trajectory`: complete trajectory.
/// * `params`: neighbour count, symmetry order, stride and self-exclusion policy.
///
/// Return
/// ----------
/// * One value per sampled frame (frames `0, s, 2s, …`): the mean over particles of the local
///   order computed by `local_bond_order`.
/// * `Err(SwarmError::InvalidParameter)` if `frame_stride == 0`.
pub fn bond_orientational_order<D: AsRef<Detection>>(
    trajectory: &Trajectory<D>,
    params: &BondOrderParams,
) -> Result<Vec<f64>, SwarmError> {
    params.validate()?;

    Ok(trajectory
        .frames()
        .iter()
        .step_by(params.frame_stride)
        .map(|frame| {
            let positions: Vec<_> = frame.iter().map(|d| d.as_ref().position).collect();
            (0..positions.len())
                .map(|i| local_bond_order(&positions, i, params))
                .sum::<f64>()
                / positions.len() as f64
        })
        .collect())
}

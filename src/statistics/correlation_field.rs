//! # Body-frame correlation fields
//!
//! For every frame and every ordered pair `(i, j)`, `i ≠ j`, the offset `position_j − position_i`
//! is expressed in the body frame of particle `i` and rounded to an integer bin `(X, Y)`. Pairs
//! landing inside the window `0 < X < x_size`, `0 < Y < y_size` add a weight to bin `[Y][X]` of
//! the frame's field:
//!
//! | field | weight |
//! |-------|--------|
//! | [`position_correlation`] | `1 / N²` |
//! | [`orientation_correlation`] | `cos(heading_j − heading_i) / N²` |
//! | [`velocity_correlation`] | `(v_i · v_j) / (⟨|v|²⟩ · N²)` |
//!
//! Fields are `y_size × x_size` [`DMatrix`] (rows indexed by `Y`). Each frame is an independent
//! task on a [`WorkerPool`] owned by the call; output order follows frame order.
use itertools::iproduct;
use nalgebra::{DMatrix, Vector2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::DEG2RAD;
use crate::kinematics::augment::velocities;
use crate::kinematics::detection::{Detection, Trajectory};
use crate::statistics::worker_pool::WorkerPool;
use crate::swarm_errors::SwarmError;

/// Extent of the binned body-frame window, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWindow {
    pub x_size: usize,
    pub y_size: usize,
}

impl FieldWindow {
    /// Both extents must be at least 1.
    pub fn new(x_size: usize, y_size: usize) -> Result<Self, SwarmError> {
        let window = FieldWindow { x_size, y_size };
        window.validate()?;
        Ok(window)
    }

    fn validate(&self) -> Result<(), SwarmError> {
        if self.x_size == 0 || self.y_size == 0 {
            return Err(SwarmError::InvalidParameter(format!(
                "field window must be at least 1×1 (got {}×{})",
                self.x_size, self.y_size
            )));
        }
        Ok(())
    }

    /// Row and column of the bin hit by `offset`, if inside the window.
    fn bin(&self, offset: (i64, i64)) -> Option<(usize, usize)> {
        let (x, y) = offset;
        let inside = |v: i64, size: usize| v > 0 && (v as u64) < size as u64;
        (inside(x, self.x_size) && inside(y, self.y_size)).then_some((y as usize, x as usize))
    }

    fn zeros(&self) -> DMatrix<f64> {
        DMatrix::zeros(self.y_size, self.x_size)
    }
}

/// Integer offset `(X, Y)` of `to` in the body frame of `from`.
///
/// With `a = from.heading`, `(dx, dy) = to.position − from.position`:
/// `X = round(dy·cos a − dx·sin a)`, `Y = round(dx·cos a + dy·sin a)`, ties rounded to even.
/// This is `(dx, dy)` rotated by `−a` with its components swapped: `Y` runs along the heading
/// of `from` and `X` across it.
pub fn body_frame_offset(from: &Detection, to: &Detection) -> (i64, i64) {
    let d = to.position - from.position;
    let (sin, cos) = (from.heading * DEG2RAD).sin_cos();
    let x = (d.y * cos - d.x * sin).round_ties_even();
    let y = (d.x * cos + d.y * sin).round_ties_even();
    (x as i64, y as i64)
}

/// Accumulate `weight(i, j)` over the in-window ordered pairs of one frame.
fn accumulate_field<D, W>(frame: &[D], window: &FieldWindow, weight: W) -> DMatrix<f64>
where
    D: AsRef<Detection>,
    W: Fn(usize, usize) -> f64,
{
    let n = frame.len();
    let mut field = window.zeros();
    for (i, j) in iproduct!(0..n, 0..n).filter(|(i, j)| i != j) {
        if let Some(bin) = window.bin(body_frame_offset(frame[i].as_ref(), frame[j].as_ref())) {
            field[bin] += weight(i, j);
        }
    }
    field
}

/// Pair density field of every frame.
///
/// Return
/// ----------
/// * One `y_size × x_size` matrix per frame; each in-window ordered pair adds `1 / N²`, so a
///   matrix sums to `(in-window pairs) / N² ≤ 1`.
/// * `Err(SwarmError::InvalidParameter)` for an empty window.
pub fn position_correlation<D>(
    trajectory: &Trajectory<D>,
    window: &FieldWindow,
) -> Result<Vec<DMatrix<f64>>, SwarmError>
where
    D: AsRef<Detection> + Sync,
{
    window.validate()?;
    let norm = (trajectory.population() as f64).powi(2);
    let pool = WorkerPool::new()?;
    debug!(frames = trajectory.len(), ?window, "computing position correlation");
    pool.map_ordered(trajectory.frames(), |frame| {
        Ok(accumulate_field(frame, window, |_, _| 1.0 / norm))
    })
}

/// Heading alignment field of every frame.
///
/// Each in-window ordered pair adds `cos((heading_j − heading_i)·π/180) / N²`.
pub fn orientation_correlation<D>(
    trajectory: &Trajectory<D>,
    window: &FieldWindow,
) -> Result<Vec<DMatrix<f64>>, SwarmError>
where
    D: AsRef<Detection> + Sync,
{
    window.validate()?;
    let norm = (trajectory.population() as f64).powi(2);
    let pool = WorkerPool::new()?;
    debug!(frames = trajectory.len(), ?window, "computing orientation correlation");
    pool.map_ordered(trajectory.frames(), |frame| {
        Ok(accumulate_field(frame, window, |i, j| {
            let (hi, hj) = (frame[i].as_ref().heading, frame[j].as_ref().heading);
            ((hj - hi) * DEG2RAD).cos() / norm
        }))
    })
}

/// Velocity alignment field of every frame that has a predecessor.
///
/// Arguments
/// -----------------
/// * `trajectory`: complete trajectory with at least 2 frames.
/// * `window`: body-frame window.
///
/// Return
/// ----------
/// * `F − 1` matrices, the first one for frame 1. Each in-window ordered pair adds
///   `(v_i · v_j) / (⟨|v|²⟩ · N²)`, where `⟨|v|²⟩` is the frame's mean squared speed, taken as 1
///   when the whole swarm is still.
/// * `Err(SwarmError::InsufficientHistory)` if `F < 2`.
///
/// See also
/// ------------
/// * [`velocities`] – the per-frame displacement vectors used here.
pub fn velocity_correlation<D>(
    trajectory: &Trajectory<D>,
    window: &FieldWindow,
) -> Result<Vec<DMatrix<f64>>, SwarmError>
where
    D: AsRef<Detection> + Sync,
{
    window.validate()?;
    if trajectory.len() < 2 {
        return Err(SwarmError::InsufficientHistory {
            required: 2,
            available: trajectory.len(),
        });
    }
    let n = trajectory.population() as f64;
    let norm = n * n;
    let speeds = velocities(trajectory);
    let items: Vec<(&[D], &[Vector2<f64>])> = trajectory
        .frames()
        .iter()
        .zip(&speeds)
        .skip(1)
        .map(|(frame, v)| (frame.as_slice(), v.as_slice()))
        .collect();

    let pool = WorkerPool::new()?;
    debug!(frames = items.len(), ?window, "computing velocity correlation");
    pool.map_ordered(&items, |&(frame, v)| {
        let mut mean_sq = v.iter().map(|vi| vi.norm_squared()).sum::<f64>() / n;
        if mean_sq == 0.0 {
            mean_sq = 1.0;
        }
        Ok(accumulate_field(frame, window, |i, j| {
            v[i].dot(&v[j]) / mean_sq / norm
        }))
    })
}

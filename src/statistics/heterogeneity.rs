//! # Dynamic heterogeneity (χ4)
//!
//! Measures how non-uniform the swarm dynamics are at a given time lag `τ`.
//!
//! For an origin frame `t`, the **overlap order parameter** `Q(t, τ)` is the fraction of
//! particles that moved by at most `cutoff` pixels between `t` and `t + τ`. The **χ4
//! susceptibility** is `N · σ[Q(·, τ)]`, with `σ` the population standard deviation over all
//! origins `t ∈ [0, F − τ)`. Sweeping `τ` gives the spatio-temporal correlation curve whose peak
//! locates the time scale of cooperative motion.
//!
//! Concurrency
//! -----------------
//! [`spatio_temporal_correlation_peak`] evaluates every lag as an independent task on a
//! [`WorkerPool`] owned by the call; arguments are validated before any task is submitted.
use tracing::{debug, info};

use crate::geometry::distance;
use crate::kinematics::detection::{Detection, Trajectory};
use crate::statistics::worker_pool::WorkerPool;
use crate::swarm_errors::SwarmError;

fn check_cutoff(cutoff: f64) -> Result<(), SwarmError> {
    if cutoff.is_nan() || cutoff < 0.0 {
        return Err(SwarmError::InvalidParameter(format!(
            "cutoff must be ≥ 0 (got {cutoff})"
        )));
    }
    Ok(())
}

fn check_lag(frame_count: usize, tau: usize) -> Result<(), SwarmError> {
    if tau >= frame_count {
        return Err(SwarmError::InsufficientHistory {
            required: tau + 1,
            available: frame_count,
        });
    }
    Ok(())
}

/// Fraction of particles whose displacement between `origin` and `origin + tau` is `≤ cutoff`.
///
/// Arguments
/// -----------------
/// * `trajectory`: complete trajectory.
/// * `tau`: time lag in frames.
/// * `cutoff`: displacement threshold in pixels.
/// * `origin`: index of the origin frame.
///
/// Return
/// ----------
/// * A value in `[0, 1]`.
/// * `Err(SwarmError::InsufficientHistory)` if `origin + tau` is not a frame of `trajectory`.
pub fn overlap_order_parameter<D: AsRef<Detection>>(
    trajectory: &Trajectory<D>,
    tau: usize,
    cutoff: f64,
    origin: usize,
) -> Result<f64, SwarmError> {
    let frames = trajectory.frames();
    let (Some(start), Some(end)) = (frames.get(origin), frames.get(origin + tau)) else {
        return Err(SwarmError::InsufficientHistory {
            required: origin + tau + 1,
            available: frames.len(),
        });
    };
    Ok(overlap(start, end, cutoff))
}

fn overlap<D: AsRef<Detection>>(start: &[D], end: &[D], cutoff: f64) -> f64 {
    let still = start
        .iter()
        .zip(end)
        .filter(|(a, b)| distance(&a.as_ref().position, &b.as_ref().position) <= cutoff)
        .count();
    still as f64 / start.len() as f64
}

/// χ4 susceptibility at lag `tau`.
///
/// Return
/// ----------
/// * `N · σ`, where `σ` is the population standard deviation of the overlap order parameter over
///   the `F − tau` origins. Always `≥ 0`.
/// * `Err(SwarmError::InsufficientHistory)` if `tau ≥ F`.
/// * `Err(SwarmError::InvalidParameter)` if `cutoff` is negative or NaN.
pub fn chi4<D: AsRef<Detection>>(
    trajectory: &Trajectory<D>,
    tau: usize,
    cutoff: f64,
) -> Result<f64, SwarmError> {
    check_cutoff(cutoff)?;
    check_lag(trajectory.len(), tau)?;
    Ok(chi4_unchecked(trajectory, tau, cutoff))
}

/// Caller guarantees `tau < F` and `F ≥ 1`.
fn chi4_unchecked<D: AsRef<Detection>>(trajectory: &Trajectory<D>, tau: usize, cutoff: f64) -> f64 {
    let frames = trajectory.frames();
    let overlaps: Vec<f64> = frames
        .iter()
        .zip(&frames[tau..])
        .map(|(start, end)| overlap(start, end, cutoff))
        .collect();

    let n = overlaps.len() as f64;
    let mean = overlaps.iter().sum::<f64>() / n;
    let variance = overlaps.iter().map(|q| (q - mean).powi(2)).sum::<f64>() / n;
    trajectory.population() as f64 * variance.sqrt()
}

/// χ4 for every lag `1..=max_lag`, computed in parallel, and its maximum.
///
/// Arguments
/// -----------------
/// * `trajectory`: complete trajectory with at least 2 frames.
/// * `cutoff`: displacement threshold in pixels, `≥ 0`.
/// * `max_lag`: largest lag of the sweep, `F − 1` when `None`.
///
/// Return
/// ----------
/// * `(peak, curve)` with `curve[τ − 1] = chi4(trajectory, τ, cutoff)` and `peak = max(curve)`.
/// * `Err(SwarmError::InsufficientHistory)` if `F < 2` or `max_lag ≥ F`.
/// * `Err(SwarmError::InvalidParameter)` if `max_lag == 0` or `cutoff` is invalid.
///
/// See also
/// ------------
/// * [`chi4`] – single-lag evaluation.
pub fn spatio_temporal_correlation_peak<D>(
    trajectory: &Trajectory<D>,
    cutoff: f64,
    max_lag: Option<usize>,
) -> Result<(f64, Vec<f64>), SwarmError>
where
    D: AsRef<Detection> + Sync,
{
    check_cutoff(cutoff)?;
    let frame_count = trajectory.len();
    if frame_count < 2 {
        return Err(SwarmError::InsufficientHistory {
            required: 2,
            available: frame_count,
        });
    }
    let max_lag = max_lag.unwrap_or(frame_count - 1);
    if max_lag == 0 {
        return Err(SwarmError::InvalidParameter(
            "max_lag must be at least 1".into(),
        ));
    }
    check_lag(frame_count, max_lag)?;

    let lags: Vec<usize> = (1..=max_lag).collect();
    let pool = WorkerPool::new()?;
    debug!(max_lag, cutoff, "sweeping χ4 over lags");
    let curve = pool.map_ordered(&lags, |&tau| Ok(chi4_unchecked(trajectory, tau, cutoff)))?;

    let peak = curve.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    info!(peak, lags = curve.len(), "χ4 sweep complete");
    Ok((peak, curve))
}

//! # Gap filling of raw detections
//!
//! The marker detector regularly misses robots (motion blur, glare, occlusion), so raw frames
//! are often short or empty. [`reconstruct`] turns such a sequence into a [`Trajectory`] where
//! every frame carries the full, identically ordered population.
//!
//! Algorithm
//! -----------------
//! 1. The **reference frame** is the first frame reaching the maximum detection count. Its
//!    count must equal `bots_number`, otherwise the id universe cannot be established and the
//!    reconstruction fails with [`SwarmError::PopulationMismatch`].
//! 2. For every short frame and every missing id, the first **later** raw frame containing that
//!    id lends a copy of its detection ("borrow from the future"). Poses are never taken from the
//!    past and never interpolated.
//! 3. Frames that remain incomplete (only possible at the tail, when an id never reappears) are
//!    dropped, as are frames whose id set differs from the universe.
//! 4. Retained frames are sorted by ascending id.
//!
//! Dropped frames are logged with `tracing::warn!` and silently shrink the returned trajectory;
//! callers that need frame indices aligned with the recording must compare lengths.
//!
//! Lookahead
//! -----------------
//! Instead of rescanning the future for every missing id, a table mapping each id to the
//! ascending list of raw frames that contain it is built once; the next occurrence is found by
//! binary search. Lenders are always read from the raw input, so the result is the same as the
//! naive forward rescan.
use std::collections::{HashMap, HashSet};

use ahash::RandomState;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::MarkerId;
use crate::kinematics::detection::{Detection, Frame, Trajectory};
use crate::swarm_errors::SwarmError;

/// Behaviour of [`reconstruct_with_policy`] when the best frame does not hold `bots_number`
/// detections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillPolicy {
    /// Fail with [`SwarmError::PopulationMismatch`].
    #[default]
    Strict,
    /// Hand the raw frames back, each sorted by id, without filling anything.
    Passthrough,
}

/// Result of [`reconstruct_with_policy`].
#[derive(Debug, Clone, PartialEq)]
pub enum GapFillOutcome {
    /// Gap-filled, population-complete trajectory.
    Complete(Trajectory),
    /// Population check failed under [`FillPolicy::Passthrough`]: raw frames, sorted by id.
    Passthrough(Vec<Frame>),
}

impl GapFillOutcome {
    /// The reconstructed trajectory, if the population check succeeded.
    pub fn trajectory(self) -> Option<Trajectory> {
        match self {
            GapFillOutcome::Complete(t) => Some(t),
            GapFillOutcome::Passthrough(_) => None,
        }
    }
}

/// Reconstruct a complete trajectory from raw per-frame detections.
///
/// Arguments
/// -----------------
/// * `bots_number`: expected population size (≥ 1).
/// * `raw_frames`: detections per sampled frame, in temporal order. Frames may be short or
///   empty; the input is not modified.
///
/// Return
/// ----------
/// * `Ok(Trajectory)` – every frame holds `bots_number` detections sorted by id.
/// * `Err(SwarmError::PopulationMismatch)` – the best frame does not hold `bots_number` markers.
/// * `Err(SwarmError::EmptyRecording)` – `raw_frames` is empty.
/// * `Err(SwarmError::InvalidParameter)` – `bots_number == 0`.
///
/// See also
/// ------------
/// * [`reconstruct_with_policy`] – opt-in passthrough on population mismatch.
pub fn reconstruct(bots_number: usize, raw_frames: &[Frame]) -> Result<Trajectory, SwarmError> {
    let (best, found) = reference_frame(bots_number, raw_frames)?;
    if found != bots_number {
        return Err(SwarmError::PopulationMismatch {
            expected: bots_number,
            found,
            frame: best,
        });
    }

    let universe: HashSet<MarkerId, RandomState> =
        raw_frames[best].iter().map(|d| d.id).collect();
    if universe.len() != bots_number {
        return Err(SwarmError::InconsistentFrame {
            frame: best,
            reason: "duplicate marker ids in the reference frame".into(),
        });
    }
    let mut universe_sorted: Vec<MarkerId> = universe.iter().copied().collect();
    universe_sorted.sort_unstable();

    let lookahead = build_lookahead(&universe, raw_frames);

    let mut frames = Vec::with_capacity(raw_frames.len());
    let mut dropped = 0usize;
    for (idx, raw) in raw_frames.iter().enumerate() {
        let mut frame = raw.clone();
        if frame.len() < bots_number {
            let present: HashSet<MarkerId, RandomState> = frame.iter().map(|d| d.id).collect();
            for id in universe_sorted.iter().filter(|id| !present.contains(*id)) {
                let lent = next_occurrence(&lookahead, *id, idx)
                    .and_then(|lender| raw_frames[lender].iter().find(|d| d.id == *id));
                if let Some(d) = lent {
                    frame.push(d.clone());
                }
            }
        }

        let frame = sorted_by_id(frame);
        if is_complete(&frame, bots_number, &universe) {
            frames.push(frame);
        } else {
            dropped += 1;
            warn!(
                frame = idx,
                detections = frame.len(),
                expected = bots_number,
                "dropping incomplete frame"
            );
        }
    }

    info!(
        frames_in = raw_frames.len(),
        frames_out = frames.len(),
        dropped,
        bots_number,
        "trajectory reconstructed"
    );

    Ok(Trajectory::from_parts(bots_number, frames))
}

/// [`reconstruct`] with an explicit policy for the population check.
///
/// Under [`FillPolicy::Passthrough`] a population mismatch is logged and the raw frames are
/// returned sorted by id instead of failing. Every other error is still reported.
pub fn reconstruct_with_policy(
    bots_number: usize,
    raw_frames: &[Frame],
    policy: FillPolicy,
) -> Result<GapFillOutcome, SwarmError> {
    match (policy, reconstruct(bots_number, raw_frames)) {
        (
            FillPolicy::Passthrough,
            Err(SwarmError::PopulationMismatch {
                expected,
                found,
                frame,
            }),
        ) => {
            warn!(
                expected,
                found, frame, "population mismatch, returning raw frames"
            );
            Ok(GapFillOutcome::Passthrough(
                raw_frames.iter().cloned().map(sorted_by_id).collect(),
            ))
        }
        (_, result) => result.map(GapFillOutcome::Complete),
    }
}

/// Index and size of the first frame reaching the maximum detection count.
fn reference_frame(
    bots_number: usize,
    raw_frames: &[Frame],
) -> Result<(usize, usize), SwarmError> {
    if bots_number == 0 {
        return Err(SwarmError::InvalidParameter(
            "bots_number must be at least 1".into(),
        ));
    }
    if raw_frames.is_empty() {
        return Err(SwarmError::EmptyRecording);
    }

    let mut best = 0;
    for (idx, frame) in raw_frames.iter().enumerate().skip(1) {
        if frame.len() > raw_frames[best].len() {
            best = idx;
        }
    }
    Ok((best, raw_frames[best].len()))
}

/// For each id of the universe, the ascending indices of the raw frames that contain it.
fn build_lookahead(
    universe: &HashSet<MarkerId, RandomState>,
    raw_frames: &[Frame],
) -> HashMap<MarkerId, Vec<usize>, RandomState> {
    let mut table: HashMap<MarkerId, Vec<usize>, RandomState> =
        HashMap::with_capacity_and_hasher(universe.len(), RandomState::new());
    for (idx, frame) in raw_frames.iter().enumerate() {
        for d in frame.iter().filter(|d| universe.contains(&d.id)) {
            let slots = table.entry(d.id).or_default();
            if slots.last() != Some(&idx) {
                slots.push(idx);
            }
        }
    }
    table
}

/// First raw frame strictly after `after` that contains `id`.
#[inline]
fn next_occurrence(
    lookahead: &HashMap<MarkerId, Vec<usize>, RandomState>,
    id: MarkerId,
    after: usize,
) -> Option<usize> {
    let slots = lookahead.get(&id)?;
    let pos = slots.partition_point(|&f| f <= after);
    slots.get(pos).copied()
}

fn sorted_by_id(mut frame: Frame) -> Frame {
    frame.sort_by_key(|d: &Detection| d.id);
    frame
}

/// `frame` must already be sorted by id.
fn is_complete(
    frame: &[Detection],
    bots_number: usize,
    universe: &HashSet<MarkerId, RandomState>,
) -> bool {
    frame.len() == bots_number
        && frame.windows(2).all(|w| w[0].id < w[1].id)
        && frame.iter().all(|d| universe.contains(&d.id))
}

#[cfg(test)]
mod gap_filling_test {
    use super::*;

    fn det(id: MarkerId, x: f64) -> Detection {
        Detection::new(id, 0.0, x, 0.0)
    }

    /// Straight transcription of the forward rescan, used as a reference.
    fn naive_fill(bots_number: usize, raw: &[Frame], universe: &[MarkerId]) -> Vec<Frame> {
        let mut out = Vec::new();
        for (i, frame) in raw.iter().enumerate() {
            let mut f = frame.clone();
            if f.len() < bots_number {
                for id in universe {
                    if f.iter().any(|d| d.id == *id) {
                        continue;
                    }
                    'scan: for next in &raw[i + 1..] {
                        for d in next {
                            if d.id == *id {
                                f.push(d.clone());
                                break 'scan;
                            }
                        }
                    }
                }
            }
            f.sort_by_key(|d| d.id);
            if f.len() == bots_number {
                out.push(f);
            }
        }
        out
    }

    #[test]
    fn test_borrow_from_future() {
        let raw = vec![
            vec![det(1, 0.0), det(2, 0.0), det(3, 0.0)],
            vec![det(3, 1.0), det(1, 1.0)],
            vec![det(1, 2.0), det(2, 42.0), det(3, 2.0)],
        ];
        let traj = reconstruct(3, &raw).unwrap();
        assert_eq!(traj.len(), 3);
        let f1 = traj.frame(1).unwrap();
        assert_eq!(f1.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(f1[1].position.x, 42.0);
        // the lender keeps its own copy
        assert_eq!(traj.frame(2).unwrap()[1].position.x, 42.0);
    }

    #[test]
    fn test_never_reappearing_id_drops_frame() {
        let raw = vec![
            vec![det(1, 0.0), det(2, 0.0), det(3, 0.0)],
            vec![det(1, 1.0), det(3, 1.0)],
            vec![det(1, 2.0), det(3, 2.0)],
        ];
        let traj = reconstruct(3, &raw).unwrap();
        assert_eq!(traj.len(), 1);
        assert_eq!(traj.frame(0).unwrap()[0].position.x, 0.0);
    }

    #[test]
    fn test_empty_frames_are_filled() {
        let raw = vec![
            vec![],
            vec![det(2, 1.0)],
            vec![det(2, 2.0), det(1, 2.0)],
        ];
        let traj = reconstruct(2, &raw).unwrap();
        assert_eq!(traj.len(), 3);
        assert_eq!(traj.frame(0).unwrap()[0].position.x, 2.0);
        assert_eq!(traj.frame(0).unwrap()[1].position.x, 1.0);
        assert_eq!(traj.frame(1).unwrap()[0].position.x, 2.0);
    }

    #[test]
    fn test_population_mismatch() {
        let raw = vec![vec![det(1, 0.0)], vec![det(1, 0.0), det(2, 0.0)]];
        assert_eq!(
            reconstruct(3, &raw),
            Err(SwarmError::PopulationMismatch {
                expected: 3,
                found: 2,
                frame: 1
            })
        );
        assert_eq!(
            reconstruct(1, &raw),
            Err(SwarmError::PopulationMismatch {
                expected: 1,
                found: 2,
                frame: 1
            })
        );
    }

    #[test]
    fn test_reference_frame_is_first_maximum() {
        let raw = vec![
            vec![det(1, 0.0)],
            vec![det(1, 0.0), det(2, 0.0)],
            vec![det(1, 0.0), det(3, 0.0)],
        ];
        // frame 1 defines the universe {1, 2}; frame 2 holds the foreign id 3 and is dropped
        let traj = reconstruct(2, &raw).unwrap();
        assert_eq!(traj.ids(), vec![1, 2]);
        assert_eq!(traj.len(), 2);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(reconstruct(2, &[]), Err(SwarmError::EmptyRecording));
        assert!(matches!(
            reconstruct(0, &[vec![]]),
            Err(SwarmError::InvalidParameter(_))
        ));
        assert!(matches!(
            reconstruct(2, &[vec![det(1, 0.0), det(1, 1.0)]]),
            Err(SwarmError::InconsistentFrame { frame: 0, .. })
        ));
    }

    #[test]
    fn test_passthrough_policy() {
        let raw = vec![vec![det(2, 0.0), det(1, 0.0)], vec![]];
        let outcome = reconstruct_with_policy(3, &raw, FillPolicy::Passthrough).unwrap();
        match outcome {
            GapFillOutcome::Passthrough(frames) => {
                assert_eq!(frames.len(), 2);
                assert_eq!(frames[0][0].id, 1);
                assert!(frames[1].is_empty());
            }
            GapFillOutcome::Complete(_) => panic!("expected passthrough"),
        }

        let complete = reconstruct_with_policy(2, &raw, FillPolicy::Passthrough).unwrap();
        assert_eq!(complete.trajectory().unwrap().len(), 1);
    }

    #[test]
    fn test_lookahead_matches_forward_rescan() {
        // deterministic pseudo-random visibility pattern
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        let bots = 6usize;
        let mut raw: Vec<Frame> = Vec::new();
        for f in 0..60 {
            let mut frame: Frame = (1..=bots as MarkerId)
                .filter(|_| f == 17 || next() % 4 != 0)
                .map(|id| det(id, (f * 100) as f64 + id as f64))
                .collect();
            frame.reverse();
            raw.push(frame);
        }

        let universe: Vec<MarkerId> = (1..=bots as MarkerId).collect();
        let expected = naive_fill(bots, &raw, &universe);
        let traj = reconstruct(bots, &raw).unwrap();
        assert_eq!(traj.into_frames(), expected);
    }
}

#![allow(dead_code)]

use nalgebra::Point2;
use swarmkin::constants::{MarkerId, DEG2RAD};
use swarmkin::kinematics::detection::{Detection, Frame};

/// Deterministic xorshift64 generator, enough to scatter missed detections.
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        XorShift(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        (self.next_u64() % 10_000) as f64 / 10_000.0 < p
    }
}

/// Four robots on the corners of a `side × side` square, motionless over `frames` frames.
pub fn stationary_square(frames: usize, side: f64) -> Vec<Frame> {
    let corners = [(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)];
    (0..frames)
        .map(|_| {
            corners
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| Detection::new(i as MarkerId + 1, 0.0, x, y))
                .collect()
        })
        .collect()
}

/// `robots` robots spread over an arc of `spread` degrees at distance `radius` from `center`,
/// the whole arc rotating by `step` degrees per frame. Headings follow the tangent.
pub fn rotating_arc(
    robots: usize,
    frames: usize,
    center: Point2<f64>,
    radius: f64,
    spread: f64,
    step: f64,
) -> Vec<Frame> {
    (0..frames)
        .map(|k| {
            (0..robots)
                .map(|i| {
                    let polar = k as f64 * step + spread * i as f64 / robots.max(2) as f64;
                    let (sin, cos) = (polar * DEG2RAD).sin_cos();
                    Detection::new(
                        10 + i as MarkerId,
                        (polar + 90.0).rem_euclid(360.0),
                        center.x + radius * cos,
                        center.y + radius * sin,
                    )
                })
                .collect()
        })
        .collect()
}

/// Remove detections at random, keeping `keep_first` frames intact, then shuffle each frame.
pub fn with_missed_detections(
    frames: &[Frame],
    miss_rate: f64,
    keep_first: usize,
    rng: &mut XorShift,
) -> Vec<Frame> {
    frames
        .iter()
        .enumerate()
        .map(|(k, frame)| {
            let mut kept: Frame = frame
                .iter()
                .filter(|_| k < keep_first || !rng.chance(miss_rate))
                .cloned()
                .collect();
            kept.reverse();
            kept
        })
        .collect()
}

/// Assert the invariants of a reconstructed trajectory frame by frame.
pub fn assert_complete(frames: &[Frame], bots_number: usize) {
    let reference: Vec<MarkerId> = frames[0].iter().map(|d| d.id).collect();
    assert_eq!(reference.len(), bots_number);
    for frame in frames {
        assert_eq!(frame.len(), bots_number);
        let ids: Vec<MarkerId> = frame.iter().map(|d| d.id).collect();
        assert_eq!(ids, reference);
    }
}

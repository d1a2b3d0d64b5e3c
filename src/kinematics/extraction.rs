//! # Extraction driver
//!
//! Glue between an external marker detector and the gap filler. The detector (video decoding,
//! intensity rescaling, marker recognition) is abstracted behind [`MarkerDetector`]; this module
//! decides which frames are sampled, drops ignored markers and hands the raw frames to
//! [`reconstruct_with_policy`].
//!
//! ## Example
//!
//! ```rust
//! use swarmkin::kinematics::detection::Detection;
//! use swarmkin::kinematics::extraction::{
//!     extract_trajectory, ExtractionParams, IntensityScale, MarkerDetector,
//! };
//!
//! struct Replay(Vec<Vec<Detection>>);
//!
//! impl MarkerDetector for Replay {
//!     fn frame_count(&self) -> usize {
//!         self.0.len()
//!     }
//!     fn detect(&mut self, frame_index: usize, _scale: &IntensityScale) -> Vec<Detection> {
//!         self.0.get(frame_index - 1).cloned().unwrap_or_default()
//!     }
//! }
//!
//! let mut detector = Replay(vec![
//!     vec![Detection::new(1, 0.0, 0.0, 0.0), Detection::new(2, 0.0, 5.0, 5.0)],
//!     vec![Detection::new(2, 0.0, 6.0, 5.0)],
//!     vec![Detection::new(1, 0.0, 1.0, 0.0), Detection::new(2, 0.0, 7.0, 5.0)],
//! ]);
//! let params = ExtractionParams::builder(2).build().unwrap();
//! let trajectory = extract_trajectory(&mut detector, &params)
//!     .unwrap()
//!     .trajectory()
//!     .unwrap();
//! assert_eq!(trajectory.len(), 3);
//! ```
use std::collections::HashSet;

use ahash::RandomState;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

use nalgebra::Point2;

use crate::constants::{MarkerId, FIELD_CENTER_SCAN_FRAMES};
use crate::kinematics::detection::{Detection, Frame};
use crate::kinematics::gap_filling::{reconstruct_with_policy, FillPolicy, GapFillOutcome};
use crate::kinematics::markers::field_center_from_markers;
use crate::swarm_errors::SwarmError;

/// Linear pixel-intensity rescale `alpha · pixel + beta`, applied by the detector before
/// recognition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityScale {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for IntensityScale {
    fn default() -> Self {
        IntensityScale {
            alpha: 1.0,
            beta: 0.0,
        }
    }
}

/// Source of raw detections, one recording at a time.
pub trait MarkerDetector {
    /// Total number of frames of the recording.
    fn frame_count(&self) -> usize;

    /// Detections of frame `frame_index` (1-based), in any order.
    ///
    /// Must return an empty list when the frame cannot be read or nothing is recognized.
    fn detect(&mut self, frame_index: usize, scale: &IntensityScale) -> Vec<Detection>;
}

/// Configuration of one extraction call.
///
/// Fields
/// -----------------
/// * `bots_number` – expected population size.
/// * `begin_frame`, `end_frame` – inclusive, 1-based frame range; clamped to the recording.
/// * `frame_stride` – keep every `frame_stride`-th frame starting at `begin_frame`.
/// * `ignored_ids` – markers that are not robots (field landmarks, calibration tags).
/// * `intensity_scale` – rescale forwarded to the detector.
/// * `fill_policy` – behaviour on population mismatch, see [`FillPolicy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionParams {
    pub bots_number: usize,
    pub begin_frame: usize,
    pub end_frame: usize,
    pub frame_stride: usize,
    pub ignored_ids: HashSet<MarkerId, RandomState>,
    pub intensity_scale: IntensityScale,
    pub fill_policy: FillPolicy,
}

impl ExtractionParams {
    pub fn builder(bots_number: usize) -> ExtractionParamsBuilder {
        ExtractionParamsBuilder::new(bots_number)
    }
}

/// Builder for [`ExtractionParams`], with validation.
#[derive(Debug, Clone)]
pub struct ExtractionParamsBuilder {
    params: ExtractionParams,
}

impl ExtractionParamsBuilder {
    /// Whole recording, every frame, no ignored marker, identity rescale, strict filling.
    pub fn new(bots_number: usize) -> Self {
        Self {
            params: ExtractionParams {
                bots_number,
                begin_frame: 1,
                end_frame: usize::MAX,
                frame_stride: 1,
                ignored_ids: HashSet::default(),
                intensity_scale: IntensityScale::default(),
                fill_policy: FillPolicy::Strict,
            },
        }
    }

    pub fn begin_frame(mut self, v: usize) -> Self {
        self.params.begin_frame = v;
        self
    }
    pub fn end_frame(mut self, v: usize) -> Self {
        self.params.end_frame = v;
        self
    }
    pub fn frame_stride(mut self, v: usize) -> Self {
        self.params.frame_stride = v;
        self
    }
    pub fn ignored_ids(mut self, ids: impl IntoIterator<Item = MarkerId>) -> Self {
        self.params.ignored_ids = ids.into_iter().collect();
        self
    }
    pub fn intensity_scale(mut self, alpha: f64, beta: f64) -> Self {
        self.params.intensity_scale = IntensityScale { alpha, beta };
        self
    }
    pub fn fill_policy(mut self, v: FillPolicy) -> Self {
        self.params.fill_policy = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `bots_number ≥ 1`, `frame_stride ≥ 1`.
    /// * `begin_frame ≤ end_frame`.
    /// * `alpha` and `beta` are finite.
    pub fn build(self) -> Result<ExtractionParams, SwarmError> {
        let p = &self.params;
        if p.bots_number == 0 {
            return Err(SwarmError::InvalidParameter(
                "bots_number must be at least 1".into(),
            ));
        }
        if p.frame_stride == 0 {
            return Err(SwarmError::InvalidParameter(
                "frame_stride must be at least 1".into(),
            ));
        }
        if p.begin_frame > p.end_frame {
            return Err(SwarmError::InvalidParameter(format!(
                "begin_frame ({}) is after end_frame ({})",
                p.begin_frame, p.end_frame
            )));
        }
        if !p.intensity_scale.alpha.is_finite() || !p.intensity_scale.beta.is_finite() {
            return Err(SwarmError::InvalidParameter(
                "intensity scale must be finite".into(),
            ));
        }
        Ok(self.params)
    }
}

/// Frame indices visited for a recording of `frame_count` frames.
fn sampled_frames(params: &ExtractionParams, frame_count: usize) -> impl Iterator<Item = usize> {
    let start = params.begin_frame.max(1);
    let finish = params.end_frame.min(frame_count);
    (start..=finish).step_by(params.frame_stride)
}

/// Run the detector over the sampled frames and reconstruct the trajectory.
///
/// Arguments
/// -----------------
/// * `detector`: source of raw detections.
/// * `params`: validated extraction parameters.
///
/// Return
/// ----------
/// * The outcome of [`reconstruct_with_policy`] on the sampled raw frames.
/// * `Err(SwarmError::EmptyRecording)` if the clamped frame range is empty.
pub fn extract_trajectory<M: MarkerDetector + ?Sized>(
    detector: &mut M,
    params: &ExtractionParams,
) -> Result<GapFillOutcome, SwarmError> {
    let frame_count = detector.frame_count();
    let indices: Vec<usize> = sampled_frames(params, frame_count).collect();
    if indices.is_empty() {
        return Err(SwarmError::EmptyRecording);
    }
    debug!(
        frame_count,
        sampled = indices.len(),
        stride = params.frame_stride,
        "extracting raw detections"
    );

    #[cfg(feature = "progress")]
    let pb = {
        let pb = ProgressBar::new(indices.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames")
                .expect("indicatif template"),
        );
        pb
    };

    let mut raw_frames: Vec<Frame> = Vec::with_capacity(indices.len());
    for frame_index in indices {
        let mut frame: Frame = detector
            .detect(frame_index, &params.intensity_scale)
            .into_iter()
            .filter(|d| !params.ignored_ids.contains(&d.id))
            .collect();
        frame.sort_by_key(|d| d.id);
        raw_frames.push(frame);

        #[cfg(feature = "progress")]
        pb.inc(1);
    }

    #[cfg(feature = "progress")]
    pb.finish_and_clear();

    reconstruct_with_policy(params.bots_number, &raw_frames, params.fill_policy)
}

/// Field center located on the first frames of a recording.
///
/// Frames `1..=min(max_frames, frame_count)` are scanned in order; the first one in which both
/// marker pairs are recognized and their lines cross gives the center.
///
/// Arguments
/// -----------------
/// * `detector`: source of raw detections.
/// * `first_line`, `second_line`: marker ids defining each line.
/// * `scale`: rescale forwarded to the detector.
/// * `max_frames`: scan length, [`FIELD_CENTER_SCAN_FRAMES`] when `None`.
///
/// Return
/// ----------
/// * `None` if no scanned frame yields a center.
///
/// See also
/// ------------
/// * [`field_center_from_markers`] – the same computation on a single frame.
pub fn field_center_from_detector<M: MarkerDetector + ?Sized>(
    detector: &mut M,
    first_line: (MarkerId, MarkerId),
    second_line: (MarkerId, MarkerId),
    scale: &IntensityScale,
    max_frames: Option<usize>,
) -> Option<Point2<f64>> {
    let last = max_frames
        .unwrap_or(FIELD_CENTER_SCAN_FRAMES)
        .min(detector.frame_count());
    let center = (1..=last).find_map(|frame_index| {
        field_center_from_markers(&detector.detect(frame_index, scale), first_line, second_line)
    });
    if center.is_none() {
        debug!(scanned = last, "field landmarks not found");
    }
    center
}

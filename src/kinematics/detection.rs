//! # Detections, frames and trajectories
//!
//! Data model shared by the whole crate:
//!
//! * [`Detection`] – one marker seen in one frame (`id`, heading, pixel position),
//! * [`PolarDetection`] – a detection extended with polar coordinates around a field center,
//! * [`Frame`] – the detections of one sampled instant,
//! * [`Trajectory`] – an ordered, gap-free, population-complete sequence of frames.
//!
//! Invariants of a [`Trajectory`]
//! -----------------
//! * every frame holds exactly [`Trajectory::population`] detections,
//! * every frame is sorted by ascending `id`,
//! * the set of ids is identical across frames.
//!
//! Statistics rely on these invariants to align particles **by index** between frames, so a
//! `Trajectory` can only be obtained through [`reconstruct`](crate::kinematics::gap_filling::reconstruct),
//! [`polar_extend`](crate::kinematics::augment::polar_extend) or the validating
//! [`Trajectory::from_frames`].
use nalgebra::Point2;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{Degree, MarkerId, Pixel};
use crate::swarm_errors::SwarmError;

/// A single marker observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Identifier decoded from the marker, stable across frames.
    pub id: MarkerId,
    /// Heading in degrees, `[0, 360)`, clockwise from the image x-axis.
    pub heading: Degree,
    /// Marker center in image pixels.
    pub position: Point2<Pixel>,
}

impl Detection {
    pub fn new(id: MarkerId, heading: Degree, x: Pixel, y: Pixel) -> Self {
        Detection {
            id,
            heading,
            position: Point2::new(x, y),
        }
    }
}

impl AsRef<Detection> for Detection {
    fn as_ref(&self) -> &Detection {
        self
    }
}

/// A [`Detection`] extended with its polar coordinates around a field center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarDetection {
    pub detection: Detection,
    /// Signed angle of `position − center`, degrees in `(−180, 180]`.
    pub polar_angle: Degree,
    /// Distance between `position` and the center, pixels.
    pub radius: Pixel,
}

impl AsRef<Detection> for PolarDetection {
    fn as_ref(&self) -> &Detection {
        &self.detection
    }
}

/// Detections of one sampled instant.
pub type Frame<D = Detection> = Vec<D>;

/// Gap-free sequence of frames with a fixed, identically ordered population.
///
/// Deserialization goes through [`Trajectory::from_frames`]: a serialized trajectory whose
/// frames break the invariants, or whose `population` disagrees with its frames, is rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory<D = Detection> {
    population: usize,
    frames: Vec<Frame<D>>,
}

/// Unchecked serialized form of a [`Trajectory`].
#[derive(Deserialize)]
struct TrajectoryRecord<D> {
    population: usize,
    frames: Vec<Frame<D>>,
}

impl<D: AsRef<Detection>> TryFrom<TrajectoryRecord<D>> for Trajectory<D> {
    type Error = SwarmError;

    fn try_from(record: TrajectoryRecord<D>) -> Result<Self, Self::Error> {
        let trajectory = Trajectory::from_frames(record.frames)?;
        if trajectory.population != record.population {
            return Err(SwarmError::InconsistentFrame {
                frame: 0,
                reason: format!(
                    "{} detections but a population of {}",
                    trajectory.population, record.population
                ),
            });
        }
        Ok(trajectory)
    }
}

impl<'de, D> Deserialize<'de> for Trajectory<D>
where
    D: AsRef<Detection> + Deserialize<'de>,
{
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        let record = TrajectoryRecord::deserialize(deserializer)?;
        Trajectory::try_from(record).map_err(serde::de::Error::custom)
    }
}

impl<D: AsRef<Detection>> Trajectory<D> {
    /// Build a trajectory from frames that are already complete.
    ///
    /// Arguments
    /// -----------------
    /// * `frames`: non-empty list of frames; the first one defines the population and ids.
    ///
    /// Return
    /// ----------
    /// * `Err(SwarmError::EmptyRecording)` if `frames` is empty or its first frame is empty.
    /// * `Err(SwarmError::InconsistentFrame)` for the first frame whose size, order or id set
    ///   deviates from the first frame.
    pub fn from_frames(frames: Vec<Frame<D>>) -> Result<Self, SwarmError> {
        let first = frames.first().ok_or(SwarmError::EmptyRecording)?;
        if first.is_empty() {
            return Err(SwarmError::EmptyRecording);
        }
        let reference: Vec<MarkerId> = first.iter().map(|d| d.as_ref().id).collect();
        if reference.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SwarmError::InconsistentFrame {
                frame: 0,
                reason: "ids are not strictly ascending".into(),
            });
        }

        for (idx, frame) in frames.iter().enumerate().skip(1) {
            if frame.len() != reference.len() {
                return Err(SwarmError::InconsistentFrame {
                    frame: idx,
                    reason: format!(
                        "{} detections instead of {}",
                        frame.len(),
                        reference.len()
                    ),
                });
            }
            if frame
                .iter()
                .zip(&reference)
                .any(|(d, id)| d.as_ref().id != *id)
            {
                return Err(SwarmError::InconsistentFrame {
                    frame: idx,
                    reason: "ids differ from the first frame".into(),
                });
            }
        }

        Ok(Trajectory {
            population: reference.len(),
            frames,
        })
    }

    /// Identifiers of the population, ascending. Empty if the trajectory has no frame.
    pub fn ids(&self) -> Vec<MarkerId> {
        self.frames
            .first()
            .map(|f| f.iter().map(|d| d.as_ref().id).collect())
            .unwrap_or_default()
    }

    /// Positions of the population at frame `index`, in id order.
    pub fn positions(&self, index: usize) -> Option<Vec<Point2<Pixel>>> {
        self.frames
            .get(index)
            .map(|f| f.iter().map(|d| d.as_ref().position).collect())
    }
}

impl<D> Trajectory<D> {
    /// Caller guarantees the invariants documented at module level.
    pub(crate) fn from_parts(population: usize, frames: Vec<Frame<D>>) -> Self {
        Trajectory { population, frames }
    }

    /// Number of particles present in every frame.
    pub fn population(&self) -> usize {
        self.population
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame<D>] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&[D]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    pub fn into_frames(self) -> Vec<Frame<D>> {
        self.frames
    }
}

//! # Kinematics: from raw detections to a complete trajectory
//!
//! Modules
//! -----------------
//! * [`detection`](crate::kinematics::detection) – `Detection`, `PolarDetection`, `Frame` and the
//!   invariant-carrying `Trajectory`.
//! * [`gap_filling`](crate::kinematics::gap_filling) – forward-borrow reconstruction of missed
//!   detections.
//! * [`augment`](crate::kinematics::augment) – polar coordinates around a field center and
//!   per-frame velocities.
//! * [`markers`](crate::kinematics::markers) – marker corner geometry, metric constant and field
//!   center helpers.
//! * [`extraction`](crate::kinematics::extraction) – `MarkerDetector` seam and the extraction
//!   driver feeding the gap filler.
//!
//! Data flow
//! -----------------
//! ```text
//! MarkerDetector ─▶ raw frames ─▶ reconstruct ─▶ Trajectory ─▶ polar_extend / velocities
//! ```
pub mod augment;
pub mod detection;
pub mod extraction;
pub mod gap_filling;
pub mod markers;

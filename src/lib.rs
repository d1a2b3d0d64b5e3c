//! # swarmkin
//!
//! Kinematics reconstruction and collective-motion statistics for recorded robot swarms.
//!
//! A marker detector reports, for each video frame, the `(id, heading, position)` of the robots
//! it recognized. Detections get lost; [`kinematics::gap_filling::reconstruct`] turns that noisy
//! stream into a [`Trajectory`](kinematics::detection::Trajectory) where every frame holds the
//! whole population in id order. The [`statistics`] engines then compute per-frame or per-lag
//! observables of active-matter physics on it.
//!
//! ## Quick start
//!
//! ```rust
//! use nalgebra::Point2;
//! use swarmkin::kinematics::augment::polar_extend;
//! use swarmkin::kinematics::detection::Detection;
//! use swarmkin::kinematics::gap_filling::reconstruct;
//! use swarmkin::statistics::heterogeneity::spatio_temporal_correlation_peak;
//! use swarmkin::statistics::scalar::{mean_cartesian_displacement, mean_polar_angle};
//!
//! let raw = vec![
//!     vec![Detection::new(1, 0.0, 10.0, 0.0), Detection::new(2, 90.0, 0.0, 10.0)],
//!     vec![Detection::new(2, 90.0, 0.0, 11.0)],
//!     vec![Detection::new(1, 0.0, 12.0, 0.0), Detection::new(2, 90.0, 0.0, 12.0)],
//! ];
//! let trajectory = reconstruct(2, &raw).unwrap();
//! assert_eq!(trajectory.len(), 3);
//!
//! let displacement = mean_cartesian_displacement(&trajectory);
//! assert_eq!(displacement[0], 0.0);
//!
//! let polar = polar_extend(&trajectory, &Point2::origin());
//! assert!((mean_polar_angle(&polar)[0] - 45.0).abs() < 1e-9);
//!
//! let (peak, curve) = spatio_temporal_correlation_peak(&trajectory, 1.5, None).unwrap();
//! assert_eq!(curve.len(), 2);
//! assert!(peak >= 0.0);
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber.
pub mod constants;
pub mod geometry;
pub mod kinematics;
pub mod statistics;
pub mod swarm_errors;

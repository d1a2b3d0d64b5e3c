//! # Constants and type definitions for swarmkin
//!
//! This module centralizes the **unit conversions**, **calibration constants**, and **common type
//! aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Degree ↔ radian conversion factors
//! - Calibration constants of the experimental setup (robot footprint outline, shrink factor,
//!   default collision radius)
//! - Heuristic thresholds used by the statistics (polar-angle unwrapping)
//! - Core type aliases shared by the kinematics and statistics modules
//!
//! Calibration values encode the physical setup of the recordings rather than algorithmic
//! necessity. Every one of them can be overridden through the parameter structs of the module
//! that consumes it.

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// Degrees → radians
pub const DEG2RAD: f64 = std::f64::consts::PI / 180.0;

/// Radians → degrees
pub const RAD2DEG: f64 = 180.0 / std::f64::consts::PI;

/// Full turn in degrees
pub const FULL_TURN_DEG: f64 = 360.0;

// -------------------------------------------------------------------------------------------------
// Numerical tolerances and heuristics
// -------------------------------------------------------------------------------------------------

/// Tolerance of the collinear bounding-extent check in the segment intersection test.
pub const SEGMENT_EPS: f64 = 1e-9;

/// Frame-to-frame change of the mean polar angle (degrees) above which the change is treated
/// as a wraparound artifact of the bounded angle representation.
///
/// Assumes the swarm rotates by much less than this between two sampled frames.
pub const POLAR_UNWRAP_THRESHOLD_DEG: f64 = 100.0;

/// Number of leading frames searched for the field landmarks when locating the field center.
pub const FIELD_CENTER_SCAN_FRAMES: usize = 100;

// -------------------------------------------------------------------------------------------------
// Collision calibration
// -------------------------------------------------------------------------------------------------

/// Default center-to-center distance (pixels) under which two robots are considered colliding.
pub const DEFAULT_COLLISION_RADIUS_PX: f64 = 300.0;

/// Empirical factor dividing the metric footprint before it is placed in the image.
pub const FOOTPRINT_SHRINK_FACTOR: f64 = 1.2;

/// Number of vertices of the robot footprint outline.
pub const STADIUM_VERTICES: usize = 22;

/// Closed outline of a robot seen from above, in centimetres, body-centered, long axis along +x.
///
/// Stadium shape: two half-discs of radius 2.5 cm joined by a 4 cm straight section, each cap
/// sampled every 18°.
pub const STADIUM_OUTLINE_CM: [[f64; 2]; STADIUM_VERTICES] = [
    [2.0000, -2.5000],
    [2.7725, -2.3776],
    [3.4695, -2.0225],
    [4.0225, -1.4695],
    [4.3776, -0.7725],
    [4.5000, 0.0000],
    [4.3776, 0.7725],
    [4.0225, 1.4695],
    [3.4695, 2.0225],
    [2.7725, 2.3776],
    [2.0000, 2.5000],
    [-2.0000, 2.5000],
    [-2.7725, 2.3776],
    [-3.4695, 2.0225],
    [-4.0225, 1.4695],
    [-4.3776, 0.7725],
    [-4.5000, 0.0000],
    [-4.3776, -0.7725],
    [-4.0225, -1.4695],
    [-3.4695, -2.0225],
    [-2.7725, -2.3776],
    [-2.0000, -2.5000],
];

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Length in image pixels
pub type Pixel = f64;
/// Length in centimetres
pub type Centimeter = f64;
/// Identifier decoded from a fiducial marker
pub type MarkerId = u32;

//! # Swarm statistics
//!
//! Every engine consumes a complete [`Trajectory`](crate::kinematics::detection::Trajectory) and
//! returns an ordered sequence aligned on frames (or on lags for χ4).
//!
//! Modules
//! -----------------
//! * [`scalar`](crate::statistics::scalar) – sequential per-frame scalars: distance from center,
//!   unwrapped rotation, displacement, bond-orientational order.
//! * [`heterogeneity`](crate::statistics::heterogeneity) – overlap order parameter, χ4 and its
//!   parallel sweep over lags.
//! * [`clustering`](crate::statistics::clustering) – collision graph and clustering coefficient.
//! * [`correlation_field`](crate::statistics::correlation_field) – body-frame position,
//!   orientation and velocity correlation matrices.
//! * [`worker_pool`](crate::statistics::worker_pool) – the scoped, order-preserving parallel map
//!   used by the engines above.
//!
//! Parallel engines validate their arguments first, then build a [`WorkerPool`](worker_pool::WorkerPool)
//! that lives for the duration of the call. A failing work item aborts the whole call.
pub mod clustering;
pub mod correlation_field;
pub mod heterogeneity;
pub mod scalar;
pub mod worker_pool;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwarmError {
    #[error(
        "Best recognized frame {frame} holds {found} markers but {expected} robots were expected"
    )]
    PopulationMismatch {
        expected: usize,
        found: usize,
        frame: usize,
    },

    #[error("The recording does not contain any frame")]
    EmptyRecording,

    #[error("Not enough frames: {required} required, {available} available")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Frame {frame} breaks the trajectory invariant: {reason}")]
    InconsistentFrame { frame: usize, reason: String },

    #[error("Unable to build the worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl PartialEq for SwarmError {
    fn eq(&self, other: &Self) -> bool {
        use SwarmError::*;
        match (self, other) {
            (
                PopulationMismatch {
                    expected: e1,
                    found: f1,
                    frame: i1,
                },
                PopulationMismatch {
                    expected: e2,
                    found: f2,
                    frame: i2,
                },
            ) => e1 == e2 && f1 == f2 && i1 == i2,
            (
                InsufficientHistory {
                    required: r1,
                    available: a1,
                },
                InsufficientHistory {
                    required: r2,
                    available: a2,
                },
            ) => r1 == r2 && a1 == a2,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (
                InconsistentFrame {
                    frame: f1,
                    reason: r1,
                },
                InconsistentFrame {
                    frame: f2,
                    reason: r2,
                },
            ) => f1 == f2 && r1 == r2,

            // The rayon build error carries no comparable payload
            (WorkerPool(_), WorkerPool(_)) => true,

            (EmptyRecording, EmptyRecording) => true,

            _ => false,
        }
    }
}

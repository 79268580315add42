use std::time::Duration;

/// Invalid settings detected when building a tracker or its inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error(
        "sampling interval ({sampling:?}) must not exceed the calculation period ({calculation:?})"
    )]
    SamplingExceedsCalculation {
        sampling: Duration,
        calculation: Duration,
    },

    #[error(
        "calculation period ({calculation:?}) must not exceed the collection window ({collection:?})"
    )]
    CalculationExceedsCollection {
        calculation: Duration,
        collection: Duration,
    },

    #[error("collection window needs {required} samples, more than the limit of {limit}")]
    HistoryTooLarge { required: usize, limit: usize },

    #[error("guaranteed CPU units must be a finite positive number, got {0}")]
    CpuUnits(f64),

    #[error("cannot resolve the current process: {0}")]
    CurrentProcess(&'static str),
}

/// A single failed read of the OS counters.
#[derive(Debug, thiserror::Error)]
#[error("sampling failed: {0}")]
pub struct SamplingError(pub String);

/// A single publisher failed to accept a utilization value.
#[derive(Debug, thiserror::Error)]
#[error("publish failed: {0}")]
pub struct PublishError(pub String);

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("requested window {requested:?} must be positive and at most {collection:?}")]
    InvalidWindow {
        requested: Duration,
        collection: Duration,
    },

    #[error("cannot {action} a tracker that is {state}")]
    InvalidState {
        action: &'static str,
        state: crate::tracker::TrackerState,
    },

    #[error("could not take the initial sample")]
    SeedSample(#[source] SamplingError),
}

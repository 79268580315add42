//! Windowed resource-utilization tracking.
//!
//! A [`Tracker`](tracker::Tracker) samples cumulative CPU and memory counters
//! from a [`SnapshotSource`](snapshot::SnapshotSource) on a fixed interval,
//! keeps a bounded [`RingHistory`](history::RingHistory) of them, and reduces
//! two samples into a [`Utilization`](calculator::Utilization) on demand or on
//! every tick for the registered publishers.

pub mod calculator;
pub mod error;
pub mod history;
pub mod options;
pub mod publisher;
pub mod snapshot;
pub mod source;
pub mod tracker;

pub use calculator::{Utilization, calculate};
pub use error::{ConfigError, PublishError, SamplingError, TrackerError};
pub use history::RingHistory;
pub use options::TrackerOptions;
pub use publisher::{ChannelPublisher, LogPublisher, UtilizationPublisher};
pub use snapshot::{Snapshot, SnapshotSource, SystemResources};
pub use source::{ResourceOverrides, SysinfoSource};
pub use tracker::{Tracker, TrackerState, TrackerStats, UtilizationReader};

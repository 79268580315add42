use std::time::Duration;

use crate::error::{ConfigError, SamplingError};

/// Cumulative counters read at one instant.
///
/// All durations count up from the same origin (process or system start), so
/// two snapshots from one source can be subtracted to get a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    elapsed_since_start: Duration,
    kernel_time_since_start: Duration,
    user_time_since_start: Duration,
    memory_used_bytes: u64,
}

impl Snapshot {
    pub const fn new(
        elapsed_since_start: Duration,
        kernel_time_since_start: Duration,
        user_time_since_start: Duration,
        memory_used_bytes: u64,
    ) -> Self {
        Self {
            elapsed_since_start,
            kernel_time_since_start,
            user_time_since_start,
            memory_used_bytes,
        }
    }

    pub fn elapsed_since_start(&self) -> Duration {
        self.elapsed_since_start
    }

    pub fn kernel_time_since_start(&self) -> Duration {
        self.kernel_time_since_start
    }

    pub fn user_time_since_start(&self) -> Duration {
        self.user_time_since_start
    }

    /// Kernel plus user time.
    pub fn cpu_time_since_start(&self) -> Duration {
        self.kernel_time_since_start
            .saturating_add(self.user_time_since_start)
    }

    pub fn memory_used_bytes(&self) -> u64 {
        self.memory_used_bytes
    }
}

/// Machine capacity the utilization percentages are relative to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemResources {
    guaranteed_cpu_units: f64,
    memory_limit_bytes: u64,
}

impl SystemResources {
    /// CPU units may be fractional (a cgroup quota of 1.5 cores, say).
    pub fn new(guaranteed_cpu_units: f64, memory_limit_bytes: u64) -> Result<Self, ConfigError> {
        if !guaranteed_cpu_units.is_finite() || guaranteed_cpu_units <= 0.0 {
            return Err(ConfigError::CpuUnits(guaranteed_cpu_units));
        }
        if memory_limit_bytes == 0 {
            return Err(ConfigError::NotPositive("memory limit"));
        }
        Ok(Self {
            guaranteed_cpu_units,
            memory_limit_bytes,
        })
    }

    pub fn guaranteed_cpu_units(&self) -> f64 {
        self.guaranteed_cpu_units
    }

    pub fn memory_limit_bytes(&self) -> u64 {
        self.memory_limit_bytes
    }
}

/// Supplies snapshots to a tracker.
///
/// `sample` is called once per tick from the tracker's background task and
/// may fail transiently; the tracker skips that tick. `resources` is read once
/// when the tracker is built.
pub trait SnapshotSource: Send + Sync {
    fn sample(&self) -> Result<Snapshot, SamplingError>;

    fn resources(&self) -> SystemResources;
}

use std::{
    sync::{Mutex, PoisonError},
    thread::available_parallelism,
    time::{Duration, Instant},
};

use log::*;
use serde::{Deserialize, Serialize};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::{
    error::{ConfigError, SamplingError},
    snapshot::{Snapshot, SnapshotSource, SystemResources},
};

/// Optional capacity figures that win over what the OS reports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceOverrides {
    pub cpu_units: Option<f64>,
    pub memory_limit_bytes: Option<u64>,
}

/// Samples one process through `sysinfo`.
///
/// `sysinfo` only reports the combined CPU time of a process, so it is
/// carried as user time and kernel time stays at zero. The calculator only
/// looks at the sum.
#[derive(Debug)]
pub struct SysinfoSource {
    pid: Pid,
    started: Instant,
    sys: Mutex<System>,
    resources: SystemResources,
}

impl SysinfoSource {
    /// Track the calling process.
    pub fn current(overrides: ResourceOverrides) -> Result<Self, ConfigError> {
        let pid = sysinfo::get_current_pid().map_err(ConfigError::CurrentProcess)?;
        Self::for_pid(pid, overrides)
    }

    pub fn for_pid(pid: Pid, overrides: ResourceOverrides) -> Result<Self, ConfigError> {
        let mut sys = System::new();
        sys.refresh_memory();
        let resources = resolve_resources(&sys, overrides)?;
        info!(
            target: "Source",
            "Tracking pid {} with {} cpu units and {} bytes of memory",
            pid,
            resources.guaranteed_cpu_units(),
            resources.memory_limit_bytes()
        );
        Ok(Self {
            pid,
            started: Instant::now(),
            sys: Mutex::new(sys),
            resources,
        })
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }
}

impl SnapshotSource for SysinfoSource {
    fn sample(&self) -> Result<Snapshot, SamplingError> {
        let mut sys = self.sys.lock().unwrap_or_else(PoisonError::into_inner);
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
        let elapsed = self.started.elapsed();
        let process = sys
            .process(self.pid)
            .ok_or_else(|| SamplingError(format!("process {} not found", self.pid)))?;
        Ok(Snapshot::new(
            elapsed,
            Duration::ZERO,
            Duration::from_millis(process.accumulated_cpu_time()),
            process.memory(),
        ))
    }

    fn resources(&self) -> SystemResources {
        self.resources
    }
}

fn resolve_resources(
    sys: &System,
    overrides: ResourceOverrides,
) -> Result<SystemResources, ConfigError> {
    let cpu_units = match overrides.cpu_units {
        Some(units) => units,
        None => available_parallelism().map(|n| n.get()).unwrap_or(1) as f64,
    };
    let memory_limit = match overrides.memory_limit_bytes {
        Some(limit) => limit,
        None => match sys.cgroup_limits() {
            Some(limits) if limits.total_memory > 0 => limits.total_memory.min(sys.total_memory()),
            _ => sys.total_memory(),
        },
    };
    SystemResources::new(cpu_units, memory_limit)
}

use crate::snapshot::{Snapshot, SystemResources};

/// Result of reducing two snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Utilization {
    cpu_used_percent: f64,
    memory_used_bytes: u64,
    resources: SystemResources,
    snapshot: Snapshot,
}

impl Utilization {
    /// Share of the guaranteed CPU capacity used over the window, 0 to 100.
    pub fn cpu_used_percent(&self) -> f64 {
        self.cpu_used_percent
    }

    pub fn memory_used_bytes(&self) -> u64 {
        self.memory_used_bytes
    }

    /// Memory in use relative to the limit, capped at 100.
    pub fn memory_used_percent(&self) -> f64 {
        let limit = self.resources.memory_limit_bytes() as f64;
        (self.memory_used_bytes as f64 / limit * 100.0).min(100.0)
    }

    pub fn resources(&self) -> SystemResources {
        self.resources
    }

    /// The later of the two snapshots this value was computed from.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }
}

/// Reduce `older` and `newer` into a utilization over the time between them.
///
/// CPU usage is the kernel plus user time spent divided by the wall time
/// times the guaranteed CPU units. The ratio is floored at zero before
/// scaling and the percentage capped at 100 after. When no wall time has
/// passed between the two snapshots (or the clock went backwards) there is no
/// capacity to divide by and the CPU usage is reported as 0%.
pub fn calculate(older: &Snapshot, newer: &Snapshot, resources: SystemResources) -> Utilization {
    let wall_ticks = ticks(newer.elapsed_since_start()) - ticks(older.elapsed_since_start());
    let capacity_ticks = wall_ticks as f64 * resources.guaranteed_cpu_units();
    let usage_ticks = ticks(newer.cpu_time_since_start()) - ticks(older.cpu_time_since_start());

    let cpu_used_percent = if capacity_ticks > 0.0 {
        let ratio = (usage_ticks as f64 / capacity_ticks).max(0.0);
        (ratio * 100.0).min(100.0)
    } else {
        0.0
    };

    Utilization {
        cpu_used_percent,
        memory_used_bytes: newer.memory_used_bytes(),
        resources,
        snapshot: *newer,
    }
}

fn ticks(d: std::time::Duration) -> i128 {
    d.as_nanos() as i128
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const EPSILON: f64 = 1e-9;

    fn snap(elapsed_ms: u64, kernel_ms: u64, user_ms: u64, memory: u64) -> Snapshot {
        Snapshot::new(
            Duration::from_millis(elapsed_ms),
            Duration::from_millis(kernel_ms),
            Duration::from_millis(user_ms),
            memory,
        )
    }

    fn resources(cpu_units: f64) -> SystemResources {
        SystemResources::new(cpu_units, 1_000).unwrap()
    }

    macro_rules! cpu_tests {
        ($($name:ident: $value:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let (older, newer, cpu_units, expected) = $value;
                    let u = calculate(&older, &newer, resources(cpu_units));
                    let delta = (u.cpu_used_percent() - expected).abs();
                    assert!(
                        delta < EPSILON,
                        "{}: expected {}, got {}",
                        stringify!($name),
                        expected,
                        u.cpu_used_percent()
                    );
                }
            )*
        }
    }

    cpu_tests! {
        forty_percent_of_one_core: (
            snap(0, 0, 0, 0),
            snap(5_000, 500, 1_500, 0),
            1.0,
            40.0,
        ),
        half_of_two_cores: (
            snap(1_000, 100, 100, 0),
            snap(3_000, 1_100, 1_100, 0),
            2.0,
            50.0,
        ),
        fractional_quota: (
            snap(0, 0, 0, 0),
            snap(1_000, 0, 250, 0),
            0.5,
            50.0,
        ),
        idle: (
            snap(0, 10, 10, 0),
            snap(1_000, 10, 10, 0),
            1.0,
            0.0,
        ),
        counter_reset_floors_at_zero: (
            snap(0, 900, 900, 0),
            snap(1_000, 0, 100, 0),
            1.0,
            0.0,
        ),
        over_commit_caps_at_hundred: (
            snap(0, 0, 0, 0),
            snap(1_000, 800, 800, 0),
            1.0,
            100.0,
        ),
        identical_snapshots_report_zero: (
            snap(2_000, 300, 300, 0),
            snap(2_000, 300, 300, 0),
            1.0,
            0.0,
        ),
        zero_wall_time_with_usage_reports_zero: (
            snap(2_000, 300, 300, 0),
            snap(2_000, 900, 900, 0),
            4.0,
            0.0,
        ),
        clock_going_backwards_reports_zero: (
            snap(5_000, 0, 0, 0),
            snap(4_000, 500, 500, 0),
            1.0,
            0.0,
        ),
    }

    #[test]
    fn percentage_is_always_in_range() {
        let steps = [0u64, 1, 7, 250, 999, 1_000, 4_000, 60_000];
        for units in [0.25, 1.0, 3.0, 64.0] {
            for &wall in &steps {
                for &kernel in &steps {
                    for &user in &steps {
                        let older = snap(1_000, 500, 500, 0);
                        let newer = snap(1_000 + wall, 500 + kernel, 500 + user, 0);
                        let cpu = calculate(&older, &newer, resources(units)).cpu_used_percent();
                        assert!(
                            cpu.is_finite() && (0.0..=100.0).contains(&cpu),
                            "wall {} kernel {} user {} units {} gave {}",
                            wall,
                            kernel,
                            user,
                            units,
                            cpu
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn memory_comes_from_newer_snapshot() {
        let older = snap(0, 0, 0, 900);
        let newer = snap(1_000, 0, 0, 250);
        let u = calculate(&older, &newer, resources(1.0));
        assert_eq!(u.memory_used_bytes(), 250);
        assert_eq!(u.snapshot(), newer);
        assert!((u.memory_used_percent() - 25.0).abs() < EPSILON);
    }

    #[test]
    fn memory_percent_is_capped() {
        let newer = snap(1_000, 0, 0, 5_000);
        let u = calculate(&snap(0, 0, 0, 0), &newer, resources(1.0));
        assert_eq!(u.memory_used_percent(), 100.0);
    }
}

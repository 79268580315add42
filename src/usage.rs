use std::time::{Duration, Instant};

use utiltrack::Utilization;

/// One published utilization as the dashboard keeps it.
#[derive(Debug, Clone, Copy)]
pub struct UsagePoint {
    pub timestamp: Instant,
    pub cpu_percent: f64,
    pub memory_mb: f64,
    pub memory_percent: f64,
}

impl UsagePoint {
    pub(crate) fn new(timestamp: Instant, utilization: &Utilization) -> Self {
        Self {
            timestamp,
            cpu_percent: utilization.cpu_used_percent(),
            memory_mb: utilization.memory_used_bytes() as f64 / 1_000_000.0,
            memory_percent: utilization.memory_used_percent(),
        }
    }
}

impl Default for UsagePoint {
    fn default() -> Self {
        Self {
            timestamp: Instant::now(),
            cpu_percent: 0.0,
            memory_mb: 0.0,
            memory_percent: 0.0,
        }
    }
}

/// Published points for the last `retention`, plus running maxima.
#[derive(Debug)]
pub struct UsageHistory {
    pub points: Vec<UsagePoint>,
    pub max: UsagePoint,
    retention: Duration,
}

impl UsageHistory {
    pub fn new(retention: Duration) -> Self {
        Self {
            points: Vec::new(),
            max: UsagePoint::default(),
            retention,
        }
    }

    pub fn set_retention(&mut self, retention: Duration) {
        self.retention = retention;
    }

    pub fn push(&mut self, point: UsagePoint) {
        self.max.cpu_percent = self.max.cpu_percent.max(point.cpu_percent);
        self.max.memory_mb = self.max.memory_mb.max(point.memory_mb);
        self.max.memory_percent = self.max.memory_percent.max(point.memory_percent);
        self.max.timestamp = point.timestamp;
        self.points.push(point);
        if let Some(cutoff) = point.timestamp.checked_sub(self.retention) {
            self.points.retain(|p| p.timestamp >= cutoff);
        }
    }

    pub fn last(&self) -> Option<&UsagePoint> {
        self.points.last()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(at: Instant, cpu: f64, memory_mb: f64) -> UsagePoint {
        UsagePoint {
            timestamp: at,
            cpu_percent: cpu,
            memory_mb,
            memory_percent: 0.0,
        }
    }

    #[test]
    fn keeps_only_retention() {
        let start = Instant::now();
        let mut history = UsageHistory::new(Duration::from_secs(10));
        for s in 0..=20 {
            history.push(point(start + Duration::from_secs(s), s as f64, 1.0));
        }
        assert_eq!(history.points.len(), 11);
        assert_eq!(history.points[0].timestamp, start + Duration::from_secs(10));
        assert_eq!(history.last().map(|p| p.cpu_percent), Some(20.0));
    }

    #[test]
    fn maxima_survive_pruning() {
        let start = Instant::now();
        let mut history = UsageHistory::new(Duration::from_secs(1));
        history.push(point(start, 90.0, 500.0));
        history.push(point(start + Duration::from_secs(5), 10.0, 20.0));
        assert_eq!(history.points.len(), 1);
        assert_eq!(history.max.cpu_percent, 90.0);
        assert_eq!(history.max.memory_mb, 500.0);
    }
}

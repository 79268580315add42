use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, history::samples_for};

/// Largest history a tracker will allocate.
pub const MAX_HISTORY_CAPACITY: usize = 1_000_000;

/// Timing settings for a [`Tracker`](crate::tracker::Tracker).
///
/// In configuration files the durations are written in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerOptions {
    /// Time between two samples.
    #[serde(rename = "sampling_interval_ms", with = "millis")]
    pub sampling_interval: Duration,
    /// Window published on every tick.
    #[serde(rename = "calculation_period_ms", with = "millis")]
    pub calculation_period: Duration,
    /// Longest window the history can answer for.
    #[serde(rename = "collection_window_ms", with = "millis")]
    pub collection_window: Duration,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            sampling_interval: Duration::from_secs(1),
            calculation_period: Duration::from_secs(5),
            collection_window: Duration::from_secs(5),
        }
    }
}

impl TrackerOptions {
    /// Check `sampling_interval <= calculation_period <= collection_window`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling_interval.is_zero() {
            return Err(ConfigError::NotPositive("sampling interval"));
        }
        if self.calculation_period.is_zero() {
            return Err(ConfigError::NotPositive("calculation period"));
        }
        if self.collection_window.is_zero() {
            return Err(ConfigError::NotPositive("collection window"));
        }
        if self.sampling_interval > self.calculation_period {
            return Err(ConfigError::SamplingExceedsCalculation {
                sampling: self.sampling_interval,
                calculation: self.calculation_period,
            });
        }
        if self.calculation_period > self.collection_window {
            return Err(ConfigError::CalculationExceedsCollection {
                calculation: self.calculation_period,
                collection: self.collection_window,
            });
        }
        let required = self.history_capacity();
        if required > MAX_HISTORY_CAPACITY {
            return Err(ConfigError::HistoryTooLarge {
                required,
                limit: MAX_HISTORY_CAPACITY,
            });
        }
        Ok(())
    }

    pub fn history_capacity(&self) -> usize {
        samples_for(self.collection_window, self.sampling_interval)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(sampling: u64, calculation: u64, collection: u64) -> TrackerOptions {
        TrackerOptions {
            sampling_interval: Duration::from_millis(sampling),
            calculation_period: Duration::from_millis(calculation),
            collection_window: Duration::from_millis(collection),
        }
    }

    #[test]
    fn defaults_are_consistent() {
        let defaults = TrackerOptions::default();
        assert_eq!(defaults.validate(), Ok(()));
        assert_eq!(defaults.history_capacity(), 6);
    }

    #[test]
    fn equal_durations_are_allowed() {
        assert_eq!(options(1_000, 1_000, 1_000).validate(), Ok(()));
    }

    #[test]
    fn zero_durations_are_rejected() {
        assert_eq!(
            options(0, 1_000, 1_000).validate(),
            Err(ConfigError::NotPositive("sampling interval"))
        );
        assert_eq!(
            options(1_000, 0, 1_000).validate(),
            Err(ConfigError::NotPositive("calculation period"))
        );
        assert_eq!(
            options(1_000, 1_000, 0).validate(),
            Err(ConfigError::NotPositive("collection window"))
        );
    }

    #[test]
    fn sampling_slower_than_calculation_is_rejected() {
        assert!(matches!(
            options(2_000, 1_000, 5_000).validate(),
            Err(ConfigError::SamplingExceedsCalculation { .. })
        ));
    }

    #[test]
    fn calculation_longer_than_collection_is_rejected() {
        assert!(matches!(
            options(1_000, 6_000, 5_000).validate(),
            Err(ConfigError::CalculationExceedsCollection { .. })
        ));
    }

    #[test]
    fn huge_history_is_rejected() {
        assert!(matches!(
            options(1, 1, 3_600_000).validate(),
            Err(ConfigError::HistoryTooLarge { .. })
        ));
    }

    #[test]
    fn reads_milliseconds_from_toml() {
        let parsed: TrackerOptions = toml::from_str(
            "sampling_interval_ms = 250\ncalculation_period_ms = 1000\n",
        )
        .unwrap();
        assert_eq!(parsed, options(250, 1_000, 5_000));
        let written = toml::to_string(&parsed).unwrap();
        assert!(written.contains("collection_window_ms = 5000"), "{}", written);
    }
}

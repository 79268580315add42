//! Sinks for the utilization values a tracker produces on every tick.
//!

use async_trait::async_trait;
use log::*;
use tokio::sync::mpsc::UnboundedSender;

use crate::{calculator::Utilization, error::PublishError};

/// Receives every utilization the tracker computes.
///
/// Publishers run one after another on the tracker's loop. A slow publisher
/// delays the next tick; a failing one is logged and skipped.
#[async_trait]
pub trait UtilizationPublisher: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(&self, utilization: &Utilization) -> Result<(), PublishError>;
}

/// Writes each utilization to the log.
#[derive(Debug, Default)]
pub struct LogPublisher;

#[async_trait]
impl UtilizationPublisher for LogPublisher {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, utilization: &Utilization) -> Result<(), PublishError> {
        info!(
            target: "Utilization",
            "cpu {:.1}% of {} units, memory {:.1}MB ({:.1}%)",
            utilization.cpu_used_percent(),
            utilization.resources().guaranteed_cpu_units(),
            utilization.memory_used_bytes() as f64 / 1_000_000.0,
            utilization.memory_used_percent()
        );
        Ok(())
    }
}

/// Forwards each utilization into an unbounded channel, wrapped by `wrap`.
pub struct ChannelPublisher<T> {
    name: String,
    sender: UnboundedSender<T>,
    wrap: fn(Utilization) -> T,
}

impl<T> ChannelPublisher<T> {
    pub fn new(
        name: impl Into<String>,
        sender: UnboundedSender<T>,
        wrap: fn(Utilization) -> T,
    ) -> Self {
        Self {
            name: name.into(),
            sender,
            wrap,
        }
    }
}

#[async_trait]
impl<T: Send + 'static> UtilizationPublisher for ChannelPublisher<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, utilization: &Utilization) -> Result<(), PublishError> {
        self.sender
            .send((self.wrap)(*utilization))
            .map_err(|_| PublishError(format!("{} receiver has gone away", self.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        calculator::calculate,
        snapshot::{Snapshot, SystemResources},
    };
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn utilization() -> Utilization {
        let older = Snapshot::new(Duration::ZERO, Duration::ZERO, Duration::ZERO, 0);
        let newer = Snapshot::new(
            Duration::from_secs(1),
            Duration::ZERO,
            Duration::from_millis(100),
            10,
        );
        calculate(&older, &newer, SystemResources::new(1.0, 100).unwrap())
    }

    #[tokio::test]
    async fn channel_publisher_forwards() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let publisher = ChannelPublisher::new("test", tx, |u| u.memory_used_bytes());
        publisher.publish(&utilization()).await.unwrap();
        assert_eq!(rx.recv().await, Some(10));
    }

    #[tokio::test]
    async fn channel_publisher_fails_when_closed() {
        let (tx, rx) = mpsc::unbounded_channel::<Utilization>();
        drop(rx);
        let publisher = ChannelPublisher::new("dashboard", tx, |u| u);
        let err = publisher.publish(&utilization()).await.unwrap_err();
        assert!(err.to_string().contains("dashboard"), "{}", err);
    }

    #[tokio::test]
    async fn log_publisher_never_fails() {
        assert!(LogPublisher.publish(&utilization()).await.is_ok());
        assert_eq!(LogPublisher.name(), "log");
    }
}

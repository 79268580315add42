//! The sampling loop and the queries it serves.
//!

use std::{
    fmt,
    panic::AssertUnwindSafe,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use futures::FutureExt;
use log::*;
use tokio::{
    select,
    sync::oneshot,
    task::JoinHandle,
    time::sleep,
};
use uuid::Uuid;

use crate::{
    calculator::{Utilization, calculate},
    error::{SamplingError, TrackerError},
    history::{RingHistory, samples_for},
    options::TrackerOptions,
    publisher::UtilizationPublisher,
    snapshot::{Snapshot, SnapshotSource, SystemResources},
};

/// Lifecycle of a [`Tracker`]. A tracker is used once: after `Stopped` it
/// cannot be started again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Created,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackerState::Created => "created",
            TrackerState::Running => "running",
            TrackerState::Stopping => "stopping",
            TrackerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Counts of what the sampling loop has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub ticks: u64,
    pub samples_appended: u64,
    pub sampling_failures: u64,
    pub publish_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    ticks: AtomicU64,
    samples_appended: AtomicU64,
    sampling_failures: AtomicU64,
    publish_failures: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn load(&self) -> TrackerStats {
        TrackerStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            samples_appended: self.samples_appended.load(Ordering::Relaxed),
            sampling_failures: self.sampling_failures.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug)]
struct Shared {
    options: TrackerOptions,
    resources: SystemResources,
    history: Mutex<RingHistory>,
    counters: Counters,
}

impl Shared {
    fn history(&self) -> MutexGuard<'_, RingHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cheap, cloneable read access to a tracker's history.
///
/// Any number of readers may query while the sampling loop writes; each query
/// holds the history lock only long enough to pick the two endpoints.
#[derive(Debug, Clone)]
pub struct UtilizationReader {
    shared: Arc<Shared>,
}

impl UtilizationReader {
    /// Average utilization over the last `window`.
    ///
    /// `window` must be positive and no longer than the collection window.
    pub fn utilization(&self, window: Duration) -> Result<Utilization, TrackerError> {
        let options = &self.shared.options;
        if window.is_zero() || window > options.collection_window {
            return Err(TrackerError::InvalidWindow {
                requested: window,
                collection: options.collection_window,
            });
        }
        let samples = samples_for(window, options.sampling_interval);
        let (older, newer) = self.shared.history().window_endpoints(samples);
        Ok(calculate(&older, &newer, self.shared.resources))
    }

    pub fn stats(&self) -> TrackerStats {
        self.shared.counters.load()
    }

    /// Snapshots currently held, the initial one included.
    pub fn history_len(&self) -> usize {
        self.shared.history().len()
    }

    pub fn options(&self) -> TrackerOptions {
        self.shared.options
    }

    pub fn resources(&self) -> SystemResources {
        self.shared.resources
    }
}

/// Source and publishers, owned by the background task once started.
struct Worker {
    id: Uuid,
    shared: Arc<Shared>,
    source: Box<dyn SnapshotSource>,
    publishers: Vec<Box<dyn UtilizationPublisher>>,
}

/// Periodically samples a [`SnapshotSource`] into a bounded history and
/// publishes the utilization over the calculation period on every tick.
pub struct Tracker {
    id: Uuid,
    state: TrackerState,
    reader: UtilizationReader,
    worker: Option<Worker>,
    closer: Option<oneshot::Receiver<()>>,
    handle: Option<JoinHandle<()>>,
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("options", &self.reader.shared.options)
            .field("resources", &self.reader.shared.resources)
            .finish()
    }
}

impl Tracker {
    /// Validate `options`, resolve the resources and take the first sample.
    ///
    /// The first sample seeds the history so queries never see it empty; if
    /// it cannot be taken the tracker is not built.
    pub fn new<S>(
        options: TrackerOptions,
        source: S,
        publishers: Vec<Box<dyn UtilizationPublisher>>,
    ) -> Result<Self, TrackerError>
    where
        S: SnapshotSource + 'static,
    {
        options.validate()?;
        let resources = source.resources();
        let seed = source.sample().map_err(TrackerError::SeedSample)?;
        let capacity = options.history_capacity();
        let id = Uuid::new_v4();
        info!(
            target: "Tracker",
            "[{}] Created: sampling every {:?}, publishing over {:?}, keeping {} samples",
            id,
            options.sampling_interval,
            options.calculation_period,
            capacity
        );
        let shared = Arc::new(Shared {
            options,
            resources,
            history: Mutex::new(RingHistory::new(capacity, seed)),
            counters: Counters::default(),
        });
        Ok(Self {
            id,
            state: TrackerState::Created,
            reader: UtilizationReader {
                shared: shared.clone(),
            },
            worker: Some(Worker {
                id,
                shared,
                source: Box::new(source),
                publishers,
            }),
            closer: None,
            handle: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn reader(&self) -> UtilizationReader {
        self.reader.clone()
    }

    pub fn utilization(&self, window: Duration) -> Result<Utilization, TrackerError> {
        self.reader.utilization(window)
    }

    pub fn stats(&self) -> TrackerStats {
        self.reader.stats()
    }

    /// Spawn the sampling loop on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// When called outside a tokio runtime.
    pub fn start(&mut self) -> Result<(), TrackerError> {
        let worker = match (self.state, self.worker.take()) {
            (TrackerState::Created, Some(worker)) => worker,
            (state, worker) => {
                self.worker = worker;
                return Err(TrackerError::InvalidState {
                    action: "start",
                    state,
                });
            }
        };
        let (closed, closer) = oneshot::channel();
        self.closer = Some(closer);
        self.handle = Some(tokio::spawn(worker.run(closed)));
        self.state = TrackerState::Running;
        info!(target: "Tracker", "[{}] Started", self.id);
        Ok(())
    }

    /// Ask the loop to stop and wait for it to exit.
    ///
    /// The loop notices at its next sleep or before its next tick, so a
    /// publish already under way finishes first.
    pub async fn stop(&mut self) -> Result<(), TrackerError> {
        if self.state != TrackerState::Running {
            return Err(TrackerError::InvalidState {
                action: "stop",
                state: self.state,
            });
        }
        self.state = TrackerState::Stopping;
        drop(self.closer.take());
        if let Some(handle) = self.handle.take()
            && let Err(err) = handle.await
        {
            error!(target: "Tracker", "[{}] Sampling loop ended abnormally: {}", self.id, err);
        }
        self.state = TrackerState::Stopped;
        info!(target: "Tracker", "[{}] Stopped", self.id);
        Ok(())
    }
}

impl Worker {
    async fn run(self, mut closed: oneshot::Sender<()>) {
        debug!(target: "Tracker", "[{}] Sampling loop running", self.id);
        let interval = self.shared.options.sampling_interval;
        loop {
            if closed.is_closed() {
                break;
            }
            select! {
                biased;
                _ = closed.closed() => break,
                _ = sleep(interval) => {}
            }
            if closed.is_closed() {
                break;
            }
            self.tick().await;
        }
        debug!(target: "Tracker", "[{}] Sampling loop exiting", self.id);
    }

    async fn tick(&self) {
        let counters = &self.shared.counters;
        Counters::bump(&counters.ticks);

        let snapshot = match self.sample() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                Counters::bump(&counters.sampling_failures);
                warn!(target: "Tracker", "[{}] Skipping tick: {}", self.id, err);
                return;
            }
        };
        self.shared.history().append(snapshot);
        Counters::bump(&counters.samples_appended);

        let reader = UtilizationReader {
            shared: self.shared.clone(),
        };
        let utilization = match reader.utilization(self.shared.options.calculation_period) {
            Ok(utilization) => utilization,
            Err(err) => {
                error!(target: "Tracker", "[{}] Cannot compute utilization: {}", self.id, err);
                return;
            }
        };

        for publisher in &self.publishers {
            let outcome = AssertUnwindSafe(publisher.publish(&utilization))
                .catch_unwind()
                .await;
            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(_) => "publisher panicked".to_string(),
            };
            Counters::bump(&counters.publish_failures);
            warn!(
                target: "Tracker",
                "[{}] Publisher {} failed: {}",
                self.id,
                publisher.name(),
                failure
            );
        }
    }

    /// A panicking source is treated like a failed read.
    fn sample(&self) -> Result<Snapshot, SamplingError> {
        std::panic::catch_unwind(AssertUnwindSafe(|| self.source.sample()))
            .unwrap_or_else(|_| Err(SamplingError("snapshot source panicked".to_string())))
    }
}

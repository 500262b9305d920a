// SPDX-License-Identifier: Apache-2.0
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use bytes::Bytes;
use parking_lot::Mutex;
use tracing::log;
use crate::broker::{Broker, MessageProducer};
use crate::config::app::WorkersConfig;
use crate::error::bridge::BridgeError;
use crate::error::error_kind::ErrorKind;
use crate::metrics;
use crate::models::modes::{DeliveryMode, WorkerKind};
use crate::models::requests::ProducerSummary;
use crate::registry::worker::WorkerState;
use crate::registry::{StartStatus, StopStatus};

/// The fixed notification each producer publishes on every iteration
const UPDATE_NOTIFICATION: &str = "An update to the database has occurred.";

/// Bound on the final flush during stop, independent of the join bound
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// In-memory, lock-protected table of the active producers. Independent from
/// the consumer registry, the two locks are never taken together.
pub struct ProducerRegistry {
    broker: Arc<dyn Broker>,
    producers: Mutex<HashMap<String, WorkerState<dyn MessageProducer>>>,

    /// Pause between two notifications
    send_interval: Duration,

    /// Bound on joining the loop task during stop. Producer loops sleep most
    /// of the time, so teardown proceeds regardless once this elapses.
    join_timeout: Duration,
}

impl ProducerRegistry {

    pub fn new(broker: Arc<dyn Broker>, workers: &WorkersConfig) -> Arc<Self> {
        Self::with_timing(broker,
                          Duration::from_secs(workers.send_interval_secs),
                          Duration::from_secs(workers.join_timeout_secs))
    }

    /// New instance with explicit timing bounds
    pub fn with_timing(broker: Arc<dyn Broker>, send_interval: Duration, join_timeout: Duration) -> Arc<Self> {
        Arc::new(ProducerRegistry {
            broker,
            producers: Mutex::new(HashMap::new()),
            send_interval,
            join_timeout,
        })
    }

    /// Start a new producer and launch its send loop
    pub fn start(&self, producer_id: &str, kafka_topic: &str, mode: DeliveryMode) -> Result<StartStatus, BridgeError> {

        let producer_id = producer_id.trim();
        if producer_id.is_empty() {
            return Err(BridgeError::new(ErrorKind::ValidationError)
                .with_error("Producer id cannot be empty."));
        }
        if kafka_topic.trim().is_empty() {
            return Err(BridgeError::new(ErrorKind::ValidationError)
                .with_error("Topic name cannot be empty."));
        }

        let mut producers = self.producers.lock();

        if let Some(existing) = producers.get(producer_id) {
            if existing.is_running() {
                return Ok(StartStatus::AlreadyRunning);
            }
            producers.remove(producer_id);
            metrics::ACTIVE_PRODUCERS.dec();
        }

        let handle = self.broker.producer()?;

        let running = Arc::new(AtomicBool::new(true));

        let task = tokio::spawn(send_loop(
            handle.clone(),
            running.clone(),
            producer_id.to_string(),
            kafka_topic.to_string(),
            mode,
            self.send_interval,
        ));

        let state = WorkerState::new(producer_id, WorkerKind::Producer, kafka_topic, handle, running, task)
            .with_mode(mode);

        producers.insert(producer_id.to_string(), state);
        metrics::ACTIVE_PRODUCERS.inc();

        Ok(StartStatus::Started)
    }

    /// Stop a producer: remove its entry under the lock, flip its flag, join
    /// within a bounded wait, then flush any buffered sends.
    ///
    /// The entry leaves the map before the join, so a concurrent start of the
    /// same id registers a fresh entry that this teardown never touches.
    pub async fn stop(&self, producer_id: &str) -> Result<StopStatus, BridgeError> {

        let state = self.producers.lock().remove(producer_id);
        let Some(mut state) = state else {
            return Ok(StopStatus::NotRunning);
        };
        metrics::ACTIVE_PRODUCERS.dec();
        state.request_stop();

        if let Some(mut task) = state.take_task() {
            match tokio::time::timeout(self.join_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    log::error!("producer '{}' task ended abnormally: {}", producer_id, e);
                }
                Err(_) => {
                    // expected whenever the loop sits in its sleep, proceed anyway
                    log::warn!("producer '{}' did not stop within {:?}, aborting its task",
                        producer_id, self.join_timeout);
                    task.abort();
                }
            }
        }

        // make sure nothing stays buffered
        if let Err(e) = state.handle.flush(FLUSH_TIMEOUT).await {
            log::error!("failed to flush producer '{}': {}", producer_id, e);
        }

        Ok(StopStatus::Stopped)
    }

    /// Summaries of all producers currently marked running
    pub fn list(&self) -> Vec<ProducerSummary> {
        let mut summaries: Vec<ProducerSummary> = self.producers.lock().values()
            .filter(|state| state.is_running())
            .map(|state| ProducerSummary {
                producer_id: state.id.clone(),
                kafka_topic: state.topic.clone(),
                sending_mode: state.mode.unwrap_or(DeliveryMode::Synchronous),
            })
            .collect();
        summaries.sort_by(|a, b| a.producer_id.cmp(&b.producer_id));
        summaries
    }

    /// Stop every producer, used during server shutdown
    pub async fn shutdown(&self) {
        let ids: Vec<String> = self.producers.lock().keys().cloned().collect();
        for id in ids {
            log::info!("shutting down producer '{}'", id);
            if let Err(e) = self.stop(&id).await {
                log::error!("failed to stop producer '{}': {}", id, e);
            }
        }
    }
}

/// One send loop per producer id: publish the update notification according
/// to the delivery mode, then sleep for the configured interval. A failed
/// publish is logged and the loop continues.
async fn send_loop(producer: Arc<dyn MessageProducer>,
                   running: Arc<AtomicBool>,
                   producer_id: String,
                   kafka_topic: String,
                   mode: DeliveryMode,
                   send_interval: Duration) {

    log::info!("producer '{}' started for topic: {} ({})", producer_id, kafka_topic, mode);

    let payload = Bytes::from_static(UPDATE_NOTIFICATION.as_bytes());

    while running.load(Ordering::SeqCst) {

        match producer.send(&kafka_topic, payload.clone(), mode).await {
            Ok(()) => {
                metrics::NOTIFICATIONS_PUBLISHED.inc();
            }
            Err(e) => {
                log::error!("producer '{}' failed to publish to {}: {}", producer_id, kafka_topic, e);
            }
        }

        tokio::time::sleep(send_interval).await;
    }

    log::info!("producer '{}' stopped", producer_id);
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::time::Duration;
    use crate::broker::memory::MemoryBroker;
    use crate::error::error_kind::ErrorKind;
    use crate::models::modes::DeliveryMode;
    use crate::registry::{StartStatus, StopStatus};
    use super::ProducerRegistry;

    fn registry(broker: &Arc<MemoryBroker>) -> Arc<ProducerRegistry> {
        ProducerRegistry::with_timing(broker.clone(),
                                      Duration::from_millis(10), Duration::from_millis(500))
    }

    async fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
        for _ in 0..200 {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        condition()
    }

    #[tokio::test]
    async fn start_list_stop_producer_test() {
        let broker = MemoryBroker::new();
        let registry = registry(&broker);

        let status = registry.start("p1", "updates", DeliveryMode::FireAndForget).expect("start failed");
        assert_eq!(StartStatus::Started, status);

        let summaries = registry.list();
        assert_eq!(1, summaries.len());
        assert_eq!("p1", summaries[0].producer_id);
        assert_eq!("updates", summaries[0].kafka_topic);
        assert_eq!(DeliveryMode::FireAndForget, summaries[0].sending_mode);

        // the loop publishes the notification on its own
        let broker_probe = broker.clone();
        assert!(wait_for(move || broker_probe.queued("updates") >= 1).await);

        let status = registry.stop("p1").await.expect("stop failed");
        assert_eq!(StopStatus::Stopped, status);
        assert!(registry.list().is_empty());
    }

    #[tokio::test]
    async fn duplicate_start_producer_test() {
        let broker = MemoryBroker::new();
        let registry = registry(&broker);

        assert_eq!(StartStatus::Started, registry.start("p1", "updates", DeliveryMode::Synchronous).unwrap());
        assert_eq!(StartStatus::AlreadyRunning, registry.start("p1", "updates", DeliveryMode::Synchronous).unwrap());
        assert_eq!(1, broker.producers_created());

        registry.stop("p1").await.unwrap();
    }

    #[tokio::test]
    async fn stop_absent_producer_test() {
        let broker = MemoryBroker::new();
        let registry = registry(&broker);

        let status = registry.stop("ghost").await.expect("stop of an absent id must not error");
        assert_eq!(StopStatus::NotRunning, status);
    }

    #[tokio::test]
    async fn producer_validation_test() {
        let broker = MemoryBroker::new();
        let registry = registry(&broker);

        let err = registry.start("", "updates", DeliveryMode::Synchronous).expect_err("empty id must fail");
        assert_eq!(ErrorKind::ValidationError, err.kind);

        let err = registry.start("p1", "   ", DeliveryMode::Synchronous).expect_err("empty topic must fail");
        assert_eq!(ErrorKind::ValidationError, err.kind);

        assert_eq!(0, broker.producers_created());
    }

    #[tokio::test]
    async fn synchronous_producer_publishes_test() {
        let broker = MemoryBroker::new();
        let registry = registry(&broker);

        registry.start("p1", "updates", DeliveryMode::Synchronous).unwrap();

        // several iterations complete, so each acknowledgment unblocked the loop
        let broker_probe = broker.clone();
        assert!(wait_for(move || broker_probe.queued("updates") >= 3).await);

        registry.stop("p1").await.unwrap();
    }

    #[tokio::test]
    async fn synchronous_send_waits_for_acknowledgment_test() {
        let broker = MemoryBroker::new();
        let registry = registry(&broker);

        // no acknowledgments until released
        broker.hold_acks(true);

        registry.start("p1", "sync-updates", DeliveryMode::Synchronous).unwrap();
        registry.start("p2", "faf-updates", DeliveryMode::FireAndForget).unwrap();

        // fire-and-forget keeps iterating without any acknowledgment
        let broker_probe = broker.clone();
        assert!(wait_for(move || broker_probe.queued("faf-updates") >= 3).await);

        // while the synchronous loop is still stuck inside its first send
        assert_eq!(1, broker.queued("sync-updates"));

        // once the acknowledgment arrives the synchronous loop moves on
        broker.hold_acks(false);
        let broker_probe = broker.clone();
        assert!(wait_for(move || broker_probe.queued("sync-updates") >= 2).await);

        registry.stop("p2").await.unwrap();
        registry.stop("p1").await.unwrap();
    }

    #[tokio::test]
    async fn restart_during_stop_join_survives_test() {
        let broker = MemoryBroker::new();
        // a long send pause keeps the old loop sleeping while stop joins it
        let registry = ProducerRegistry::with_timing(broker.clone(),
                                                     Duration::from_millis(200), Duration::from_secs(1));

        registry.start("p1", "updates", DeliveryMode::FireAndForget).unwrap();

        let stopping = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.stop("p1").await })
        };

        // restart the same id while the old task is still being joined
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(StartStatus::Started, registry.start("p1", "updates", DeliveryMode::FireAndForget).unwrap());

        assert_eq!(StopStatus::Stopped, stopping.await.unwrap().unwrap());

        // the restarted producer survived the teardown of its predecessor
        assert_eq!(1, registry.list().len());
        assert_eq!(2, broker.producers_created());

        // and it is still reachable through the registry
        assert_eq!(StopStatus::Stopped, registry.stop("p1").await.unwrap());
        assert!(registry.list().is_empty());
    }

    #[tokio::test]
    async fn independent_producers_test() {
        let broker = MemoryBroker::new();
        let registry = registry(&broker);

        registry.start("p1", "updates", DeliveryMode::FireAndForget).unwrap();
        registry.start("p2", "audit", DeliveryMode::Asynchronous).unwrap();
        assert_eq!(2, registry.list().len());

        registry.stop("p1").await.unwrap();
        let summaries = registry.list();
        assert_eq!(1, summaries.len());
        assert_eq!("p2", summaries[0].producer_id);

        registry.shutdown().await;
        assert!(registry.list().is_empty());
    }
}

// SPDX-License-Identifier: Apache-2.0
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use parking_lot::Mutex;
use tracing::log;
use crate::broker::{Broker, ConsumedMessage, MessageConsumer, PollError};
use crate::config::app::WorkersConfig;
use crate::error::bridge::BridgeError;
use crate::error::error_kind::ErrorKind;
use crate::metrics;
use crate::models::modes::{JobType, WorkerKind};
use crate::models::requests::ConsumerInfo;
use crate::registry::worker::WorkerState;
use crate::registry::{StartStatus, StopStatus};
use crate::trigger::ActionTrigger;

/// In-memory, lock-protected table of the active consumers.
///
/// The mapping is the only shared mutable state; it is mutated exclusively
/// through these methods, each of which acquires and releases the lock on
/// every exit path. All broker I/O happens outside the lock.
pub struct ConsumerRegistry {
    broker: Arc<dyn Broker>,
    trigger: Arc<dyn ActionTrigger>,
    consumers: Mutex<HashMap<String, WorkerState<dyn MessageConsumer>>>,

    /// Bound on a single poll, which is also the cancellation latency
    poll_timeout: Duration,

    /// Bound on joining the loop task during stop
    join_timeout: Duration,
}

impl ConsumerRegistry {

    pub fn new(broker: Arc<dyn Broker>, trigger: Arc<dyn ActionTrigger>, workers: &WorkersConfig) -> Arc<Self> {
        Self::with_timing(broker, trigger,
                          Duration::from_secs(workers.poll_timeout_secs),
                          Duration::from_secs(workers.join_timeout_secs))
    }

    /// New instance with explicit timing bounds
    pub fn with_timing(broker: Arc<dyn Broker>, trigger: Arc<dyn ActionTrigger>,
                       poll_timeout: Duration, join_timeout: Duration) -> Arc<Self> {
        Arc::new(ConsumerRegistry {
            broker,
            trigger,
            consumers: Mutex::new(HashMap::new()),
            poll_timeout,
            join_timeout,
        })
    }

    /// Start a new consumer for the given topic and launch its consume loop.
    /// Returns immediately, without waiting for the loop to begin.
    pub fn start(&self, consumer_id: &str, kafka_topic: &str, connection_id: &str,
                 job_type: JobType) -> Result<StartStatus, BridgeError> {

        let consumer_id = consumer_id.trim();
        if consumer_id.is_empty() {
            return Err(BridgeError::new(ErrorKind::ValidationError)
                .with_error("Consumer id cannot be empty."));
        }
        if kafka_topic.trim().is_empty() {
            return Err(BridgeError::new(ErrorKind::ValidationError)
                .with_error("Topic name cannot be empty."));
        }
        if connection_id.trim().is_empty() {
            return Err(BridgeError::new(ErrorKind::ValidationError)
                .with_error("Connection id cannot be empty."));
        }

        let mut consumers = self.consumers.lock();

        if let Some(existing) = consumers.get(consumer_id) {
            if existing.is_running() {
                return Ok(StartStatus::AlreadyRunning);
            }
            // the previous loop exited on its own, replace the dead entry
            consumers.remove(consumer_id);
            metrics::ACTIVE_CONSUMERS.dec();
        }

        // One dedicated consumer per worker, with a group derived from its id
        let group = format!("{}-group", consumer_id);
        let handle = self.broker.consumer(&group)?;

        let running = Arc::new(AtomicBool::new(true));

        let task = tokio::spawn(consume_loop(
            handle.clone(),
            running.clone(),
            self.trigger.clone(),
            consumer_id.to_string(),
            kafka_topic.to_string(),
            connection_id.to_string(),
            job_type,
            self.poll_timeout,
        ));

        let state = WorkerState::new(consumer_id, WorkerKind::Consumer, kafka_topic, handle, running, task)
            .with_group(group);

        consumers.insert(consumer_id.to_string(), state);
        metrics::ACTIVE_CONSUMERS.inc();

        Ok(StartStatus::Started)
    }

    /// Stop a consumer: remove its entry under the lock, flip its flag, then
    /// join the loop task within a bounded wait. On a join timeout the task is
    /// aborted so stop always completes in finite time.
    ///
    /// The entry leaves the map before the join, so a concurrent start of the
    /// same id registers a fresh entry that this teardown never touches.
    pub async fn stop(&self, consumer_id: &str) -> Result<StopStatus, BridgeError> {

        let state = self.consumers.lock().remove(consumer_id);
        let Some(mut state) = state else {
            return Ok(StopStatus::NotRunning);
        };
        metrics::ACTIVE_CONSUMERS.dec();
        state.request_stop();

        if let Some(mut task) = state.take_task() {
            match tokio::time::timeout(self.join_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    log::error!("consumer '{}' task ended abnormally: {}", consumer_id, e);
                }
                Err(_) => {
                    log::warn!("consumer '{}' did not stop within {:?}, aborting its task",
                        consumer_id, self.join_timeout);
                    task.abort();
                }
            }
        }

        // dropping the entry releases the last broker handle reference
        drop(state);

        Ok(StopStatus::Stopped)
    }

    /// Ids of all consumers currently marked running
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.consumers.lock().iter()
            .filter(|(_, state)| state.is_running())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Read-only introspection of one consumer, offsets included
    pub fn info(&self, consumer_id: &str) -> Result<ConsumerInfo, BridgeError> {

        let (topic, group, running, started_at, handle) = {
            let consumers = self.consumers.lock();
            let Some(state) = consumers.get(consumer_id) else {
                return Err(BridgeError::new(ErrorKind::NotFound)
                    .with_error(format!("Consumer with ID '{}' is not running.", consumer_id)));
            };
            (state.topic.clone(), state.group.clone().unwrap_or_default(),
             state.is_running(), state.started_at, state.handle.clone())
        };

        // broker I/O outside the lock
        let offsets = handle.offsets().unwrap_or_else(|e| {
            log::warn!("failed to read offsets of consumer '{}': {}", consumer_id, e);
            Vec::new()
        });

        Ok(ConsumerInfo {
            consumer_id: consumer_id.to_string(),
            kafka_topic: topic,
            group,
            running,
            started_at,
            offsets,
        })
    }

    /// Stop every consumer, used during server shutdown
    pub async fn shutdown(&self) {
        let ids: Vec<String> = self.consumers.lock().keys().cloned().collect();
        for id in ids {
            log::info!("shutting down consumer '{}'", id);
            if let Err(e) = self.stop(&id).await {
                log::error!("failed to stop consumer '{}': {}", id, e);
            }
        }
    }
}

/// One consume loop per consumer id. Nothing thrown inside the loop escapes
/// it: a bad message or a failed trigger never stops consumption.
#[allow(clippy::too_many_arguments)]
async fn consume_loop(consumer: Arc<dyn MessageConsumer>,
                      running: Arc<AtomicBool>,
                      trigger: Arc<dyn ActionTrigger>,
                      consumer_id: String,
                      kafka_topic: String,
                      connection_id: String,
                      job_type: JobType,
                      poll_timeout: Duration) {

    if let Err(e) = consumer.subscribe(&kafka_topic) {
        log::error!("consumer '{}' failed to subscribe to topic {}: {}", consumer_id, kafka_topic, e);
        // clear the flag so list() stops reporting a dead worker
        running.store(false, Ordering::SeqCst);
        return;
    }

    log::info!("consumer '{}' started for topic: {}", consumer_id, kafka_topic);

    while running.load(Ordering::SeqCst) {
        match consumer.poll(poll_timeout).await {

            // nothing arrived within the poll bound
            None => continue,

            Some(Err(PollError::PartitionEof(partition))) => {
                log::debug!("end of partition reached: {}", partition);
            }

            Some(Err(PollError::Broker(e))) => {
                log::error!("error consuming message on '{}': {}", consumer_id, e);
            }

            Some(Ok(message)) => {
                metrics::MESSAGES_CONSUMED.inc();
                process_message(&message, trigger.as_ref(), &connection_id, job_type).await;
            }
        }
    }

    log::info!("consumer '{}' stopped", consumer_id);
}

/// Decode the payload and trigger the downstream job
async fn process_message(message: &ConsumedMessage, trigger: &dyn ActionTrigger,
                         connection_id: &str, job_type: JobType) {

    // The payload is expected to be a plain string, not JSON
    let text = match std::str::from_utf8(&message.payload) {
        Ok(text) => text,
        Err(e) => {
            log::error!("error processing message at offset {}: {}", message.offset, e);
            return;
        }
    };

    log::info!("received message: {}", text);

    match trigger.trigger(connection_id, job_type).await {
        Ok(job) => {
            metrics::TRIGGERS_FIRED.inc();
            log::info!("downstream {} job triggered: {:?}", job_type, job);
        }
        Err(e) => {
            metrics::TRIGGER_FAILURES.inc();
            log::error!("failed to trigger downstream job: {}", e);
        }
    }
}

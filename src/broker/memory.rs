// SPDX-License-Identifier: Apache-2.0
//! In-memory broker doubles backing the registry and topic tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::watch;
use crate::broker::admin::{BrokerAdmin, TopicSpec};
use crate::broker::{Broker, ConsumedMessage, MessageConsumer, MessageProducer, PollError};
use crate::error::bridge::BridgeError;
use crate::error::error_kind::ErrorKind;
use crate::models::modes::DeliveryMode;
use crate::models::requests::{PartitionOffset, TopicConfigEntry};

type TopicQueues = Arc<Mutex<HashMap<String, VecDeque<Bytes>>>>;

/// Broker double keeping one message queue per topic
pub struct MemoryBroker {
    queues: TopicQueues,
    groups: Mutex<Vec<String>>,
    consumers_created: AtomicUsize,
    producers_created: AtomicUsize,

    /// Gate for delivery acknowledgments, open unless a test holds it
    acks_held: watch::Sender<bool>,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        MemoryBroker {
            queues: TopicQueues::default(),
            groups: Mutex::new(Vec::new()),
            consumers_created: AtomicUsize::new(0),
            producers_created: AtomicUsize::new(0),
            acks_held: watch::channel(false).0,
        }
    }
}

impl MemoryBroker {

    pub fn new() -> Arc<Self> {
        Arc::new(MemoryBroker::default())
    }

    /// Push a message into a topic as if an external producer published it
    pub fn publish_raw(&self, topic: &str, payload: &[u8]) {
        self.queues.lock()
            .entry(topic.to_string())
            .or_default()
            .push_back(Bytes::copy_from_slice(payload));
    }

    /// Messages currently sitting in a topic
    pub fn queued(&self, topic: &str) -> usize {
        self.queues.lock().get(topic).map(|q| q.len()).unwrap_or(0)
    }

    pub fn consumers_created(&self) -> usize {
        self.consumers_created.load(Ordering::SeqCst)
    }

    pub fn producers_created(&self) -> usize {
        self.producers_created.load(Ordering::SeqCst)
    }

    /// Consumer groups handed out so far
    pub fn groups(&self) -> Vec<String> {
        self.groups.lock().clone()
    }

    /// Hold or release the acknowledgments synchronous sends wait for
    pub fn hold_acks(&self, hold: bool) {
        self.acks_held.send_replace(hold);
    }
}

impl Broker for MemoryBroker {

    fn consumer(&self, group: &str) -> Result<Arc<dyn MessageConsumer>, BridgeError> {
        self.consumers_created.fetch_add(1, Ordering::SeqCst);
        self.groups.lock().push(group.to_string());
        Ok(Arc::new(MemoryConsumer {
            queues: self.queues.clone(),
            subscribed: Mutex::new(None),
            consumed: AtomicI64::new(0),
        }))
    }

    fn producer(&self) -> Result<Arc<dyn MessageProducer>, BridgeError> {
        self.producers_created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MemoryProducer {
            queues: self.queues.clone(),
            acks: self.acks_held.subscribe(),
        }))
    }
}

pub struct MemoryConsumer {
    queues: TopicQueues,
    subscribed: Mutex<Option<String>>,
    consumed: AtomicI64,
}

#[async_trait]
impl MessageConsumer for MemoryConsumer {

    fn subscribe(&self, topic: &str) -> Result<(), BridgeError> {
        *self.subscribed.lock() = Some(topic.to_string());
        Ok(())
    }

    async fn poll(&self, timeout: Duration) -> Option<Result<ConsumedMessage, PollError>> {

        let topic = self.subscribed.lock().clone()?;

        let message = self.queues.lock().get_mut(&topic).and_then(|queue| queue.pop_front());
        match message {
            Some(payload) => {
                let offset = self.consumed.fetch_add(1, Ordering::SeqCst);
                Some(Ok(ConsumedMessage { payload, partition: 0, offset }))
            }
            None => {
                // behave like a bounded poll that saw nothing
                tokio::time::sleep(timeout).await;
                None
            }
        }
    }

    fn offsets(&self) -> Result<Vec<PartitionOffset>, BridgeError> {
        let topic = self.subscribed.lock().clone().unwrap_or_default();
        Ok(vec![PartitionOffset {
            topic,
            partition: 0,
            offset: Some(self.consumed.load(Ordering::SeqCst)),
        }])
    }
}

pub struct MemoryProducer {
    queues: TopicQueues,
    acks: watch::Receiver<bool>,
}

#[async_trait]
impl MessageProducer for MemoryProducer {

    async fn send(&self, topic: &str, payload: Bytes, mode: DeliveryMode) -> Result<(), BridgeError> {
        self.queues.lock().entry(topic.to_string()).or_default().push_back(payload);

        // a synchronous send does not return before its acknowledgment
        if mode == DeliveryMode::Synchronous {
            let mut acks = self.acks.clone();
            while *acks.borrow_and_update() {
                if acks.changed().await.is_err() {
                    break;
                }
            }
        }

        Ok(())
    }

    async fn flush(&self, _timeout: Duration) -> Result<(), BridgeError> {
        Ok(())
    }
}

// =================================================================================================

struct StoredTopic {
    partitions: i32,
    replication: i32,
    config: Vec<(String, String)>,
}

/// Admin double keeping topics in a map
#[derive(Default)]
pub struct MemoryAdmin {
    topics: Mutex<HashMap<String, StoredTopic>>,
}

impl MemoryAdmin {

    pub fn new() -> Arc<Self> {
        Arc::new(MemoryAdmin::default())
    }

    pub fn partitions(&self, name: &str) -> Option<i32> {
        self.topics.lock().get(name).map(|t| t.partitions)
    }
}

#[async_trait]
impl BrokerAdmin for MemoryAdmin {

    async fn create_topic(&self, spec: &TopicSpec, _timeout: Duration) -> Result<(), BridgeError> {
        let mut topics = self.topics.lock();
        if topics.contains_key(&spec.name) {
            return Err(BridgeError::new(ErrorKind::BrokerError)
                .with_context(format!("failed to create topic {}", spec.name))
                .with_error("topic already exists"));
        }
        topics.insert(spec.name.clone(), StoredTopic {
            partitions: spec.partitions,
            replication: spec.replication,
            config: spec.config.clone(),
        });
        Ok(())
    }

    async fn list_topics(&self, _timeout: Duration) -> Result<Vec<String>, BridgeError> {
        Ok(self.topics.lock().keys().cloned().collect())
    }

    async fn delete_topic(&self, name: &str, _timeout: Duration) -> Result<(), BridgeError> {
        match self.topics.lock().remove(name) {
            Some(_) => Ok(()),
            None => Err(BridgeError::new(ErrorKind::NotFound)
                .with_context(format!("failed to delete topic {}", name))
                .with_error("unknown topic")),
        }
    }

    async fn alter_topic_config(&self, name: &str, config: &[(String, String)], _timeout: Duration) -> Result<(), BridgeError> {
        let mut topics = self.topics.lock();
        let topic = topics.get_mut(name)
            .ok_or_else(|| BridgeError::new(ErrorKind::NotFound)
                .with_context(format!("failed to alter config of topic {}", name))
                .with_error("unknown topic"))?;

        for (key, value) in config {
            topic.config.retain(|(existing, _)| existing != key);
            topic.config.push((key.clone(), value.clone()));
        }
        Ok(())
    }

    async fn describe_topic_config(&self, name: &str, _timeout: Duration) -> Result<Vec<TopicConfigEntry>, BridgeError> {
        let topics = self.topics.lock();
        let topic = topics.get(name)
            .ok_or_else(|| BridgeError::new(ErrorKind::NotFound)
                .with_context(format!("failed to describe config of topic {}", name))
                .with_error("unknown topic"))?;

        let mut entries: Vec<TopicConfigEntry> = topic.config.iter().map(|(key, value)| TopicConfigEntry {
            name: key.clone(),
            value: Some(value.clone()),
            source: "DynamicTopic".to_string(),
            is_default: false,
            is_read_only: false,
            is_sensitive: false,
        }).collect();

        // partition count surfaces through describe for the tests
        entries.push(TopicConfigEntry {
            name: "partitions".to_string(),
            value: Some(topic.partitions.to_string()),
            source: "DynamicTopic".to_string(),
            is_default: false,
            is_read_only: true,
            is_sensitive: false,
        });
        entries.push(TopicConfigEntry {
            name: "replication.factor".to_string(),
            value: Some(topic.replication.to_string()),
            source: "DynamicTopic".to_string(),
            is_default: false,
            is_read_only: true,
            is_sensitive: false,
        });

        Ok(entries)
    }
}

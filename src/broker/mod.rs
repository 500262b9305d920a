// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use bytes::Bytes;
use crate::error::bridge::BridgeError;
use crate::models::modes::DeliveryMode;
use crate::models::requests::PartitionOffset;

pub mod admin;
pub mod kafka;

#[cfg(test)]
pub mod memory;

/// One message pulled from the broker
#[derive(Debug, Clone)]
pub struct ConsumedMessage {
    pub payload: Bytes,
    pub partition: i32,
    pub offset: i64,
}

/// Errors a single poll can produce. End-of-partition is its own variant
/// because the consume loop treats it as benign.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PollError {
    PartitionEof(i32),
    Broker(String),
}

impl fmt::Display for PollError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PollError::PartitionEof(partition) => write!(f, "end of partition {}", partition),
            PollError::Broker(e) => write!(f, "{}", e),
        }
    }
}

/// Interface of one subscribed consumer handle.
/// The handle closes when the last reference to it is dropped.
#[async_trait]
pub trait MessageConsumer: Send + Sync {

    /// Subscribe the consumer to a topic, idempotent if already subscribed
    fn subscribe(&self, topic: &str) -> Result<(), BridgeError>;

    /// Wait at most `timeout` for one message. `None` means nothing arrived
    /// within the bound, which is not an error.
    async fn poll(&self, timeout: Duration) -> Option<Result<ConsumedMessage, PollError>>;

    /// Current offsets for all partitions assigned to this consumer
    fn offsets(&self) -> Result<Vec<PartitionOffset>, BridgeError>;
}

/// Interface of one producer handle
#[async_trait]
pub trait MessageProducer: Send + Sync {

    /// Publish a payload to a topic according to the delivery mode
    async fn send(&self, topic: &str, payload: Bytes, mode: DeliveryMode) -> Result<(), BridgeError>;

    /// Flush any buffered sends within the bound
    async fn flush(&self, timeout: Duration) -> Result<(), BridgeError>;
}

/// Factory for broker handles. Each worker owns the handle it gets here,
/// no handle is ever shared between two worker ids.
pub trait Broker: Send + Sync {

    /// Create a consumer bound to the given consumer group
    fn consumer(&self, group: &str) -> Result<Arc<dyn MessageConsumer>, BridgeError>;

    /// Create a producer
    fn producer(&self) -> Result<Arc<dyn MessageProducer>, BridgeError>;
}

// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use bytes::Bytes;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use rdkafka::Message;
use tracing::log;
use crate::broker::{Broker, ConsumedMessage, MessageConsumer, MessageProducer, PollError};
use crate::error::bridge::BridgeError;
use crate::error::error_kind::ErrorKind;
use crate::models::modes::DeliveryMode;
use crate::models::requests::PartitionOffset;

/// Bound on waiting for a synchronous delivery acknowledgment
const SEND_ACK_TIMEOUT: Duration = Duration::from_secs(30);

/// Broker factory backed by librdkafka
#[derive(Clone)]
pub struct KafkaBroker {
    servers: String,
}

impl KafkaBroker {

    pub fn new(servers: &str) -> Self {
        KafkaBroker { servers: servers.to_string() }
    }
}

impl Broker for KafkaBroker {

    fn consumer(&self, group: &str) -> Result<Arc<dyn MessageConsumer>, BridgeError> {

        // One dedicated consumer per worker, in its own group
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.servers)
            .set("group.id", group)
            .set("auto.offset.reset", "earliest")
            .set("enable.partition.eof", "true")
            .create()
            .map_err(|e| BridgeError::new(ErrorKind::BrokerError)
                .with_context("failed to create broker consumer")
                .with_error(e.to_string()))?;

        Ok(Arc::new(KafkaMessageConsumer { inner: consumer }))
    }

    fn producer(&self) -> Result<Arc<dyn MessageProducer>, BridgeError> {

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &self.servers)
            .create()
            .map_err(|e| BridgeError::new(ErrorKind::BrokerError)
                .with_context("failed to create broker producer")
                .with_error(e.to_string()))?;

        Ok(Arc::new(KafkaMessageProducer { inner: producer }))
    }
}

// =================================================================================================

struct KafkaMessageConsumer {
    inner: StreamConsumer,
}

#[async_trait]
impl MessageConsumer for KafkaMessageConsumer {

    fn subscribe(&self, topic: &str) -> Result<(), BridgeError> {
        self.inner.subscribe(&[topic])
            .map_err(|e| BridgeError::new(ErrorKind::BrokerError)
                .with_context(format!("failed to subscribe to topic {}", topic))
                .with_error(e.to_string()))
    }

    async fn poll(&self, timeout: Duration) -> Option<Result<ConsumedMessage, PollError>> {
        match tokio::time::timeout(timeout, self.inner.recv()).await {

            // No message arrived within the bound
            Err(_) => None,

            Ok(Ok(message)) => Some(Ok(ConsumedMessage {
                payload: Bytes::copy_from_slice(message.payload().unwrap_or_default()),
                partition: message.partition(),
                offset: message.offset(),
            })),

            Ok(Err(KafkaError::PartitionEOF(partition))) => Some(Err(PollError::PartitionEof(partition))),

            Ok(Err(e)) => Some(Err(PollError::Broker(e.to_string()))),
        }
    }

    fn offsets(&self) -> Result<Vec<PartitionOffset>, BridgeError> {

        let position = self.inner.position()
            .map_err(|e| BridgeError::new(ErrorKind::BrokerError)
                .with_context("failed to read consumer offsets")
                .with_error(e.to_string()))?;

        Ok(position.elements().iter().map(|elem| PartitionOffset {
            topic: elem.topic().to_string(),
            partition: elem.partition(),
            offset: elem.offset().to_raw(),
        }).collect())
    }
}

// =================================================================================================

struct KafkaMessageProducer {
    inner: FutureProducer,
}

#[async_trait]
impl MessageProducer for KafkaMessageProducer {

    async fn send(&self, topic: &str, payload: Bytes, mode: DeliveryMode) -> Result<(), BridgeError> {

        match mode {

            // Enqueue the record and move on without waiting for the acknowledgment
            DeliveryMode::FireAndForget => {
                self.inner.send_result(FutureRecord::<(), [u8]>::to(topic).payload(payload.as_ref()))
                    .map_err(|(e, _)| publish_error(topic, e))?;
                Ok(())
            }

            // Block until the broker confirms delivery
            DeliveryMode::Synchronous => {
                self.inner.send(FutureRecord::<(), [u8]>::to(topic).payload(payload.as_ref()), Timeout::After(SEND_ACK_TIMEOUT))
                    .await
                    .map_err(|(e, _)| publish_error(topic, e))?;
                Ok(())
            }

            // Log the delivery report from a separate task without blocking the caller
            DeliveryMode::Asynchronous => {
                let delivery = self.inner.send_result(FutureRecord::<(), [u8]>::to(topic).payload(payload.as_ref()))
                    .map_err(|(e, _)| publish_error(topic, e))?;

                let topic = topic.to_string();
                tokio::spawn(async move {
                    match delivery.await {
                        Ok(Ok((partition, offset))) => {
                            log::debug!("message delivered to {} [{}] at offset {}", topic, partition, offset);
                        }
                        Ok(Err((e, _))) => {
                            log::error!("delivery failed for message on {}: {}", topic, e);
                        }
                        Err(_) => {
                            log::error!("delivery report for {} was canceled", topic);
                        }
                    }
                });
                Ok(())
            }
        }
    }

    async fn flush(&self, timeout: Duration) -> Result<(), BridgeError> {

        // librdkafka flush blocks the calling thread, so push it off the runtime
        let producer = self.inner.clone();
        let flushed = tokio::task::spawn_blocking(move || producer.flush(Timeout::After(timeout))).await;

        match flushed {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(BridgeError::new(ErrorKind::BrokerError)
                .with_context("failed to flush producer")
                .with_error(e.to_string())),
            Err(e) => Err(BridgeError::new(ErrorKind::InternalError)
                .with_context("flush task failed")
                .with_error(e.to_string())),
        }
    }
}

fn publish_error(topic: &str, e: KafkaError) -> BridgeError {
    BridgeError::new(ErrorKind::BrokerError)
        .with_context(format!("failed to publish to topic {}", topic))
        .with_error(e.to_string())
}

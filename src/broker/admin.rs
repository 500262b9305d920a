// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, AlterConfig, NewTopic, ResourceSpecifier, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::types::RDKafkaErrorCode;
use crate::error::bridge::BridgeError;
use crate::error::error_kind::ErrorKind;
use crate::models::requests::TopicConfigEntry;

/// Everything needed to create one topic
#[derive(Debug, Clone)]
pub struct TopicSpec {
    pub name: String,
    pub partitions: i32,
    pub replication: i32,

    /// Topic-level config overrides, e.g. retention.ms / retention.bytes
    pub config: Vec<(String, String)>,
}

/// The broker's administrative interface. Every operation is synchronous
/// request/response, bounded by a timeout, and raises a categorized error
/// instead of failing silently.
#[async_trait]
pub trait BrokerAdmin: Send + Sync {

    async fn create_topic(&self, spec: &TopicSpec, timeout: Duration) -> Result<(), BridgeError>;

    async fn list_topics(&self, timeout: Duration) -> Result<Vec<String>, BridgeError>;

    async fn delete_topic(&self, name: &str, timeout: Duration) -> Result<(), BridgeError>;

    async fn alter_topic_config(&self, name: &str, config: &[(String, String)], timeout: Duration) -> Result<(), BridgeError>;

    /// Describe the topic config, default-valued entries filtered out
    async fn describe_topic_config(&self, name: &str, timeout: Duration) -> Result<Vec<TopicConfigEntry>, BridgeError>;
}

// =================================================================================================

/// BrokerAdmin backed by the librdkafka admin client
pub struct KafkaAdmin {
    inner: Arc<AdminClient<DefaultClientContext>>,
}

impl KafkaAdmin {

    pub fn new(servers: &str) -> Result<Self, BridgeError> {
        let client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", servers)
            .create()
            .map_err(|e| BridgeError::new(ErrorKind::BrokerError)
                .with_context("failed to create broker admin client")
                .with_error(e.to_string()))?;

        Ok(KafkaAdmin { inner: Arc::new(client) })
    }

    fn options(timeout: Duration) -> AdminOptions {
        AdminOptions::new()
            .operation_timeout(Some(timeout))
            .request_timeout(Some(timeout))
    }
}

#[async_trait]
impl BrokerAdmin for KafkaAdmin {

    async fn create_topic(&self, spec: &TopicSpec, timeout: Duration) -> Result<(), BridgeError> {

        let mut topic = NewTopic::new(&spec.name, spec.partitions, TopicReplication::Fixed(spec.replication));
        for (key, value) in &spec.config {
            topic = topic.set(key, value);
        }

        let results = self.inner.create_topics(&[topic], &Self::options(timeout)).await
            .map_err(|e| broker_error("failed to create topic", e.to_string()))?;

        for result in results {
            result.map_err(|(name, code)| categorize(code,
                format!("failed to create topic {}", name)))?;
        }

        Ok(())
    }

    async fn list_topics(&self, timeout: Duration) -> Result<Vec<String>, BridgeError> {

        // fetch_metadata blocks, keep it off the async runtime
        let client = self.inner.clone();
        let metadata = tokio::task::spawn_blocking(move || client.inner().fetch_metadata(None, timeout)).await
            .map_err(|e| BridgeError::new(ErrorKind::InternalError)
                .with_context("metadata task failed")
                .with_error(e.to_string()))?
            .map_err(|e| broker_error("failed to fetch topics", e.to_string()))?;

        Ok(metadata.topics().iter().map(|topic| topic.name().to_string()).collect())
    }

    async fn delete_topic(&self, name: &str, timeout: Duration) -> Result<(), BridgeError> {

        let results = self.inner.delete_topics(&[name], &Self::options(timeout)).await
            .map_err(|e| broker_error("failed to delete topic", e.to_string()))?;

        for result in results {
            result.map_err(|(name, code)| categorize(code,
                format!("failed to delete topic {}", name)))?;
        }

        Ok(())
    }

    async fn alter_topic_config(&self, name: &str, config: &[(String, String)], timeout: Duration) -> Result<(), BridgeError> {

        let mut alter = AlterConfig::new(ResourceSpecifier::Topic(name));
        for (key, value) in config {
            alter = alter.set(key, value);
        }

        let results = self.inner.alter_configs(&[alter], &Self::options(timeout)).await
            .map_err(|e| broker_error("failed to alter topic config", e.to_string()))?;

        for result in results {
            result.map_err(|(_, code)| categorize(code,
                format!("failed to alter config of topic {}", name)))?;
        }

        Ok(())
    }

    async fn describe_topic_config(&self, name: &str, timeout: Duration) -> Result<Vec<TopicConfigEntry>, BridgeError> {

        let results = self.inner.describe_configs(&[ResourceSpecifier::Topic(name)], &Self::options(timeout)).await
            .map_err(|e| broker_error("failed to describe topic config", e.to_string()))?;

        let resource = results.into_iter().next()
            .ok_or_else(|| broker_error("failed to describe topic config",
                format!("no config resource returned for topic {}", name)))?
            .map_err(|code| categorize(code, format!("failed to describe config of topic {}", name)))?;

        // Only keep the entries that differ from the broker defaults
        Ok(resource.entries.into_iter()
            .filter(|entry| !entry.is_default)
            .map(|entry| TopicConfigEntry {
                name: entry.name,
                value: entry.value,
                source: format!("{:?}", entry.source),
                is_default: entry.is_default,
                is_read_only: entry.is_read_only,
                is_sensitive: entry.is_sensitive,
            })
            .collect())
    }
}

fn broker_error(context: &str, error: String) -> BridgeError {
    BridgeError::new(ErrorKind::BrokerError)
        .with_context(context)
        .with_error(error)
}

/// Map a broker result code to the error taxonomy
fn categorize(code: RDKafkaErrorCode, context: String) -> BridgeError {
    let kind = match code {
        RDKafkaErrorCode::UnknownTopic
        | RDKafkaErrorCode::UnknownTopicOrPartition => ErrorKind::NotFound,
        RDKafkaErrorCode::RequestTimedOut
        | RDKafkaErrorCode::OperationTimedOut => ErrorKind::BrokerTimeout,
        _ => ErrorKind::BrokerError,
    };

    BridgeError::new(kind)
        .with_context(context)
        .with_error(code.to_string())
}

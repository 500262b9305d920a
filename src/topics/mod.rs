// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use std::time::Duration;
use crate::broker::admin::{BrokerAdmin, TopicSpec};
use crate::error::bridge::BridgeError;
use crate::error::error_kind::ErrorKind;
use crate::models::requests::{CreateTopicRequest, CreateTopicResponse, StatusResponse, TopicConfigResponse, TopicListResponse, UpdateTopicRequest};

/// Bound on create/delete/alter operations
const ADMIN_OP_TIMEOUT: Duration = Duration::from_secs(30);

/// Bound on metadata and config reads
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Stateless topic administration. Validation happens before any broker
/// call; broker failures surface as categorized errors to the caller.
pub struct TopicService {
    admin: Arc<dyn BrokerAdmin>,
}

impl TopicService {

    pub fn new(admin: Arc<dyn BrokerAdmin>) -> Arc<Self> {
        Arc::new(TopicService { admin })
    }

    /// Create a topic with user-defined partitions, replication factor and
    /// retention policies
    pub async fn create(&self, request: &CreateTopicRequest) -> Result<CreateTopicResponse, BridgeError> {

        let name = validated_name(&request.topic_name)?;
        if request.num_partitions < 1 {
            return Err(BridgeError::new(ErrorKind::ValidationError)
                .with_error("Number of partitions must be at least 1."));
        }
        if request.replication_factor < 1 {
            return Err(BridgeError::new(ErrorKind::ValidationError)
                .with_error("Replication factor must be at least 1."));
        }

        let config = retention_config(request.retention_ms, request.retention_bytes);

        let spec = TopicSpec {
            name: name.to_string(),
            partitions: request.num_partitions,
            replication: request.replication_factor,
            config: config.clone(),
        };

        self.admin.create_topic(&spec, ADMIN_OP_TIMEOUT).await?;

        Ok(CreateTopicResponse {
            message: format!("Topic '{}' created successfully", name),
            partitions: request.num_partitions,
            replication_factor: request.replication_factor,
            retention_policy: config,
        })
    }

    /// All topics available in the broker
    pub async fn list(&self) -> Result<TopicListResponse, BridgeError> {
        let mut topics = self.admin.list_topics(METADATA_TIMEOUT).await?;
        topics.sort();
        Ok(TopicListResponse { topics })
    }

    pub async fn delete(&self, topic_name: &str) -> Result<StatusResponse, BridgeError> {
        let name = validated_name(topic_name)?;
        self.admin.delete_topic(name, ADMIN_OP_TIMEOUT).await?;
        Ok(StatusResponse::new(format!("Topic '{}' deleted successfully", name)))
    }

    /// Update the retention policies of an existing topic
    pub async fn update(&self, request: &UpdateTopicRequest) -> Result<StatusResponse, BridgeError> {

        let name = validated_name(&request.topic_name)?;

        let config = retention_config(request.retention_ms, request.retention_bytes);
        if config.is_empty() {
            return Err(BridgeError::new(ErrorKind::ValidationError)
                .with_error("At least one retention policy must be specified."));
        }

        self.admin.alter_topic_config(name, &config, ADMIN_OP_TIMEOUT).await?;

        Ok(StatusResponse::new(format!("Topic '{}' updated successfully with new retention policies", name)))
    }

    /// The non-default config entries of a topic
    pub async fn describe(&self, topic_name: &str) -> Result<TopicConfigResponse, BridgeError> {
        let name = validated_name(topic_name)?;
        let config = self.admin.describe_topic_config(name, METADATA_TIMEOUT).await?;
        Ok(TopicConfigResponse {
            topic_name: name.to_string(),
            config,
        })
    }
}

fn validated_name(topic_name: &str) -> Result<&str, BridgeError> {
    let name = topic_name.trim();
    if name.is_empty() {
        return Err(BridgeError::new(ErrorKind::ValidationError)
            .with_error("Topic name cannot be empty."));
    }
    Ok(name)
}

/// Topic-level config overrides for the retention settings
fn retention_config(retention_ms: Option<i64>, retention_bytes: Option<i64>) -> Vec<(String, String)> {
    let mut config = Vec::new();
    if let Some(retention_ms) = retention_ms {
        config.push(("retention.ms".to_string(), retention_ms.to_string()));
    }
    if let Some(retention_bytes) = retention_bytes {
        config.push(("retention.bytes".to_string(), retention_bytes.to_string()));
    }
    config
}

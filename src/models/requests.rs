// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};
use crate::models::modes::{DeliveryMode, JobType};

// =================================================================================================
// Worker requests

/// Start a consumer bound to a topic and a downstream connection
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StartConsumerRequest {
    pub consumer_id: String,
    pub kafka_topic: String,
    pub connection_id: String,

    /// Defaults to a plain sync job like the downstream API does
    #[serde(default = "default_job_type")]
    pub job_type: JobType,
}

fn default_job_type() -> JobType { JobType::Sync }

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StopConsumerRequest {
    pub consumer_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StartProducerRequest {
    pub producer_id: String,
    pub kafka_topic: String,

    #[serde(default = "default_mode")]
    pub sending_mode: DeliveryMode,
}

fn default_mode() -> DeliveryMode { DeliveryMode::Synchronous }

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StopProducerRequest {
    pub producer_id: String,
}

// =================================================================================================
// Worker responses

/// Informational status payload for start/stop commands
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StatusResponse {
    pub message: String,
}

impl StatusResponse {
    pub fn new<S: Into<String>>(message: S) -> Self {
        StatusResponse { message: message.into() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ActiveConsumersResponse {
    pub active_consumers: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProducerSummary {
    pub producer_id: String,
    pub kafka_topic: String,
    pub sending_mode: DeliveryMode,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ActiveProducersResponse {
    pub active_producers: Vec<ProducerSummary>,
}

/// Read-only introspection of one consumer
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConsumerInfo {
    pub consumer_id: String,
    pub kafka_topic: String,
    pub group: String,
    pub running: bool,
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// Current offsets for all partitions assigned to this consumer
    pub offsets: Vec<PartitionOffset>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct PartitionOffset {
    pub topic: String,
    pub partition: i32,
    pub offset: Option<i64>,
}

// =================================================================================================
// Topic administration

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateTopicRequest {
    pub topic_name: String,

    #[serde(default = "default_partitions")]
    pub num_partitions: i32,

    #[serde(default = "default_replication")]
    pub replication_factor: i32,

    pub retention_ms: Option<i64>,
    pub retention_bytes: Option<i64>,
}

fn default_partitions() -> i32 { 1 }
fn default_replication() -> i32 { 1 }

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateTopicRequest {
    pub topic_name: String,
    pub retention_ms: Option<i64>,
    pub retention_bytes: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TopicQuery {
    pub topic_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TopicListResponse {
    pub topics: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateTopicResponse {
    pub message: String,
    pub partitions: i32,
    pub replication_factor: i32,
    pub retention_policy: Vec<(String, String)>,
}

/// One non-default config entry of a topic
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TopicConfigEntry {
    pub name: String,
    pub value: Option<String>,
    pub source: String,
    pub is_default: bool,
    pub is_read_only: bool,
    pub is_sensitive: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TopicConfigResponse {
    pub topic_name: String,
    pub config: Vec<TopicConfigEntry>,
}

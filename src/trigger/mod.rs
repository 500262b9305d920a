// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use async_trait::async_trait;
use reqwest::ClientBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use crate::config::app::DownstreamConfig;
use crate::error::bridge::BridgeError;
use crate::error::error_kind::ErrorKind;
use crate::models::modes::JobType;

/// The downstream action invoked when a consumer receives a message.
/// Failures never stop the consume loop, they are logged and swallowed there.
#[async_trait]
pub trait ActionTrigger: Send + Sync {
    async fn trigger(&self, connection_id: &str, job_type: JobType) -> Result<TriggeredJob, BridgeError>;
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JobCreateRequest {
    connection_id: String,
    job_type: JobType,
}

/// What the downstream API reports back for a started job
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredJob {
    #[serde(default)]
    pub job_id: Option<u64>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub job_type: Option<String>,

    #[serde(default)]
    pub connection_id: Option<String>,
}

// =================================================================================================

/// Triggers sync jobs over the downstream HTTP API with basic auth
pub struct HttpJobTrigger {
    client: reqwest::Client,
    url: String,
    username: String,
    password: SecretString,
}

impl HttpJobTrigger {

    pub fn new(config: &DownstreamConfig) -> Result<Self, BridgeError> {

        // One client for all trigger calls, with bounded timeouts
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| BridgeError::new(ErrorKind::ConfigError)
                .with_context("failed to create downstream http client")
                .with_error(e.to_string()))?;

        Ok(HttpJobTrigger {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl ActionTrigger for HttpJobTrigger {

    async fn trigger(&self, connection_id: &str, job_type: JobType) -> Result<TriggeredJob, BridgeError> {

        let endpoint = format!("{}/jobs", self.url);

        let response = self.client.post(&endpoint)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .json(&JobCreateRequest {
                connection_id: connection_id.to_string(),
                job_type,
            })
            .send().await
            .map_err(|e| BridgeError::new(ErrorKind::DownstreamError)
                .with_context(format!("failed to reach downstream job API for connection {}", connection_id))
                .with_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::new(ErrorKind::DownstreamError)
                .with_context(format!("downstream job API rejected the {} job for connection {}", job_type, connection_id))
                .with_error(format!("{}: {}", status, body)));
        }

        response.json::<TriggeredJob>().await
            .map_err(|e| BridgeError::new(ErrorKind::DownstreamError)
                .with_context("failed to parse downstream job response")
                .with_error(e.to_string()))
    }
}

// =================================================================================================

#[cfg(test)]
pub mod recording {
    use std::sync::Arc;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use crate::error::bridge::BridgeError;
    use crate::error::error_kind::ErrorKind;
    use crate::models::modes::JobType;
    use super::{ActionTrigger, TriggeredJob};

    /// Trigger double that records every invocation
    #[derive(Default)]
    pub struct RecordingTrigger {
        calls: Mutex<Vec<(String, JobType)>>,
        fail: Mutex<bool>,
    }

    impl RecordingTrigger {

        pub fn new() -> Arc<Self> {
            Arc::new(RecordingTrigger::default())
        }

        pub fn calls(&self) -> Vec<(String, JobType)> {
            self.calls.lock().clone()
        }

        /// Make every subsequent trigger call fail
        pub fn fail_next_calls(&self, fail: bool) {
            *self.fail.lock() = fail;
        }
    }

    #[async_trait]
    impl ActionTrigger for RecordingTrigger {
        async fn trigger(&self, connection_id: &str, job_type: JobType) -> Result<TriggeredJob, BridgeError> {
            self.calls.lock().push((connection_id.to_string(), job_type));
            if *self.fail.lock() {
                return Err(BridgeError::new(ErrorKind::DownstreamError)
                    .with_error("downstream unavailable"));
            }
            Ok(TriggeredJob {
                job_id: Some(1),
                status: Some("running".to_string()),
                job_type: Some(job_type.to_string()),
                connection_id: Some(connection_id.to_string()),
            })
        }
    }
}

// SPDX-License-Identifier: Apache-2.0
use config::{Config, File};
use secrecy::SecretString;
use serde::Deserialize;
use crate::error::error_kind::ErrorKind;
use crate::error::bridge::BridgeError;

const CONFIG_FILE_NAME:&str = "config.yaml";

/// Configuration for the bridge itself
#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub broker: BrokerConfig,
    pub downstream: DownstreamConfig,

    /// Worker loop timing, defaulted when the section is absent
    #[serde(default)]
    pub workers: WorkersConfig,
}

impl AppConfig {

    /// Load a specific Application Config
    pub fn load_file(source: &str) -> Result<AppConfig, BridgeError> {
        let config = Config::builder()
            .add_source(File::with_name(source))
            .build()
            .map_err(|e| BridgeError::new(ErrorKind::ConfigError)
                .with_error(format!("Failed to read config file {}: {}", source, e)))?;
        config.try_deserialize().map_err(|e| BridgeError::new(ErrorKind::ConfigError)
            .with_error(format!("Failed to parse config file {}: {}", source, e)))
    }

    /// Load the default config file: config.yaml
    pub fn load() -> Result<AppConfig, BridgeError> {
        AppConfig::load_file(CONFIG_FILE_NAME)
    }

    /// Whether the AppConfig is valid
    pub fn is_valid(&self) -> bool {

        if self.api.hostname.is_empty() {
            tracing::error!("config.yaml has an empty api->hostname");
            return false;
        }

        // Without a bootstrap server nothing in this service can work
        if self.broker.servers.is_empty() {
            tracing::error!("config.yaml has an empty broker->servers");
            return false;
        }

        true
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiConfig {

    /// Hostname this is the exposed hostname of the bridge
    pub hostname: String,

    /// The port to listen to
    pub port: Option<String>,
}

/// The Kafka bootstrap configuration
#[derive(Deserialize, Debug, Clone)]
pub struct BrokerConfig {

    /// Comma separated bootstrap.servers list
    pub servers: String,
}

/// Credentials and endpoint for the downstream job API
#[derive(Deserialize, Debug, Clone)]
pub struct DownstreamConfig {
    pub url: String,
    pub username: String,

    /// Kept behind secrecy so it never ends up in a debug log
    pub password: SecretString,
}

/// Worker loop timing knobs
#[derive(Deserialize, Debug, Clone)]
pub struct WorkersConfig {

    /// Bound on a single consumer poll
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// Pause between two producer notifications
    #[serde(default = "default_send_interval")]
    pub send_interval_secs: u64,

    /// Bound on joining a worker task during stop
    #[serde(default = "default_join_timeout")]
    pub join_timeout_secs: u64,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        WorkersConfig {
            poll_timeout_secs: default_poll_timeout(),
            send_interval_secs: default_send_interval(),
            join_timeout_secs: default_join_timeout(),
        }
    }
}

fn default_poll_timeout() -> u64 { 1 }
fn default_send_interval() -> u64 { 10 }
fn default_join_timeout() -> u64 { 5 }

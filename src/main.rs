// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::broker::admin::KafkaAdmin;
use crate::broker::kafka::KafkaBroker;
use crate::config::app::AppConfig;
use crate::registry::consumer::ConsumerRegistry;
use crate::registry::producer::ProducerRegistry;
use crate::topics::TopicService;
use crate::trigger::HttpJobTrigger;

mod api;
mod broker;
mod config;
mod error;
mod metrics;
mod models;
mod registry;
mod topics;
mod trigger;

#[tokio::main]
async fn main() -> std::io::Result<()> {

    // Logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "kafka_bridge=info,actix_web=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get access to the config
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Application Config error: {}", e);
            return Ok(());
        }
    };
    if !config.is_valid() {
        return Ok(tracing::error!("invalid config.yaml"));
    }

    // Broker factory and admin client
    let broker = Arc::new(KafkaBroker::new(&config.broker.servers));
    let admin = match KafkaAdmin::new(&config.broker.servers) {
        Ok(admin) => Arc::new(admin),
        Err(e) => {
            tracing::error!("failed to create broker admin client: {}", e);
            return Ok(());
        }
    };

    // Downstream job trigger
    let trigger = match HttpJobTrigger::new(&config.downstream) {
        Ok(trigger) => Arc::new(trigger),
        Err(e) => {
            tracing::error!("failed to create downstream trigger: {}", e);
            return Ok(());
        }
    };

    // Worker registries and topic administration
    let consumers = ConsumerRegistry::new(broker.clone(), trigger, &config.workers);
    let producers = ProducerRegistry::new(broker, &config.workers);
    let topics = TopicService::new(admin);

    // Start the API server
    if let Err(e) = api::server::start(config, consumers, producers, topics).await {
        tracing::info!("Error shutting down kafka bridge {}", e);
    }

    tracing::info!("Shutdown completed");

    Ok(())
}

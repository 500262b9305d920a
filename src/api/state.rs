// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use crate::config::app::AppConfig;
use crate::registry::consumer::ConsumerRegistry;
use crate::registry::producer::ProducerRegistry;
use crate::topics::TopicService;

#[derive(Clone)]
pub struct AppState {
    pub consumers: Arc<ConsumerRegistry>,
    pub producers: Arc<ProducerRegistry>,
    pub topics: Arc<TopicService>,
    pub app_config: AppConfig,
}

impl AppState {
    pub fn new(consumers: Arc<ConsumerRegistry>, producers: Arc<ProducerRegistry>,
               topics: Arc<TopicService>, app_config: AppConfig) -> Self {
        AppState {
            consumers,
            producers,
            topics,
            app_config,
        }
    }
}

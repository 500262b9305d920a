// SPDX-License-Identifier: Apache-2.0
use actix_web::web;
use crate::api::consumers::{consumer_info, list_consumers, start_consumer, stop_consumer};
use crate::api::producers::{list_producers, start_producer, stop_producer};
use crate::api::topics::{create_topic, delete_topic, list_topics, topic_config, update_topic};

pub fn consumer_api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(start_consumer)
        .service(stop_consumer)
        .service(list_consumers)
        .service(consumer_info);
}

pub fn producer_api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(start_producer)
        .service(stop_producer)
        .service(list_producers);
}

pub fn topic_api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(create_topic)
        .service(list_topics)
        .service(delete_topic)
        .service(update_topic)
        .service(topic_config);
}

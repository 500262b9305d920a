// SPDX-License-Identifier: Apache-2.0
use lazy_static::lazy_static;
use prometheus::{IntCounter, IntGauge};

lazy_static! {

    pub static ref MESSAGES_CONSUMED: IntCounter =
        IntCounter::new("messages_consumed", "Messages Consumed").expect("messages_consumed metric cannot be created");

    pub static ref TRIGGERS_FIRED: IntCounter =
        IntCounter::new("triggers_fired", "Downstream Jobs Triggered").expect("triggers_fired metric cannot be created");

    pub static ref TRIGGER_FAILURES: IntCounter =
        IntCounter::new("trigger_failures", "Downstream Trigger Failures").expect("trigger_failures metric cannot be created");

    pub static ref NOTIFICATIONS_PUBLISHED: IntCounter =
        IntCounter::new("notifications_published", "Notifications Published").expect("notifications_published metric cannot be created");

    pub static ref ACTIVE_CONSUMERS: IntGauge =
        IntGauge::new("active_consumers", "Active Consumers").expect("active_consumers metric cannot be created");

    pub static ref ACTIVE_PRODUCERS: IntGauge =
        IntGauge::new("active_producers", "Active Producers").expect("active_producers metric cannot be created");
}

pub fn register_metrics() {

    let registry = prometheus::default_registry();

    registry
        .register(Box::new(MESSAGES_CONSUMED.clone()))
        .expect("messages_consumed collector can cannot registered");

    registry
        .register(Box::new(TRIGGERS_FIRED.clone()))
        .expect("triggers_fired collector can cannot registered");

    registry
        .register(Box::new(TRIGGER_FAILURES.clone()))
        .expect("trigger_failures collector can cannot registered");

    registry
        .register(Box::new(NOTIFICATIONS_PUBLISHED.clone()))
        .expect("notifications_published collector can cannot registered");

    registry
        .register(Box::new(ACTIVE_CONSUMERS.clone()))
        .expect("active_consumers collector can cannot registered");

    registry
        .register(Box::new(ACTIVE_PRODUCERS.clone()))
        .expect("active_producers collector can cannot registered");
}

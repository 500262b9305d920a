// SPDX-License-Identifier: Apache-2.0
use actix_web::{get, post, web, HttpResponse};
use crate::api::state::AppState;
use crate::error::bridge::BridgeError;
use crate::models::requests::{ActiveConsumersResponse, StartConsumerRequest, StatusResponse, StopConsumerRequest};
use crate::registry::{StartStatus, StopStatus};

/// Start a Kafka consumer that bridges messages to the downstream job API
#[post("/start")]
pub async fn start_consumer(request: web::Json<StartConsumerRequest>,
                            state: web::Data<AppState>) -> Result<HttpResponse, BridgeError> {

    let status = state.consumers.start(&request.consumer_id, &request.kafka_topic,
                                       &request.connection_id, request.job_type)?;

    let message = match status {
        StartStatus::Started => format!("Started consumer with ID '{}' for Kafka topic '{}'.",
                                        request.consumer_id, request.kafka_topic),
        StartStatus::AlreadyRunning => format!("Consumer with ID '{}' is already running.",
                                               request.consumer_id),
    };

    Ok(HttpResponse::Ok().json(StatusResponse::new(message)))
}

/// Stop the consumer for a specific id
#[post("/stop")]
pub async fn stop_consumer(request: web::Json<StopConsumerRequest>,
                           state: web::Data<AppState>) -> Result<HttpResponse, BridgeError> {

    let status = state.consumers.stop(&request.consumer_id).await?;

    let message = match status {
        StopStatus::Stopped => format!("Consumer with ID '{}' stopped successfully.", request.consumer_id),
        StopStatus::NotRunning => format!("Consumer with ID '{}' is not running.", request.consumer_id),
    };

    Ok(HttpResponse::Ok().json(StatusResponse::new(message)))
}

/// List all active consumers
#[get("/list")]
pub async fn list_consumers(state: web::Data<AppState>) -> Result<HttpResponse, BridgeError> {
    Ok(HttpResponse::Ok().json(ActiveConsumersResponse {
        active_consumers: state.consumers.list(),
    }))
}

/// Introspect one consumer, current offsets included
#[get("/info/{consumer_id}")]
pub async fn consumer_info(consumer_id: web::Path<String>,
                           state: web::Data<AppState>) -> Result<HttpResponse, BridgeError> {
    let info = state.consumers.info(&consumer_id)?;
    Ok(HttpResponse::Ok().json(info))
}

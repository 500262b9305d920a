// SPDX-License-Identifier: Apache-2.0
use actix_web::{get, post, web, HttpResponse};
use crate::api::state::AppState;
use crate::error::bridge::BridgeError;
use crate::models::requests::{ActiveProducersResponse, StartProducerRequest, StatusResponse, StopProducerRequest};
use crate::registry::{StartStatus, StopStatus};

/// Start a Kafka producer with the given delivery mode
#[post("/start")]
pub async fn start_producer(request: web::Json<StartProducerRequest>,
                            state: web::Data<AppState>) -> Result<HttpResponse, BridgeError> {

    let status = state.producers.start(&request.producer_id, &request.kafka_topic,
                                       request.sending_mode)?;

    let message = match status {
        StartStatus::Started => format!("Started producer '{}' for Kafka topic '{}'.",
                                        request.producer_id, request.kafka_topic),
        StartStatus::AlreadyRunning => format!("Producer '{}' is already running.",
                                               request.producer_id),
    };

    Ok(HttpResponse::Ok().json(StatusResponse::new(message)))
}

/// Stop the producer with the given id
#[post("/stop")]
pub async fn stop_producer(request: web::Json<StopProducerRequest>,
                           state: web::Data<AppState>) -> Result<HttpResponse, BridgeError> {

    let status = state.producers.stop(&request.producer_id).await?;

    let message = match status {
        StopStatus::Stopped => format!("Producer '{}' stopped successfully.", request.producer_id),
        StopStatus::NotRunning => format!("Producer '{}' is not running.", request.producer_id),
    };

    Ok(HttpResponse::Ok().json(StatusResponse::new(message)))
}

/// List all active producers
#[get("/list")]
pub async fn list_producers(state: web::Data<AppState>) -> Result<HttpResponse, BridgeError> {
    Ok(HttpResponse::Ok().json(ActiveProducersResponse {
        active_producers: state.producers.list(),
    }))
}

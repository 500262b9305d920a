// SPDX-License-Identifier: Apache-2.0
use actix_web::{delete, get, patch, post, web, HttpResponse};
use crate::api::state::AppState;
use crate::error::bridge::BridgeError;
use crate::models::requests::{CreateTopicRequest, TopicQuery, UpdateTopicRequest};

/// Create a topic with user-defined partitions, replication factor and
/// retention policies
#[post("/create")]
pub async fn create_topic(request: web::Json<CreateTopicRequest>,
                          state: web::Data<AppState>) -> Result<HttpResponse, BridgeError> {
    let created = state.topics.create(&request).await?;
    Ok(HttpResponse::Created().json(created))
}

/// All topics available in the broker
#[get("/list")]
pub async fn list_topics(state: web::Data<AppState>) -> Result<HttpResponse, BridgeError> {
    let topics = state.topics.list().await?;
    Ok(HttpResponse::Ok().json(topics))
}

#[delete("/delete")]
pub async fn delete_topic(query: web::Query<TopicQuery>,
                          state: web::Data<AppState>) -> Result<HttpResponse, BridgeError> {
    let deleted = state.topics.delete(&query.topic_name).await?;
    Ok(HttpResponse::Ok().json(deleted))
}

/// Update the retention policies of an existing topic
#[patch("/update")]
pub async fn update_topic(request: web::Json<UpdateTopicRequest>,
                          state: web::Data<AppState>) -> Result<HttpResponse, BridgeError> {
    let updated = state.topics.update(&request).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// The non-default config entries of a topic
#[get("/config")]
pub async fn topic_config(query: web::Query<TopicQuery>,
                          state: web::Data<AppState>) -> Result<HttpResponse, BridgeError> {
    let config = state.topics.describe(&query.topic_name).await?;
    Ok(HttpResponse::Ok().json(config))
}

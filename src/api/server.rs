// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use std::time::Duration;
use actix_web::{get, middleware, web, App, HttpResponse, HttpServer};
use actix_web::http::KeepAlive;
use actix_web::middleware::{Logger, TrailingSlash};
use tracing::log;
use crate::api::metrics::metrics_handler;
use crate::api::routes;
use crate::api::state::AppState;
use crate::config::app::AppConfig;
use crate::error::bridge::BridgeError;
use crate::metrics::register_metrics;
use crate::models::requests::StatusResponse;
use crate::registry::consumer::ConsumerRegistry;
use crate::registry::producer::ProducerRegistry;
use crate::topics::TopicService;

#[get("/")]
async fn health() -> Result<HttpResponse, BridgeError> {
    Ok(HttpResponse::Ok().json(StatusResponse::new("Kafka bridge service is running!")))
}

pub async fn start(config: AppConfig,
                   consumers: Arc<ConsumerRegistry>,
                   producers: Arc<ProducerRegistry>,
                   topics: Arc<TopicService>) -> std::io::Result<()> {

    // Host and port
    let api_config = config.api.clone();
    let host_port = format!("{}:{}", api_config.hostname, api_config.port.unwrap_or_else(|| String::from("8080")));

    // Application state
    let state = web::Data::new(AppState::new(consumers.clone(), producers.clone(), topics, config));

    log::info!("starting HTTP server at http://{}", host_port);

    // Prometheus
    register_metrics();

    // Create the actix web server
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::NormalizePath::new(TrailingSlash::MergeOnly))
            .wrap(middleware::Compress::default())
            .wrap(Logger::default())
            .service(metrics_handler)
            .service(health)
            .service(web::scope("/consumer").configure(routes::consumer_api_config))
            .service(web::scope("/producer").configure(routes::producer_api_config))
            .service(web::scope("/topic").configure(routes::topic_api_config))
    }).keep_alive(KeepAlive::Timeout(Duration::from_secs(75)));

    // Listen for the HTTP requests
    server.bind(host_port)?
        .run()
        .await?;

    // Stop every worker before the process exits
    tracing::info!("Shutting down workers...");
    consumers.shutdown().await;
    producers.shutdown().await;

    Ok(())
}

pub mod routes;

use crate::{config::Config, error::ComicError, logger, pipeline::ComicPipeline};
use actix_web::{http::StatusCode, middleware, web, App, HttpResponse, HttpServer, ResponseError};
use serde_json::json;

pub use routes::configure;

pub struct AppState {
    pub pipeline: ComicPipeline,
}

impl AppState {
    pub fn new(pipeline: ComicPipeline) -> Self {
        Self { pipeline }
    }
}

/// Every failure reaches the client as a 500 with a readable message.
impl ResponseError for ComicError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let host = config.host().to_string();
    let port = config.port();

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), &host, port);
    logger::log_config_info(&config);

    let state = web::Data::new(AppState::new(ComicPipeline::from_config(&config)));
    let server_state = state.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    state.pipeline.images().drain_saves().await;
    log::info!("👋 Server stopped");
    Ok(())
}

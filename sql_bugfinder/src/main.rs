mod analyzer;
mod routes;

use crate::analyzer::{Analyzer, LlmAnalyzer, LlmSettings};
use axum::Router;
use env_logger::Env;
use log::{error, info};
use serde::Deserialize;
use std::process::exit;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_redoc::Redoc;
use utoipa_redoc::Servable;

fn get_default_port() -> u16 {
    8080
}

fn get_default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn get_default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn get_default_temperature() -> f64 {
    0.2
}

#[derive(Deserialize, Debug)]
struct Config {
    #[serde(default = "get_default_port")]
    port: u16,
    #[serde(default = "get_default_base_url")]
    base_url: String,
    api_key: String,
    #[serde(default = "get_default_model")]
    model: String,
    #[serde(default = "get_default_temperature")]
    temperature: f64,
}

#[derive(Clone)]
struct AppState {
    analyzer: Arc<dyn Analyzer>,
}

#[derive(OpenApi)]
#[openapi(info(description = "API for finding bugs in SQL queries using llms"))]
struct ApiDoc;

fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(routes::analyze))
        .split_for_parts();

    router
        .merge(Redoc::with_url("/redoc", api))
        .with_state(state)
}

async fn run() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let config = envy::from_env::<Config>()?;

    let analyzer = LlmAnalyzer::new(LlmSettings {
        base_url: config.base_url,
        api_key: config.api_key,
        model: config.model,
        temperature: config.temperature,
    })?;
    info!("Using model {}", analyzer.model());

    info!("Starting on port {}", config.port);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    axum::serve(
        listener,
        router(AppState {
            analyzer: Arc::new(analyzer),
        }),
    )
    .await?;

    Ok(())
}

fn main() {
    let rt = tokio::runtime::Runtime::new().unwrap();

    if let Err(err) = rt.block_on(run()) {
        error!("{}", err);
        exit(1)
    }
}

//! Service entry point: load both artifacts, build the router, serve
//! until ctrl-c.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use log::info;
use tokio::net::TcpListener;
use tokio::signal;

use server::Artifacts;
use server::service;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "8000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let model_path =
        PathBuf::from(env::var("MODEL_PATH").unwrap_or_else(|_| "models/model.json".to_string()));
    let encoders_path = PathBuf::from(
        env::var("ENCODERS_PATH").unwrap_or_else(|_| "models/encoders.json".to_string()),
    );
    let artifacts = Arc::new(Artifacts::load(&model_path, &encoders_path)?);

    let app = Router::new()
        .route("/", get(service::root))
        .route("/predict", post(service::predict))
        .with_state(artifacts);

    let addr = format!(
        "{}:{}",
        env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
        env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string()),
    );
    let listener = TcpListener::bind(&addr).await?;
    info!("listening at {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            info!("received shutdown signal");
        })
        .await?;
    Ok(())
}

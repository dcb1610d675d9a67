//! Composite Predictor - web service
//!
//! Loads the model artifacts once at startup and serves predictions
//! behind a small web form until interrupted.

use anyhow::Result;
use composite_server::{api, config::ServerConfig};
use predictor_lib::{
    health::{components, HealthRegistry},
    PredictorHandle, StructuredLogger, TwoStagePredictor,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = ServerConfig::load()?;
    info!(model_dir = %config.model_dir.display(), port = config.port, "Server configured");

    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(SERVER_VERSION, &config.model_dir);

    let health_registry = HealthRegistry::new();
    health_registry.register(components::PREDICTOR).await;
    health_registry.register(components::HTTP).await;

    // A failed load keeps the server up; /predict then answers with "Model is not loaded"
    let load_result = TwoStagePredictor::load(&config.model_dir);
    match &load_result {
        Ok(predictor) => {
            if let Some(manifest) = predictor.manifest() {
                logger.log_artifacts_loaded(manifest);
            }
        }
        Err(e) => logger.log_artifact_load_failed(&config.model_dir, &e.to_string()),
    }
    let predictor = PredictorHandle::from_load_result(load_result);
    health_registry.track_predictor(&predictor).await;

    let app_state = Arc::new(api::AppState::new(
        predictor,
        health_registry,
        logger.clone(),
    ));

    let shutdown_logger = logger.clone();
    let shutdown = async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => shutdown_logger.log_shutdown("SIGINT received"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl-C handler; running until killed");
                std::future::pending::<()>().await;
            }
        }
    };

    api::serve(&config.listen_addr(), app_state, shutdown).await?;
    info!("Shutting down");

    Ok(())
}

//! HTTP сервер формы оценки риска

mod handlers;
pub mod page;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ModelConfig, PipelinePaths};
use crate::error::Result;
use crate::models::RiskModel;

/// Модель и конфигурация загружаются один раз при старте
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<RiskModel>,
    pub config: Arc<ModelConfig>,
}

impl AppState {
    pub fn new(model: RiskModel, config: ModelConfig) -> Self {
        Self {
            model: Arc::new(model),
            config: Arc::new(config),
        }
    }

    pub fn load(paths: &PipelinePaths) -> Result<Self> {
        let config = ModelConfig::load(&paths.model_config())?;
        let model = RiskModel::load(&paths.final_model())?;
        tracing::info!(
            "Loaded {} ({} features, threshold {})",
            config.model_name,
            config.features.len(),
            config.threshold
        );
        Ok(Self::new(model, config))
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index).post(handlers::evaluate_form))
        .route("/health", get(handlers::health))
        .route("/api/predict", post(handlers::predict))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state)).await
}

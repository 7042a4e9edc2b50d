use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    dto::{HealthResponse, ModelInfo, RetrainResponse, ServiceBanner},
    errors::ServiceError,
    AppState,
};

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = ServiceBanner)),
    tag = "Root"
)]
pub async fn root() -> Json<ServiceBanner> {
    Json(ServiceBanner {
        message: "Rossmann Sales Forecasting API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/docs".to_string(),
    })
}

/// Liveness plus model availability; always 200
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service status", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.forecasting.is_model_loaded().await;
    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "unhealthy" }.to_string(),
        model_loaded,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Describe the active model
#[utoipa::path(
    get,
    path = "/model/info",
    responses(
        (status = 200, description = "Active model description", body = ModelInfo),
        (status = 503, description = "Model not loaded", body = crate::errors::ErrorResponse),
    ),
    tag = "Model"
)]
pub async fn model_info(State(state): State<AppState>) -> Result<Json<ModelInfo>, ServiceError> {
    Ok(Json(state.forecasting.model_info().await?))
}

/// Reload the model and scaler in the background
#[utoipa::path(
    post,
    path = "/retrain",
    description = "Schedules a reload of the model and scaler files. Responds immediately; the active model keeps serving until the new pair is loaded.",
    responses((status = 200, description = "Reload scheduled", body = RetrainResponse)),
    tag = "Model Management"
)]
pub async fn retrain(State(state): State<AppState>) -> Json<RetrainResponse> {
    state.forecasting.spawn_reload();
    Json(RetrainResponse {
        message: "Model retraining started".to_string(),
        status: "initiated".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

use axum::{extract::State, Json};

use crate::{
    dto::{
        BatchPredictionRequest, BatchPredictionResponse, PredictionRequest, PredictionResponse,
        SimpleBatchPredictionRequest, SimplePredictionRequest,
    },
    errors::ServiceError,
    handlers::common::{validate_input, validate_items},
    ml::ForecastRequest,
    AppState,
};

fn check_batch_size(state: &AppState, size: usize) -> Result<(), ServiceError> {
    let max = state.forecasting.max_batch_size();
    if size > max {
        return Err(ServiceError::BatchTooLarge { size, max });
    }
    Ok(())
}

/// Predict sales for a single store and date
#[utoipa::path(
    post,
    path = "/predict",
    summary = "Predict sales",
    description = "Forecast daily sales for one store and date. Sales history, when at least 30 days are supplied, replaces the synthetic estimate.",
    request_body = PredictionRequest,
    responses(
        (status = 200, description = "Forecast produced", body = PredictionResponse,
            headers(("x-request-id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid input or malformed date", body = crate::errors::ErrorResponse),
        (status = 500, description = "Prediction failed", body = crate::errors::ErrorResponse),
        (status = 503, description = "Model not loaded", body = crate::errors::ErrorResponse),
    ),
    tag = "Prediction"
)]
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<PredictionResponse>, ServiceError> {
    validate_input(&request)?;
    let result = state.forecasting.predict(request.into()).await?;
    Ok(Json(result.into()))
}

/// Predict sales from minimal input
#[utoipa::path(
    post,
    path = "/predict/simple",
    summary = "Predict sales (simplified input)",
    description = "Forecast from store, date and promotion only; store attributes and sales history are filled with defaults.",
    request_body = SimplePredictionRequest,
    responses(
        (status = 200, description = "Forecast produced", body = PredictionResponse),
        (status = 400, description = "Invalid input or malformed date", body = crate::errors::ErrorResponse),
        (status = 500, description = "Prediction failed", body = crate::errors::ErrorResponse),
        (status = 503, description = "Model not loaded", body = crate::errors::ErrorResponse),
    ),
    tag = "Prediction"
)]
pub async fn predict_simple(
    State(state): State<AppState>,
    Json(request): Json<SimplePredictionRequest>,
) -> Result<Json<PredictionResponse>, ServiceError> {
    validate_input(&request)?;
    let result = state.forecasting.predict(request.into()).await?;
    Ok(Json(result.into()))
}

/// Predict sales for many stores and dates
#[utoipa::path(
    post,
    path = "/predict/batch",
    summary = "Batch predict sales",
    description = "Forecast up to 1000 requests in order. Any failing item fails the whole batch.",
    request_body = BatchPredictionRequest,
    responses(
        (status = 200, description = "Forecasts produced", body = BatchPredictionResponse),
        (status = 400, description = "Batch too large, invalid input or malformed date", body = crate::errors::ErrorResponse),
        (status = 500, description = "Prediction failed", body = crate::errors::ErrorResponse),
        (status = 503, description = "Model not loaded", body = crate::errors::ErrorResponse),
    ),
    tag = "Prediction"
)]
pub async fn predict_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchPredictionRequest>,
) -> Result<Json<BatchPredictionResponse>, ServiceError> {
    check_batch_size(&state, request.predictions.len())?;
    validate_items(&request.predictions)?;

    let requests: Vec<ForecastRequest> = request.predictions.into_iter().map(Into::into).collect();
    let results = state.forecasting.predict_batch(requests).await?;
    Ok(Json(results.into()))
}

/// Predict sales for many stores and dates from minimal input
#[utoipa::path(
    post,
    path = "/predict/batch/simple",
    summary = "Batch predict sales (simplified input)",
    request_body = SimpleBatchPredictionRequest,
    responses(
        (status = 200, description = "Forecasts produced", body = BatchPredictionResponse),
        (status = 400, description = "Batch too large, invalid input or malformed date", body = crate::errors::ErrorResponse),
        (status = 500, description = "Prediction failed", body = crate::errors::ErrorResponse),
        (status = 503, description = "Model not loaded", body = crate::errors::ErrorResponse),
    ),
    tag = "Prediction"
)]
pub async fn predict_batch_simple(
    State(state): State<AppState>,
    Json(request): Json<SimpleBatchPredictionRequest>,
) -> Result<Json<BatchPredictionResponse>, ServiceError> {
    check_batch_size(&state, request.predictions.len())?;
    validate_items(&request.predictions)?;

    let requests: Vec<ForecastRequest> = request.predictions.into_iter().map(Into::into).collect();
    let results = state.forecasting.predict_batch(requests).await?;
    Ok(Json(results.into()))
}

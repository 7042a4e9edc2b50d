//! Store Forecast API Library
//!
//! Daily store-sales forecasting over a pre-trained regressor: feature
//! derivation, artifact loading and scoring, and the HTTP surface around them.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod ml;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::config::AppConfig;
use crate::services::ForecastService;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub forecasting: Arc<ForecastService>,
}

impl AppState {
    pub fn new(config: AppConfig, forecasting: ForecastService) -> Self {
        Self {
            config: Arc::new(config),
            forecasting: Arc::new(forecasting),
        }
    }
}

/// Build the CORS layer from configuration
pub fn cors_layer(cfg: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        CorsLayer::permissive()
    } else {
        ::tracing::warn!("No CORS origins configured; cross-origin requests will be refused");
        CorsLayer::new()
    }
}

/// Prediction and model routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .route("/model/info", get(handlers::health::model_info))
        .route("/predict", post(handlers::forecast::predict))
        .route("/predict/simple", post(handlers::forecast::predict_simple))
        .route("/predict/batch", post(handlers::forecast::predict_batch))
        .route(
            "/predict/batch/simple",
            post(handlers::forecast::predict_batch_simple),
        )
        .route("/retrain", post(handlers::health::retrain))
}

/// Full application router with docs, fallback and middleware
pub fn build_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(api_routes())
        .merge(openapi::swagger_ui())
        .fallback(errors::not_found_handler)
        .layer(TimeoutLayer::new(timeout))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

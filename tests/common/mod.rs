#![allow(dead_code)]

use std::path::PathBuf;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use serde_json::{json, Value};
use store_forecast_api::{
    build_router, config::AppConfig, services::ForecastService, AppState,
};
use tempfile::TempDir;
use tower::ServiceExt;

pub const FEATURE_COUNT: usize = 31;

// Column positions used by the fixture trees
pub const STORE: i64 = 0;
pub const PROMO: i64 = 2;
pub const SALES_LAG_1: i64 = 21;

/// A one-split tree in node-table form.
pub fn stump(feature: i64, threshold: f64, low: f64, high: f64) -> Value {
    json!({
        "children_left": [1, -1, -1],
        "children_right": [2, -1, -1],
        "feature": [feature, -2, -2],
        "threshold": [threshold, -2.0, -2.0],
        "value": [(low + high) / 2.0, low, high]
    })
}

/// Two-tree forest reacting to promotion and yesterday's sales.
pub fn forest_model() -> Value {
    json!({
        "metadata": {
            "model_type": "Random Forest Regressor",
            "version": "1.0.0",
            "trained_on": "Rossmann Store Sales Dataset"
        },
        "regressor": {
            "kind": "random_forest",
            "n_features": FEATURE_COUNT,
            "trees": [
                stump(PROMO, 0.5, 5000.0, 6000.0),
                stump(SALES_LAG_1, 5000.0, 5500.0, 6500.0)
            ]
        }
    })
}

pub fn linear_model(intercept: f64) -> Value {
    json!({
        "metadata": { "version": "2.0.0" },
        "regressor": {
            "kind": "linear",
            "n_features": FEATURE_COUNT,
            "intercept": intercept,
            "coefficients": vec![0.0; FEATURE_COUNT]
        }
    })
}

/// Forest whose only tree sends every positive store id to a missing node.
pub fn corrupted_model() -> Value {
    json!({
        "regressor": {
            "kind": "random_forest",
            "n_features": FEATURE_COUNT,
            "trees": [{
                "children_left": [1, -1],
                "children_right": [99, -1],
                "feature": [STORE, -2],
                "threshold": [0.0, -2.0],
                "value": [0.0, 1.0]
            }]
        }
    })
}

pub fn identity_scaler() -> Value {
    json!({
        "mean": vec![0.0; FEATURE_COUNT],
        "scale": vec![1.0; FEATURE_COUNT]
    })
}

/// Application wired to artifact files in a private temp directory.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    /// App serving the two-tree fixture forest.
    pub async fn new() -> Self {
        Self::with_model(forest_model()).await
    }

    pub async fn with_model(model: Value) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let app = Self::build(dir, Some(model), true).await;
        assert!(app.state.forecasting.is_model_loaded().await);
        app
    }

    /// App started without artifacts on disk.
    pub async fn without_model() -> Self {
        let dir = TempDir::new().expect("temp dir");
        Self::build(dir, None, false).await
    }

    async fn build(dir: TempDir, model: Option<Value>, require_artifacts: bool) -> Self {
        let model_path = dir.path().join("model.json");
        let scaler_path = dir.path().join("scaler.json");
        if let Some(model) = model {
            write_json(&model_path, &model);
            write_json(&scaler_path, &identity_scaler());
        }

        let mut cfg = AppConfig::new(&model_path, &scaler_path);
        cfg.require_artifacts = require_artifacts;

        let forecasting = ForecastService::from_config(&cfg)
            .await
            .expect("forecast service");
        let state = AppState::new(cfg, forecasting);
        let router = build_router(state.clone());

        Self {
            router,
            state,
            model_path,
            scaler_path,
            _dir: dir,
        }
    }

    /// Replaces the model file on disk; takes effect on the next reload.
    pub fn replace_model(&self, model: &Value) {
        write_json(&self.model_path, model);
    }

    pub fn replace_scaler(&self, scaler: &Value) {
        write_json(&self.scaler_path, scaler);
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> axum::response::Response {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> axum::response::Response {
        self.request(Method::POST, uri, Some(body)).await
    }
}

fn write_json(path: &std::path::Path, value: &Value) {
    std::fs::write(path, serde_json::to_vec(value).expect("serialize fixture"))
        .expect("write fixture");
}

/// Reads a response body as JSON.
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// The worked example: store 1 on Friday 2023-12-15 with a promotion.
pub fn simple_example() -> Value {
    json!({
        "store": 1,
        "date": "2023-12-15",
        "promo": 1,
        "state_holiday": "0",
        "school_holiday": 0,
        "day_of_week": 5
    })
}

pub fn full_example() -> Value {
    json!({
        "store": 1,
        "date": "2023-12-15",
        "promo": 1,
        "state_holiday": "0",
        "school_holiday": 0,
        "day_of_week": 5,
        "store_type": "a",
        "assortment": "c",
        "competition_distance": 570.0,
        "competition_open_since_month": 9,
        "competition_open_since_year": 2008
    })
}

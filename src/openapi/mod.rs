use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rossmann Sales Forecasting API",
        version = "1.0.0",
        description = r#"
# Rossmann Sales Forecasting API

Daily sales forecasts for individual stores, served from a pre-trained
regression model and its feature scaler.

## Inputs

- **Simple** endpoints need only store, date and promotion; store
  attributes and sales history fall back to defaults.
- **Full** endpoints accept store type, assortment, competition data and up
  to 30 days of recent sales. With fewer than 30 days the service uses a
  deterministic estimate instead.

## Batches

Batch endpoints take at most 1000 items and answer in input order. A single
invalid item fails the whole batch.

## Error Handling

```json
{
  "error": "Bad Request",
  "message": "Malformed date: '2023-02-30' is not a valid YYYY-MM-DD date",
  "request_id": "6b0e...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development")
    ),
    tags(
        (name = "Root", description = "Service banner"),
        (name = "Health", description = "Health check endpoints"),
        (name = "Model", description = "Model information"),
        (name = "Prediction", description = "Sales forecasting endpoints"),
        (name = "Model Management", description = "Artifact reload")
    ),
    paths(
        crate::handlers::health::root,
        crate::handlers::health::health_check,
        crate::handlers::health::model_info,
        crate::handlers::health::retrain,
        crate::handlers::forecast::predict,
        crate::handlers::forecast::predict_simple,
        crate::handlers::forecast::predict_batch,
        crate::handlers::forecast::predict_batch_simple,
    ),
    components(
        schemas(
            crate::dto::PredictionRequest,
            crate::dto::SimplePredictionRequest,
            crate::dto::BatchPredictionRequest,
            crate::dto::SimpleBatchPredictionRequest,
            crate::dto::PredictionResponse,
            crate::dto::BatchPredictionResponse,
            crate::dto::ModelInfo,
            crate::dto::HealthResponse,
            crate::dto::RetrainResponse,
            crate::dto::ServiceBanner,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url(OPENAPI_JSON_PATH, ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from(OPENAPI_JSON_PATH).try_it_out_enabled(true))
}

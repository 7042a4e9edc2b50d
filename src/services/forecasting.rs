use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::config::AppConfig;
use crate::dto::prediction::ModelInfo;
use crate::errors::ServiceError;
use crate::ml::{
    feature_names, forecast_one, score_batch, ArtifactGeneration, ArtifactStore, ForecastRequest,
    ForecastResult, FEATURE_COUNT,
};

const MODEL_REQUIREMENTS: &str =
    "Requires engineered features including sales history, rolling statistics, and cyclical encodings";

/// Service answering forecast requests against the active artifact generation
#[derive(Clone, Debug)]
pub struct ForecastService {
    store: Arc<ArtifactStore>,
    model_path: PathBuf,
    scaler_path: PathBuf,
    max_batch_size: usize,
}

impl ForecastService {
    pub fn new(store: Arc<ArtifactStore>, config: &AppConfig) -> Self {
        Self {
            store,
            model_path: config.model_path.clone(),
            scaler_path: config.scaler_path.clone(),
            max_batch_size: config.max_batch_size,
        }
    }

    /// Loads the configured artifacts before the first request.
    pub async fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        let service = Self::new(Arc::new(ArtifactStore::new()), config);
        match service.reload().await {
            Ok(()) => Ok(service),
            Err(err) if !config.require_artifacts => {
                warn!(
                    error = %err,
                    "Starting without a model; prediction endpoints return 503 until a reload succeeds"
                );
                Ok(service)
            }
            Err(err) => Err(err),
        }
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub async fn is_model_loaded(&self) -> bool {
        self.store.is_loaded().await
    }

    async fn generation(&self) -> Result<Arc<ArtifactGeneration>, ServiceError> {
        self.store.current().await.ok_or(ServiceError::ModelNotLoaded)
    }

    /// Forecasts a single request
    #[instrument(skip(self, request), fields(store = request.store, date = %request.date))]
    pub async fn predict(&self, request: ForecastRequest) -> Result<ForecastResult, ServiceError> {
        let generation = self.generation().await?;
        forecast_one(&generation, &request)
    }

    /// Forecasts every request against one generation; all or nothing.
    #[instrument(skip(self, requests), fields(size = requests.len()))]
    pub async fn predict_batch(
        &self,
        requests: Vec<ForecastRequest>,
    ) -> Result<Vec<ForecastResult>, ServiceError> {
        let generation = self.generation().await?;
        let max = self.max_batch_size;

        let results = tokio::task::spawn_blocking(move || score_batch(&generation, &requests, max))
            .await
            .map_err(|e| ServiceError::InternalError(format!("batch worker failed: {e}")))??;

        info!(total_predictions = results.len(), "Batch prediction completed");
        Ok(results)
    }

    /// Replaces the active generation with freshly loaded artifacts.
    pub async fn reload(&self) -> Result<(), ServiceError> {
        self.store
            .reload(&self.model_path, &self.scaler_path)
            .await
            .map_err(ServiceError::ArtifactLoad)
    }

    /// Runs [`reload`](Self::reload) in the background.
    pub fn spawn_reload(&self) -> tokio::task::JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            info!("Starting model reload");
            match service.reload().await {
                Ok(()) => info!("Model reload completed"),
                Err(err) => error!(error = %err, "Model reload failed"),
            }
        })
    }

    pub async fn model_info(&self) -> Result<ModelInfo, ServiceError> {
        let generation = self.generation().await?;
        let features: Vec<String> = feature_names().into_iter().map(String::from).collect();
        Ok(ModelInfo {
            model_type: generation.model.model_type(),
            trained_on: generation.model.metadata.trained_on.clone(),
            version: generation.model.metadata.version.clone(),
            total_features: FEATURE_COUNT,
            features,
            model_requirements: MODEL_REQUIREMENTS.to_string(),
        })
    }
}

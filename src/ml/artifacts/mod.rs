//! Model and scaler artifacts.
//!
//! Both files are loaded together into one [`ArtifactGeneration`]. The
//! [`ArtifactStore`] only ever exposes complete generations: a reload builds
//! the new pair first and replaces the pointer afterwards, so requests that
//! already hold a generation finish on it untouched.

pub mod regressor;
pub mod scaler;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use super::features::FEATURE_COUNT;
use crate::errors::ArtifactError;

pub use regressor::{DecisionTree, LinearRegressor, RandomForest, Regressor};
pub use scaler::StandardScaler;

const DEFAULT_TRAINED_ON: &str = "Rossmann Store Sales Dataset";
const DEFAULT_MODEL_VERSION: &str = "1.0.0";

/// Descriptive fields reported by the model-info endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Falls back to the regressor's own description when absent.
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default = "default_model_version")]
    pub version: String,
    #[serde(default = "default_trained_on")]
    pub trained_on: String,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            model_type: None,
            version: default_model_version(),
            trained_on: default_trained_on(),
        }
    }
}

fn default_model_version() -> String {
    DEFAULT_MODEL_VERSION.to_string()
}

fn default_trained_on() -> String {
    DEFAULT_TRAINED_ON.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default)]
    pub metadata: ModelMetadata,
    pub regressor: Regressor,
}

impl ModelArtifact {
    pub fn model_type(&self) -> String {
        self.metadata
            .model_type
            .clone()
            .unwrap_or_else(|| self.regressor.describe().to_string())
    }
}

/// A model and the scaler it was trained with, loaded as one unit.
#[derive(Debug)]
pub struct ArtifactGeneration {
    pub model: ModelArtifact,
    pub scaler: StandardScaler,
}

impl ArtifactGeneration {
    /// Checks that both artifacts agree with the feature layout.
    pub fn new(model: ModelArtifact, scaler: StandardScaler) -> Result<Self, ArtifactError> {
        scaler.validate()?;
        if scaler.n_features() != FEATURE_COUNT {
            return Err(ArtifactError::FeatureCountMismatch {
                expected: FEATURE_COUNT,
                actual: scaler.n_features(),
            });
        }
        if model.regressor.n_features() != FEATURE_COUNT {
            return Err(ArtifactError::FeatureCountMismatch {
                expected: FEATURE_COUNT,
                actual: model.regressor.n_features(),
            });
        }
        Ok(Self { model, scaler })
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let display = path.display().to_string();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ArtifactError::Io {
            path: display.clone(),
            source,
        })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Decode {
        path: display,
        source,
    })
}

/// Reads and validates both artifact files.
pub async fn load_generation(
    model_path: &Path,
    scaler_path: &Path,
) -> Result<ArtifactGeneration, ArtifactError> {
    let model: ModelArtifact = read_json(model_path).await?;
    let scaler: StandardScaler = read_json(scaler_path).await?;
    ArtifactGeneration::new(model, scaler)
}

/// Holder for the currently active generation.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    current: RwLock<Option<Arc<ArtifactGeneration>>>,
    // held across load and swap so reloads install in the order they start
    reloading: Mutex<()>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generation(generation: ArtifactGeneration) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(generation))),
            reloading: Mutex::new(()),
        }
    }

    /// Snapshot of the active generation, if any.
    pub async fn current(&self) -> Option<Arc<ArtifactGeneration>> {
        self.current.read().await.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Installs `generation`, returning the one it replaced.
    pub async fn swap(&self, generation: ArtifactGeneration) -> Option<Arc<ArtifactGeneration>> {
        let next = Arc::new(generation);
        self.current.write().await.replace(next)
    }

    /// Loads a fresh generation and swaps it in. On failure the active
    /// generation is left in place. Concurrent reloads run one at a time.
    pub async fn reload(&self, model_path: &Path, scaler_path: &Path) -> Result<(), ArtifactError> {
        let _reloading = self.reloading.lock().await;
        match load_generation(model_path, scaler_path).await {
            Ok(generation) => {
                let model_type = generation.model.model_type();
                let version = generation.model.metadata.version.clone();
                self.swap(generation).await;
                info!(
                    model_type = %model_type,
                    version = %version,
                    model_path = %model_path.display(),
                    "Model and scaler loaded successfully"
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    error = %err,
                    model_path = %model_path.display(),
                    scaler_path = %scaler_path.display(),
                    "Error loading model artifacts"
                );
                Err(err)
            }
        }
    }
}

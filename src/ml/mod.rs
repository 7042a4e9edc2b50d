/*!
 * # Forecasting Core
 *
 * Turns a store/date request into a sales forecast:
 * request -> feature row (with synthetic history when real history is
 * short) -> scaler -> regressor -> forecast with a confidence score.
 *
 * Everything here is synchronous and free of I/O except artifact loading.
 */

/// Serialized model and scaler, plus the generation holder
pub mod artifacts;

/// Ordered batch scoring
pub mod batch;

/// 31-column feature derivation
pub mod features;

/// Lag and rolling statistics, real or synthetic
pub mod history;

/// Normalized request type and categorical encodings
pub mod request;

/// Scaling, prediction and confidence
pub mod scoring;

pub use artifacts::{ArtifactGeneration, ArtifactStore};
pub use batch::{forecast_one, score_batch, ForecastResult};
pub use features::{derive_features, feature_names, Feature, FeatureVector, FEATURE_COUNT};
pub use history::SalesHistory;
pub use request::{Assortment, ForecastRequest, StateHoliday, StoreType};
pub use scoring::{confidence_from_members, score, Scored, DEFAULT_CONFIDENCE};

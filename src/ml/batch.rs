use serde::{Deserialize, Serialize};

use super::artifacts::ArtifactGeneration;
use super::features::derive_features;
use super::request::ForecastRequest;
use super::scoring::score;
use crate::errors::ServiceError;

/// Forecast for one store and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub store: u32,
    pub date: String,
    pub forecasted_sales: f64,
    /// In [0, 1]. Optional on the wire, always set here.
    pub confidence_score: Option<f64>,
}

/// Derives, scales and scores a single request.
pub fn forecast_one(
    generation: &ArtifactGeneration,
    request: &ForecastRequest,
) -> Result<ForecastResult, ServiceError> {
    let vector = derive_features(request)?;
    let scored = score(generation, &vector)?;
    Ok(ForecastResult {
        store: request.store,
        date: request.date.clone(),
        forecasted_sales: scored.forecasted_sales,
        confidence_score: Some(scored.confidence),
    })
}

/// Scores `requests` in order against one generation.
///
/// The size limit is checked before any item is touched, and the first
/// failing item aborts the batch.
pub fn score_batch(
    generation: &ArtifactGeneration,
    requests: &[ForecastRequest],
    max_batch_size: usize,
) -> Result<Vec<ForecastResult>, ServiceError> {
    if requests.len() > max_batch_size {
        return Err(ServiceError::BatchTooLarge {
            size: requests.len(),
            max: max_batch_size,
        });
    }

    requests
        .iter()
        .map(|request| forecast_one(generation, request))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::artifacts::{
        LinearRegressor, ModelArtifact, ModelMetadata, Regressor, StandardScaler,
    };
    use crate::ml::features::FEATURE_COUNT;
    use assert_matches::assert_matches;

    /// Predicts the raw store number.
    fn store_echo() -> ArtifactGeneration {
        let mut coefficients = vec![0.0; FEATURE_COUNT];
        coefficients[0] = 1.0;
        ArtifactGeneration::new(
            ModelArtifact {
                metadata: ModelMetadata::default(),
                regressor: Regressor::Linear(LinearRegressor {
                    n_features: FEATURE_COUNT,
                    intercept: 0.0,
                    coefficients,
                }),
            },
            StandardScaler {
                mean: vec![0.0; FEATURE_COUNT],
                scale: vec![1.0; FEATURE_COUNT],
            },
        )
        .unwrap()
    }

    fn requests(n: u32) -> Vec<ForecastRequest> {
        (1..=n).map(|store| ForecastRequest::new(store, "2023-12-15")).collect()
    }

    #[test]
    fn preserves_input_order() {
        let results = score_batch(&store_echo(), &requests(1000), 1000).unwrap();
        assert_eq!(results.len(), 1000);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.store as usize, i + 1);
            assert_eq!(result.forecasted_sales, (i + 1) as f64);
            assert_eq!(result.confidence_score, Some(0.85));
        }
    }

    #[test]
    fn oversized_batch_is_rejected() {
        assert_matches!(
            score_batch(&store_echo(), &requests(1001), 1000),
            Err(ServiceError::BatchTooLarge {
                size: 1001,
                max: 1000
            })
        );
    }

    #[test]
    fn empty_batch_is_fine() {
        assert!(score_batch(&store_echo(), &[], 1000).unwrap().is_empty());
    }

    #[test]
    fn one_bad_date_fails_the_batch() {
        let mut batch = requests(3);
        batch[1].date = "2023-02-30".into();
        assert_matches!(
            score_batch(&store_echo(), &batch, 1000),
            Err(ServiceError::MalformedDate(_))
        );
    }
}

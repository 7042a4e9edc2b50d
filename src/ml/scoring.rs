//! Scaling, prediction and confidence for a single feature row.

use super::artifacts::ArtifactGeneration;
use super::features::FeatureVector;
use crate::errors::{ArtifactError, ServiceError};

/// Confidence reported for regressors without ensemble members.
pub const DEFAULT_CONFIDENCE: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub forecasted_sales: f64,
    pub confidence: f64,
}

/// Relative agreement of ensemble members: `1 - std/mean`, clamped to [0, 1].
///
/// A zero mean, or any ratio that is not finite, yields 0.
pub fn confidence_from_members(members: &[f64]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let n = members.len() as f64;
    let mean = members.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }
    let std = (members.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / n).sqrt();
    let ratio = std / mean;
    if !ratio.is_finite() {
        return 0.0;
    }
    (1.0 - ratio).clamp(0.0, 1.0)
}

fn evaluate(generation: &ArtifactGeneration, vector: &FeatureVector) -> Result<Scored, ArtifactError> {
    let scaled = generation.scaler.transform(vector.as_slice())?;
    let prediction = generation.model.regressor.evaluate(&scaled)?;

    let confidence = match &prediction.members {
        Some(members) => confidence_from_members(members),
        None => DEFAULT_CONFIDENCE,
    };

    Ok(Scored {
        forecasted_sales: prediction.value,
        confidence,
    })
}

/// Scores one feature row against `generation`.
pub fn score(generation: &ArtifactGeneration, vector: &FeatureVector) -> Result<Scored, ServiceError> {
    evaluate(generation, vector).map_err(|err| {
        tracing::error!(error = %err, "Error making prediction");
        ServiceError::PredictionFailure(err)
    })
}

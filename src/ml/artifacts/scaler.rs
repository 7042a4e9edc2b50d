use serde::{Deserialize, Serialize};

use crate::errors::ArtifactError;

/// Per-column standardization fitted at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub(crate) fn validate(&self) -> Result<(), ArtifactError> {
        if self.mean.len() != self.scale.len() {
            return Err(ArtifactError::Invalid(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self
            .mean
            .iter()
            .chain(self.scale.iter())
            .any(|v| !v.is_finite())
        {
            return Err(ArtifactError::NonFinite("scaler parameters"));
        }
        Ok(())
    }

    /// `(x - mean) / scale` per column; a zero scale leaves the column centered only.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        if row.len() != self.n_features() {
            return Err(ArtifactError::FeatureCountMismatch {
                expected: self.n_features(),
                actual: row.len(),
            });
        }

        let scaled: Vec<f64> = row
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| {
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect();

        if scaled.iter().any(|v| !v.is_finite()) {
            return Err(ArtifactError::NonFinite("scaler"));
        }
        Ok(scaled)
    }
}

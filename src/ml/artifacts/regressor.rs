//! Serialized regressors.
//!
//! Trees use the flat node-table layout common to tree learners: parallel
//! arrays indexed by node id, with `-1` in `children_left` marking a leaf.
//! Node references are only checked while walking, so a damaged table
//! surfaces as an evaluation failure rather than a panic.

use serde::{Deserialize, Serialize};

use crate::errors::ArtifactError;

const LEAF: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub n_features: usize,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearRegressor {
    pub fn predict(&self, row: &[f64]) -> Result<f64, ArtifactError> {
        check_width(self.n_features, row)?;
        if self.coefficients.len() != row.len() {
            return Err(ArtifactError::FeatureCountMismatch {
                expected: self.coefficients.len(),
                actual: row.len(),
            });
        }
        let value = self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>();
        finite(value, "linear regressor")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl DecisionTree {
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn has_consistent_shape(&self) -> bool {
        let n = self.node_count();
        n > 0
            && self.children_right.len() == n
            && self.feature.len() == n
            && self.threshold.len() == n
            && self.value.len() == n
    }

    /// Walks from the root to a leaf. `tree` only labels errors.
    pub fn predict(&self, tree: usize, row: &[f64]) -> Result<f64, ArtifactError> {
        let corrupted = |reason: String| ArtifactError::CorruptedTree { tree, reason };

        if !self.has_consistent_shape() {
            return Err(corrupted("node arrays are empty or differ in length".into()));
        }

        let n = self.node_count();
        let mut node = 0usize;
        // a well-formed path visits each node at most once
        for _ in 0..=n {
            let left = self.children_left[node];
            if left == LEAF {
                return Ok(self.value[node]);
            }

            let feature = usize::try_from(self.feature[node])
                .ok()
                .filter(|f| *f < row.len())
                .ok_or_else(|| {
                    corrupted(format!(
                        "node {node} splits on feature {} of {}",
                        self.feature[node],
                        row.len()
                    ))
                })?;

            let next = if row[feature] <= self.threshold[node] {
                left
            } else {
                self.children_right[node]
            };

            node = usize::try_from(next)
                .ok()
                .filter(|i| *i < n)
                .ok_or_else(|| corrupted(format!("node {node} points at child {next}")))?;
        }

        Err(corrupted("cycle in node references".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// One prediction per tree, in tree order.
    pub fn member_predictions(&self, row: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        check_width(self.n_features, row)?;
        if self.trees.is_empty() {
            return Err(ArtifactError::Invalid("forest has no trees".into()));
        }
        self.trees
            .iter()
            .enumerate()
            .map(|(i, tree)| tree.predict(i, row))
            .collect()
    }
}

fn average(members: &[f64]) -> Result<f64, ArtifactError> {
    let value = members.iter().sum::<f64>() / members.len() as f64;
    finite(value, "random forest")
}

/// Point prediction plus, for ensembles, the member outputs it was averaged from.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub value: f64,
    pub members: Option<Vec<f64>>,
}

/// Regressor capability: a single estimator or an ensemble with members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    Linear(LinearRegressor),
    RandomForest(RandomForest),
}

impl Regressor {
    pub fn n_features(&self) -> usize {
        match self {
            Regressor::Linear(m) => m.n_features,
            Regressor::RandomForest(m) => m.n_features,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Regressor::Linear(_) => "Linear Regressor",
            Regressor::RandomForest(_) => "Random Forest Regressor",
        }
    }

    /// Single pass producing both the point value and any member outputs.
    pub fn evaluate(&self, row: &[f64]) -> Result<Prediction, ArtifactError> {
        match self {
            Regressor::Linear(m) => Ok(Prediction {
                value: m.predict(row)?,
                members: None,
            }),
            Regressor::RandomForest(m) => {
                let members = m.member_predictions(row)?;
                Ok(Prediction {
                    value: average(&members)?,
                    members: Some(members),
                })
            }
        }
    }
}

fn check_width(expected: usize, row: &[f64]) -> Result<(), ArtifactError> {
    if row.len() == expected {
        Ok(())
    } else {
        Err(ArtifactError::FeatureCountMismatch {
            expected,
            actual: row.len(),
        })
    }
}

fn finite(value: f64, source: &'static str) -> Result<f64, ArtifactError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ArtifactError::NonFinite(source))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// Single split on `feature`: left leaf `low`, right leaf `high`.
    pub(crate) fn stump(feature: i64, threshold: f64, low: f64, high: f64) -> DecisionTree {
        DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![(low + high) / 2.0, low, high],
        }
    }

    #[test]
    fn stump_goes_left_on_equal() {
        let tree = stump(0, 1.0, 10.0, 20.0);
        assert_eq!(tree.predict(0, &[1.0]).unwrap(), 10.0);
        assert_eq!(tree.predict(0, &[1.5]).unwrap(), 20.0);
    }

    #[test]
    fn forest_averages_members() {
        let forest = RandomForest {
            n_features: 2,
            trees: vec![stump(0, 0.0, 100.0, 200.0), stump(1, 0.0, 300.0, 500.0)],
        };
        let row = [1.0, -1.0];
        assert_eq!(forest.member_predictions(&row).unwrap(), vec![200.0, 300.0]);

        let prediction = Regressor::RandomForest(forest).evaluate(&row).unwrap();
        assert_eq!(prediction.value, 250.0);
        assert_eq!(prediction.members, Some(vec![200.0, 300.0]));
    }

    #[test]
    fn linear_is_not_an_ensemble() {
        let model = Regressor::Linear(LinearRegressor {
            n_features: 2,
            intercept: 1.0,
            coefficients: vec![2.0, 3.0],
        });
        let prediction = model.evaluate(&[1.0, 1.0]).unwrap();
        assert_eq!(prediction.value, 6.0);
        assert!(prediction.members.is_none());
    }

    #[test]
    fn out_of_range_child_is_corruption() {
        let mut tree = stump(0, 0.0, 1.0, 2.0);
        tree.children_right[0] = 99;
        assert_matches!(
            tree.predict(4, &[1.0]),
            Err(ArtifactError::CorruptedTree { tree: 4, .. })
        );
    }

    #[test]
    fn out_of_range_feature_is_corruption() {
        let tree = stump(5, 0.0, 1.0, 2.0);
        assert_matches!(
            tree.predict(0, &[1.0]),
            Err(ArtifactError::CorruptedTree { .. })
        );
    }

    #[test]
    fn cyclic_tree_terminates() {
        let tree = DecisionTree {
            children_left: vec![0],
            children_right: vec![0],
            feature: vec![0],
            threshold: vec![0.0],
            value: vec![0.0],
        };
        assert_matches!(
            tree.predict(0, &[0.0]),
            Err(ArtifactError::CorruptedTree { .. })
        );
    }

    #[test]
    fn empty_forest_fails() {
        let forest = RandomForest {
            n_features: 1,
            trees: vec![],
        };
        assert_matches!(
            Regressor::RandomForest(forest).evaluate(&[0.0]),
            Err(ArtifactError::Invalid(_))
        );
    }

    #[test]
    fn deserializes_tagged_variants() {
        let raw = r#"{
            "kind": "random_forest",
            "n_features": 1,
            "trees": [{
                "children_left": [-1],
                "children_right": [-1],
                "feature": [-2],
                "threshold": [-2.0],
                "value": [42.0]
            }]
        }"#;
        let model: Regressor = serde_json::from_str(raw).unwrap();
        let prediction = model.evaluate(&[0.0]).unwrap();
        assert_eq!(prediction.value, 42.0);
        assert_eq!(prediction.members, Some(vec![42.0]));

        let raw = r#"{"kind": "linear", "n_features": 1, "intercept": 0.5, "coefficients": [2.0]}"#;
        let model: Regressor = serde_json::from_str(raw).unwrap();
        assert_eq!(model.describe(), "Linear Regressor");
    }
}

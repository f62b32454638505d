//! Trained-model contract and prediction.
//!
//! A classifier exposes its ordered feature schema and a binary decision
//! function. Models are persisted as JSON [`ModelArtifact`]s tagged by
//! `kind`, validated once by [`ModelArtifact::from_json`]; a model that
//! fails validation is never served.
//!
//! # Random forest layout
//!
//! Each tree stores parallel node arrays. Node `i` is a leaf when both
//! `children_left[i]` and `children_right[i]` are `-1`; otherwise traversal
//! goes left when `x[feature[i]] <= threshold[i]`. `value[i]` holds the
//! class weights `[retained, churned]`. The forest predicts the class with
//! the highest mean of per-tree normalized leaf distributions.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::{CoreError, Result};

/// Binary churn classifier.
pub trait Classifier: Send + Sync {
    /// Feature names in the order [`predict`](Classifier::predict) expects.
    fn feature_names(&self) -> &[String];

    /// Returns `1` for churn, `0` for retained.
    fn predict(&self, vector: &[f64]) -> Result<u8>;
}

/// Pass the aligned vector to the loaded classifier.
///
/// Fails with [`CoreError::ModelUnavailable`] when no model was loaded.
pub fn predict(vector: &[f64], model: Option<&dyn Classifier>) -> Result<u8> {
    match model {
        Some(m) => m.predict(vector),
        None => Err(CoreError::ModelUnavailable("Model is not loaded".to_string())),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    RandomForest(RandomForest),
    Logistic(LogisticModel),
}

impl ModelArtifact {
    /// Parse and validate a JSON artifact.
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: ModelArtifact =
            serde_json::from_str(json).map_err(|e| CoreError::InvalidModel(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ModelArtifact::RandomForest(m) => m.validate(),
            ModelArtifact::Logistic(m) => m.validate(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::RandomForest(_) => "random_forest",
            ModelArtifact::Logistic(_) => "logistic",
        }
    }
}

impl Classifier for ModelArtifact {
    fn feature_names(&self) -> &[String] {
        match self {
            ModelArtifact::RandomForest(m) => m.feature_names(),
            ModelArtifact::Logistic(m) => m.feature_names(),
        }
    }

    fn predict(&self, vector: &[f64]) -> Result<u8> {
        match self {
            ModelArtifact::RandomForest(m) => m.predict(vector),
            ModelArtifact::Logistic(m) => m.predict(vector),
        }
    }
}

fn validate_feature_names(names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(CoreError::InvalidModel("feature_names is empty".into()));
    }
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(CoreError::InvalidModel("blank feature name".into()));
        }
        if !seen.insert(name.as_str()) {
            return Err(CoreError::InvalidModel(format!(
                "duplicate feature name: {}",
                name
            )));
        }
    }
    Ok(())
}

fn check_len(names: &[String], vector: &[f64]) -> Result<()> {
    if vector.len() != names.len() {
        return Err(CoreError::FeatureCount {
            expected: names.len(),
            got: vector.len(),
        });
    }
    Ok(())
}

// ============ Random forest ============

#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    pub feature_names: Vec<String>,
    pub trees: Vec<DecisionTree>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

const LEAF: i64 = -1;

impl RandomForest {
    fn validate(&self) -> Result<()> {
        validate_feature_names(&self.feature_names)?;
        if self.trees.is_empty() {
            return Err(CoreError::InvalidModel("forest has no trees".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len())
                .map_err(|msg| CoreError::InvalidModel(format!("tree {}: {}", i, msg)))?;
        }
        Ok(())
    }

    /// Mean churn probability across trees.
    pub fn churn_probability(&self, vector: &[f64]) -> Result<f64> {
        check_len(&self.feature_names, vector)?;
        let total: f64 = self.trees.iter().map(|t| t.leaf_distribution(vector)[1]).sum();
        Ok(total / self.trees.len() as f64)
    }
}

impl Classifier for RandomForest {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, vector: &[f64]) -> Result<u8> {
        let p_churn = self.churn_probability(vector)?;
        // argmax over [1 - p, p]; ties resolve to the first class
        Ok(u8::from(p_churn > 1.0 - p_churn))
    }
}

impl DecisionTree {
    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("no nodes".into());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("node arrays differ in length".into());
        }

        for i in 0..n {
            let weights = &self.value[i];
            if weights.len() != 2 {
                return Err(format!("node {} has {} class weights", i, weights.len()));
            }
            if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(format!("node {} has invalid class weights", i));
            }

            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF && right == LEAF {
                if weights[0] + weights[1] <= 0.0 {
                    return Err(format!("leaf {} has zero total weight", i));
                }
                continue;
            }
            for child in [left, right] {
                // children always sit after their parent, which rules out cycles
                if child <= i as i64 || child >= n as i64 {
                    return Err(format!("node {} has out-of-range child {}", i, child));
                }
            }
            let feature = self.feature[i];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {} splits on unknown feature {}", i, feature));
            }
            if !self.threshold[i].is_finite() {
                return Err(format!("node {} has a non-finite threshold", i));
            }
        }
        Ok(())
    }

    /// Normalized `[retained, churned]` distribution of the leaf `vector` lands in.
    fn leaf_distribution(&self, vector: &[f64]) -> [f64; 2] {
        let mut node = 0usize;
        loop {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF && right == LEAF {
                let w = &self.value[node];
                let sum = w[0] + w[1];
                return [w[0] / sum, w[1] / sum];
            }
            // thresholds were fit on single-precision inputs
            let x = vector[self.feature[node] as usize] as f32 as f64;
            node = if x <= self.threshold[node] {
                left as usize
            } else {
                right as usize
            };
        }
    }
}

// ============ Logistic regression ============

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

impl LogisticModel {
    fn validate(&self) -> Result<()> {
        validate_feature_names(&self.feature_names)?;
        if self.coefficients.len() != self.feature_names.len() {
            return Err(CoreError::InvalidModel(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            )));
        }
        if self.coefficients.iter().any(|c| !c.is_finite()) || !self.intercept.is_finite() {
            return Err(CoreError::InvalidModel("non-finite coefficient".into()));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(CoreError::InvalidModel("threshold must be in [0, 1]".into()));
        }
        Ok(())
    }

    pub fn churn_probability(&self, vector: &[f64]) -> Result<f64> {
        check_len(&self.feature_names, vector)?;
        let z: f64 = self.intercept
            + self
                .coefficients
                .iter()
                .zip(vector)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

impl Classifier for LogisticModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, vector: &[f64]) -> Result<u8> {
        Ok(u8::from(self.churn_probability(vector)? >= self.threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One split on tenure at 12.5: short tenure churns.
    const STUMP_FOREST: &str = r#"{
        "kind": "random_forest",
        "feature_names": ["tenure", "MonthlyCharges"],
        "trees": [
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [0, -2, -2],
                "threshold": [12.5, -2.0, -2.0],
                "value": [[50.0, 50.0], [10.0, 30.0], [40.0, 20.0]]
            },
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [1, -2, -2],
                "threshold": [80.0, -2.0, -2.0],
                "value": [[50.0, 50.0], [30.0, 10.0], [5.0, 15.0]]
            }
        ]
    }"#;

    #[test]
    fn test_forest_averages_tree_distributions() {
        let model = ModelArtifact::from_json(STUMP_FOREST).unwrap();
        assert_eq!(model.kind(), "random_forest");
        assert_eq!(model.feature_names(), ["tenure", "MonthlyCharges"]);

        // tree0 -> [0.25, 0.75], tree1 -> [0.75, 0.25]: a tie resolves to 0
        assert_eq!(model.predict(&[5.0, 50.0]).unwrap(), 0);
        // tree0 -> [0.25, 0.75], tree1 -> [0.25, 0.75]
        assert_eq!(model.predict(&[5.0, 95.0]).unwrap(), 1);
        // tree0 -> [2/3, 1/3], tree1 -> [0.75, 0.25]
        assert_eq!(model.predict(&[24.0, 50.0]).unwrap(), 0);
    }

    #[test]
    fn test_threshold_is_inclusive_left() {
        let model = ModelArtifact::from_json(STUMP_FOREST).unwrap();
        let ModelArtifact::RandomForest(forest) = &model else {
            panic!("expected forest");
        };
        let at = forest.churn_probability(&[12.5, 95.0]).unwrap();
        let above = forest.churn_probability(&[13.0, 95.0]).unwrap();
        assert!((at - 0.75).abs() < 1e-9);
        assert!((above - (1.0 / 3.0 + 0.75) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_vector_length() {
        let model = ModelArtifact::from_json(STUMP_FOREST).unwrap();
        assert_eq!(
            model.predict(&[1.0]),
            Err(CoreError::FeatureCount {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_rejects_backward_child() {
        let json = STUMP_FOREST.replacen("\"children_left\": [1, -1, -1]", "\"children_left\": [0, -1, -1]", 1);
        let err = ModelArtifact::from_json(&json).unwrap_err();
        assert!(matches!(err, CoreError::InvalidModel(msg) if msg.contains("tree 0")));
    }

    #[test]
    fn test_rejects_unknown_feature_index() {
        let json = STUMP_FOREST.replacen("\"feature\": [0, -2, -2]", "\"feature\": [7, -2, -2]", 1);
        assert!(matches!(
            ModelArtifact::from_json(&json),
            Err(CoreError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_feature_names() {
        let json = STUMP_FOREST.replace("\"MonthlyCharges\"]", "\"tenure\"]");
        let err = ModelArtifact::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("duplicate feature name"));
    }

    #[test]
    fn test_rejects_unknown_kind_and_garbage() {
        assert!(ModelArtifact::from_json(r#"{"kind": "svm", "feature_names": ["a"]}"#).is_err());
        assert!(ModelArtifact::from_json("not json").is_err());
    }

    #[test]
    fn test_logistic_model() {
        let model = ModelArtifact::from_json(
            r#"{"kind": "logistic", "feature_names": ["tenure", "MonthlyCharges"],
                "coefficients": [-0.1, 0.05], "intercept": -1.0}"#,
        )
        .unwrap();
        // z = -1 - 0.1 + 4.5 = 3.4
        assert_eq!(model.predict(&[1.0, 90.0]).unwrap(), 1);
        // z = -1 - 6.0 + 1.0 = -6.0
        assert_eq!(model.predict(&[60.0, 20.0]).unwrap(), 0);
    }

    #[test]
    fn test_logistic_rejects_mismatched_coefficients() {
        let err = ModelArtifact::from_json(
            r#"{"kind": "logistic", "feature_names": ["a", "b"], "coefficients": [1.0], "intercept": 0.0}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("1 coefficients for 2 features"));
    }

    #[test]
    fn test_predict_without_model_is_unavailable() {
        assert!(matches!(
            predict(&[1.0], None),
            Err(CoreError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_predict_passes_through() {
        let model = ModelArtifact::from_json(STUMP_FOREST).unwrap();
        assert_eq!(predict(&[5.0, 95.0], Some(&model)).unwrap(), 1);
    }
}

//! Churn prediction: lenient feature alignment, then the classifier.
//!
//! Missing model features are filled with `0.0` and unknown inputs are
//! ignored. Both are logged at `WARN` since zero-filling can skew the label
//! for sparse inputs.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use churnwise_core::classifier;
use churnwise_core::features::align;
use churnwise_core::CoreError;

use crate::config::Config;
use crate::context::AppContext;
use crate::error::ServiceResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub features: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub churn_prediction: u8,
}

pub fn predict_churn(ctx: &AppContext, features: &HashMap<String, f64>) -> ServiceResult<PredictResponse> {
    let Some(model) = ctx.model.classifier() else {
        let reason = ctx.model.reason().unwrap_or("Model is not loaded");
        return Err(CoreError::ModelUnavailable(reason.to_string()).into());
    };

    tracing::info!(received = features.len(), "Prediction request received");

    let alignment = align(features, model.feature_names());
    if !alignment.missing.is_empty() {
        tracing::warn!(
            missing = ?alignment.missing,
            "Zero-filled {} of {} model features",
            alignment.missing.len(),
            model.feature_names().len()
        );
    }
    if !alignment.ignored.is_empty() {
        tracing::warn!(ignored = ?alignment.ignored, "Ignored features unknown to the model");
    }

    let label = classifier::predict(&alignment.values, Some(model))?;
    tracing::info!(label, "Prediction complete");

    Ok(PredictResponse {
        churn_prediction: label,
    })
}

/// Parse a `name=value` pair for `--feature` arguments.
pub fn parse_feature(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid NAME=VALUE: no '=' found in '{}'", s))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid value for '{}': '{}'", name, value))?;
    Ok((name.trim().to_string(), value))
}

/// CLI entry point.
pub fn run_predict(config: &Config, features: Vec<(String, f64)>) -> Result<()> {
    let ctx = AppContext::load(config)?;
    let features: HashMap<String, f64> = features.into_iter().collect();
    let out = predict_churn(&ctx, &features)?;
    println!("churn_prediction: {}", out.churn_prediction);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feature() {
        assert_eq!(parse_feature("tenure=12").unwrap(), ("tenure".to_string(), 12.0));
        assert_eq!(
            parse_feature("MonthlyCharges = 70.5").unwrap(),
            ("MonthlyCharges".to_string(), 70.5)
        );
        assert!(parse_feature("tenure").is_err());
        assert!(parse_feature("tenure=abc").is_err());
    }
}

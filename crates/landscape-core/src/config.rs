//! Pipeline configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::embed::{DistanceMetric, MdsParams};
use crate::error::{LandscapeError, Result};
use crate::features::{lecture_fields, validate_fields, FieldConfig};
use crate::landmark::LandmarkConfig;
use crate::reduce::ReductionParams;

/// Every knob of a landscape run. All keys are optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LandscapeConfig {
    /// SVD power iterations and k-means rounds
    pub iterations: usize,
    /// Embedded neighbours averaged per document
    pub convex_n: usize,
    pub cluster_count: usize,
    /// Corpora up to this size skip clustering
    pub dense_threshold: usize,
    pub mds_max_steps: usize,
    pub mds_max_seconds: f64,
    pub mds_tolerance: f64,
    pub mds_metric: DistanceMetric,
    /// Share of singular-value mass kept for the embedding
    pub energy_ratio: f64,
    /// Fixed seed for reproducible layouts
    pub seed: Option<u64>,
    pub fields: Vec<FieldConfig>,
    pub landmarks: LandmarkConfig,
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            iterations: 2,
            convex_n: 3,
            cluster_count: 200,
            dense_threshold: 200,
            mds_max_steps: 3000,
            mds_max_seconds: 2.0,
            mds_tolerance: 1e-3,
            mds_metric: DistanceMetric::Cosine,
            energy_ratio: 0.8,
            seed: None,
            fields: lecture_fields(),
            landmarks: LandmarkConfig::default(),
        }
    }
}

impl LandscapeConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LandscapeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LandscapeError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(LandscapeError::InvalidConfig(msg));

        if self.convex_n == 0 {
            return invalid("convexN must be at least 1".to_string());
        }
        if self.cluster_count == 0 {
            return invalid("clusterCount must be at least 1".to_string());
        }
        if !(self.mds_max_seconds.is_finite() && self.mds_max_seconds >= 0.0) {
            return invalid(format!("mdsMaxSeconds must be >= 0, got {}", self.mds_max_seconds));
        }
        if !(self.mds_tolerance.is_finite() && self.mds_tolerance >= 0.0) {
            return invalid(format!("mdsTolerance must be >= 0, got {}", self.mds_tolerance));
        }
        if !(self.energy_ratio > 0.0 && self.energy_ratio <= 1.0) {
            return invalid(format!("energyRatio must be in (0, 1], got {}", self.energy_ratio));
        }
        validate_fields(&self.fields)?;
        self.landmarks.validate()
    }

    pub fn mds_params(&self) -> MdsParams {
        MdsParams {
            max_steps: self.mds_max_steps,
            max_duration: Duration::try_from_secs_f64(self.mds_max_seconds).unwrap_or(Duration::ZERO),
            tolerance: self.mds_tolerance,
            metric: self.mds_metric,
        }
    }

    pub fn reduction_params(&self, seed: u64) -> ReductionParams {
        ReductionParams {
            iterations: self.iterations,
            dense_threshold: self.dense_threshold,
            cluster_count: self.cluster_count,
            seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::TextField;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = LandscapeConfig::default();
        assert_eq!(config.iterations, 2);
        assert_eq!(config.convex_n, 3);
        assert_eq!(config.cluster_count, 200);
        assert_eq!(config.dense_threshold, 200);
        assert_eq!(config.mds_params(), MdsParams::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = LandscapeConfig::from_json_str(
            r#"{"convexN": 5, "mdsMetric": "euclidean", "seed": 7, "landmarks": {"topK": 1}}"#,
        )
        .unwrap();
        assert_eq!(config.convex_n, 5);
        assert_eq!(config.mds_metric, DistanceMetric::Euclidean);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.landmarks.top_k, 1);
        assert_eq!(config.landmarks.number_of_landmarks, 400);
        assert_eq!(config.dense_threshold, 200);
    }

    #[test]
    fn fields_are_configurable() {
        let config = LandscapeConfig::from_json_str(
            r#"{"fields": [{"field": "title"}, {"field": "categories", "tokenizer": {"type": "phrase"}}]}"#,
        )
        .unwrap();
        assert_eq!(config.fields.len(), 2);
        assert_eq!(config.fields[0].field, TextField::Title);
    }

    #[test]
    fn invalid_values_are_input_errors() {
        for json in [
            r#"{"convexN": 0}"#,
            r#"{"energyRatio": 1.5}"#,
            r#"{"mdsMaxSeconds": -1}"#,
            r#"{"fields": []}"#,
            r#"{"landmarks": {"radius": 0}}"#,
            r#"{"iterations": "two"}"#,
        ] {
            let err = LandscapeConfig::from_json_str(json).unwrap_err();
            assert!(err.is_input_error(), "{} gave {}", json, err);
        }
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"clusterCount": 50}}"#).unwrap();
        let config = LandscapeConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.cluster_count, 50);

        assert!(LandscapeConfig::from_json_file("/definitely/not/here.json").is_err());
    }
}

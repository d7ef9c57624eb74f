//! Model configuration.
//!
//! `ItemCfConfig` is plain data: it can be built with the `with_*` methods
//! or deserialized, and it is checked by `validate` before training starts.

use crate::error::{ItemCfError, Result};
use serde::{Deserialize, Serialize};
use similarity::SimilarityMetric;

/// What the model predicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Explicit ratings: weighted average of neighbor ratings, optionally bias-corrected
    #[default]
    Rating,
    /// Implicit signals: sum of neighbor similarities
    Ranking,
}

/// Baseline (bias) estimator and its hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum BaselineConfig {
    /// Alternating closed-form updates of item then user biases
    Als {
        n_epochs: usize,
        reg_user: f32,
        reg_item: f32,
    },
    /// Stochastic gradient descent over all interactions
    Sgd {
        n_epochs: usize,
        learning_rate: f32,
        reg: f32,
    },
}

impl BaselineConfig {
    /// ALS with 10 epochs, user regularization 15, item regularization 10
    pub fn als() -> Self {
        BaselineConfig::Als {
            n_epochs: 10,
            reg_user: 15.0,
            reg_item: 10.0,
        }
    }

    /// SGD with 20 epochs, learning rate 0.005, regularization 0.02
    pub fn sgd() -> Self {
        BaselineConfig::Sgd {
            n_epochs: 20,
            learning_rate: 0.005,
            reg: 0.02,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ItemCfError::InvalidConfiguration(msg));
        match *self {
            BaselineConfig::Als {
                n_epochs,
                reg_user,
                reg_item,
            } => {
                if n_epochs == 0 {
                    return invalid("baseline n_epochs must be positive".to_string());
                }
                for (name, value) in [("reg_user", reg_user), ("reg_item", reg_item)] {
                    if !value.is_finite() || value < 0.0 {
                        return invalid(format!("baseline {name} must be finite and >= 0, got {value}"));
                    }
                }
            }
            BaselineConfig::Sgd {
                n_epochs,
                learning_rate,
                reg,
            } => {
                if n_epochs == 0 {
                    return invalid("baseline n_epochs must be positive".to_string());
                }
                if !learning_rate.is_finite() || learning_rate <= 0.0 {
                    return invalid(format!(
                        "baseline learning_rate must be finite and > 0, got {learning_rate}"
                    ));
                }
                if !reg.is_finite() || reg < 0.0 {
                    return invalid(format!("baseline reg must be finite and >= 0, got {reg}"));
                }
            }
        }
        Ok(())
    }
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self::als()
    }
}

/// Everything the model needs to know before training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemCfConfig {
    /// Similarity algorithm (default: pearson)
    pub metric: SimilarityMetric,
    /// Neighborhood size (default: 50)
    pub k: usize,
    /// Minimum number of co-rating users for a pair to count (default: 1)
    pub min_support: u32,
    /// Bias-correct rating predictions (default: true, rating task only)
    pub use_baseline: bool,
    pub task: Task,
    pub baseline: BaselineConfig,
}

impl Default for ItemCfConfig {
    fn default() -> Self {
        Self {
            metric: SimilarityMetric::Pearson,
            k: 50,
            min_support: 1,
            use_baseline: true,
            task: Task::Rating,
            baseline: BaselineConfig::default(),
        }
    }
}

impl ItemCfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Select the metric by name ("cosine", "pearson", "sparse")
    pub fn with_metric_name(mut self, name: &str) -> Result<Self> {
        self.metric = name.parse()?;
        Ok(self)
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_min_support(mut self, min_support: u32) -> Self {
        self.min_support = min_support;
        self
    }

    pub fn with_baseline(mut self, use_baseline: bool) -> Self {
        self.use_baseline = use_baseline;
        self
    }

    pub fn with_baseline_config(mut self, baseline: BaselineConfig) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.task = task;
        self
    }

    /// Bias terms are only fitted and applied for the rating task
    pub fn uses_baseline(&self) -> bool {
        self.use_baseline && self.task == Task::Rating
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(ItemCfError::InvalidConfiguration(
                "k (neighborhood size) must be positive".to_string(),
            ));
        }
        if self.uses_baseline() {
            self.baseline.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ItemCfConfig::default();
        assert_eq!(config.metric, SimilarityMetric::Pearson);
        assert_eq!(config.k, 50);
        assert_eq!(config.min_support, 1);
        assert!(config.uses_baseline());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ItemCfConfig::new()
            .with_metric(SimilarityMetric::Sparse)
            .with_k(20)
            .with_min_support(3)
            .with_task(Task::Ranking);

        assert_eq!(config.k, 20);
        assert_eq!(config.min_support, 3);
        // Baseline is never used for ranking
        assert!(config.use_baseline);
        assert!(!config.uses_baseline());
    }

    #[test]
    fn test_unsupported_metric_name() {
        let result = ItemCfConfig::new().with_metric_name("euclidean");
        assert!(matches!(result, Err(ItemCfError::InvalidConfiguration(_))));

        let config = ItemCfConfig::new().with_metric_name("cosine").unwrap();
        assert_eq!(config.metric, SimilarityMetric::Cosine);
    }

    #[test]
    fn test_zero_k_rejected() {
        let result = ItemCfConfig::new().with_k(0).validate();
        assert!(matches!(result, Err(ItemCfError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_baseline_validation() {
        let bad_lr = BaselineConfig::Sgd {
            n_epochs: 5,
            learning_rate: 0.0,
            reg: 0.02,
        };
        let config = ItemCfConfig::new().with_baseline_config(bad_lr);
        assert!(config.validate().is_err());

        // Unused baseline settings are not checked
        assert!(config.with_baseline(false).validate().is_ok());

        let bad_reg = BaselineConfig::Als {
            n_epochs: 10,
            reg_user: -1.0,
            reg_item: 10.0,
        };
        assert!(bad_reg.validate().is_err());
        assert!(BaselineConfig::sgd().validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let json = r#"{"metric": "sparse", "k": 10, "task": "ranking"}"#;
        let config: ItemCfConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.metric, SimilarityMetric::Sparse);
        assert_eq!(config.k, 10);
        assert_eq!(config.task, Task::Ranking);
        assert_eq!(config.min_support, 1);

        let json = r#"{"baseline": {"method": "sgd", "n_epochs": 5, "learning_rate": 0.01, "reg": 0.1}}"#;
        let config: ItemCfConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(config.baseline, BaselineConfig::Sgd { n_epochs: 5, .. }));
    }

    #[test]
    fn test_deserialize_unknown_metric_fails() {
        let json = r#"{"metric": "jaccard"}"#;
        assert!(serde_json::from_str::<ItemCfConfig>(json).is_err());
    }
}

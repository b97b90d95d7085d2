//! Конфигурация: расположение файлов и параметры финальной модели

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

pub const RANDOM_STATE: u64 = 42;
pub const TEST_SIZE: f64 = 0.2;
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Все пути пайплайна выводятся из двух каталогов
#[derive(Debug, Clone)]
pub struct PipelinePaths {
    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
}

impl PipelinePaths {
    pub fn new(data_dir: impl Into<PathBuf>, models_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            models_dir: models_dir.into(),
        }
    }

    pub fn raw_dataset(&self) -> PathBuf {
        self.data_dir.join("raw").join("dataset.csv")
    }

    pub fn processed_dataset(&self) -> PathBuf {
        self.data_dir.join("processed").join("dataset_model_ready.csv")
    }

    pub fn x_train(&self) -> PathBuf {
        self.data_dir.join("train").join("X_train.csv")
    }

    pub fn y_train(&self) -> PathBuf {
        self.data_dir.join("train").join("y_train.csv")
    }

    pub fn x_test(&self) -> PathBuf {
        self.data_dir.join("test").join("X_test.csv")
    }

    pub fn y_test(&self) -> PathBuf {
        self.data_dir.join("test").join("y_test.csv")
    }

    pub fn model_artifact(&self, file_name: &str) -> PathBuf {
        self.models_dir.join(file_name)
    }

    pub fn final_model(&self) -> PathBuf {
        self.models_dir.join("final_model.json")
    }

    pub fn model_config(&self) -> PathBuf {
        self.models_dir.join("model_config.yaml")
    }

    pub fn final_metrics(&self) -> PathBuf {
        self.models_dir.join("final_model_metrics.csv")
    }

    pub fn candidate_metrics(&self) -> PathBuf {
        self.models_dir.join("candidate_models_metrics.csv")
    }
}

impl Default for PipelinePaths {
    fn default() -> Self {
        Self::new("data", "models")
    }
}

/// Описание финальной модели (models/model_config.yaml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_name: String,
    pub kernel: String,
    pub class_weight: String,
    pub scaler: String,
    pub random_state: u64,
    pub train_size: usize,
    pub test_size: usize,
    pub features: Vec<String>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Порог решения - вероятность, т.е. значение из [0, 1]
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(PipelineError::InvalidInput(format!(
            "threshold must be within [0, 1], got {threshold}"
        )))
    }
}

impl ModelConfig {
    pub fn for_svm(features: Vec<String>, train_size: usize, test_size: usize, threshold: f64) -> Self {
        Self {
            model_name: "SVM".to_string(),
            kernel: "rbf".to_string(),
            class_weight: "balanced".to_string(),
            scaler: "StandardScaler".to_string(),
            random_state: RANDOM_STATE,
            train_size,
            test_size,
            features,
            threshold,
            trained_at: Some(Utc::now()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let config: ModelConfig = serde_yaml::from_str(&content)?;
        if config.features.is_empty() {
            return Err(PipelineError::InvalidInput(format!(
                "{} lists no features",
                path.display()
            )));
        }
        validate_threshold(config.threshold)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).map_err(|e| PipelineError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_layout() {
        let paths = PipelinePaths::default();
        assert_eq!(paths.raw_dataset(), PathBuf::from("data/raw/dataset.csv"));
        assert_eq!(paths.x_test(), PathBuf::from("data/test/X_test.csv"));
        assert_eq!(paths.model_config(), PathBuf::from("models/model_config.yaml"));
    }

    #[test]
    fn config_roundtrip_through_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("model_config.yaml");
        let config = ModelConfig::for_svm(vec!["Ingresos".to_string(), "Solvencia".to_string()], 80, 20, 0.5);

        config.save(&path).unwrap();
        let loaded = ModelConfig::load(&path).unwrap();

        assert_eq!(loaded, config);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("model_name: SVM"));
        assert!(text.contains("- Solvencia"));
    }

    #[test]
    fn legacy_config_without_threshold_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_config.yaml");
        std::fs::write(
            &path,
            "class_weight: balanced\nfeatures:\n- Ingresos\nkernel: rbf\nmodel_name: SVM\n\
             random_state: 42\nscaler: StandardScaler\ntest_size: 20\ntrain_size: 80\n",
        )
        .unwrap();

        let config = ModelConfig::load(&path).unwrap();
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.trained_at, None);
    }

    #[test]
    fn empty_feature_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_config.yaml");
        let config = ModelConfig::for_svm(Vec::new(), 1, 1, 0.5);
        config.save(&path).unwrap();

        assert!(ModelConfig::load(&path).is_err());
    }
}

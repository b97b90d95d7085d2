//! Ошибки пайплайна

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Target has a single class ({0}), both classes are required")]
    SingleClass(usize),

    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("Model fit failed for {model}: {reason}")]
    Fit { model: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PipelineError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn fit(model: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fit {
            model: model.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

//! Этап train: разделение, обучение кандидатов, сохранение финальной модели

use ndarray::Axis;

use crate::config::{validate_threshold, ModelConfig, PipelinePaths, RANDOM_STATE, TEST_SIZE};
use crate::error::{PipelineError, Result};
use crate::io::{self, FeatureFrame};
use crate::models::{Candidate, RiskModel};
use crate::preprocessing::stratified_split;

#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub features: Vec<String>,
    pub train_size: usize,
    pub test_size: usize,
    pub fitted: Vec<Candidate>,
    pub skipped: Vec<(Candidate, String)>,
}

/// Модели не принимают NaN/inf: сообщаем, в каких колонках они есть
pub fn ensure_finite(frame: &FeatureFrame) -> Result<()> {
    let bad: Vec<String> = frame
        .columns
        .iter()
        .zip(frame.values.axis_iter(Axis(1)))
        .filter_map(|(name, column)| {
            let count = column.iter().filter(|v| !v.is_finite()).count();
            (count > 0).then(|| format!("{name} ({count})"))
        })
        .collect();

    if bad.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::InvalidInput(format!(
            "non-finite feature values: {}",
            bad.join(", ")
        )))
    }
}

pub fn run(paths: &PipelinePaths, threshold: f64) -> Result<TrainingSummary> {
    validate_threshold(threshold)?;

    let data_path = paths.processed_dataset();
    tracing::info!("Loading processed dataset from {}", data_path.display());
    let (frame, y) = io::read_dataset(&data_path)?;
    if frame.nrows() == 0 {
        return Err(PipelineError::EmptyDataset(data_path.display().to_string()));
    }
    ensure_finite(&frame)?;
    tracing::info!("Features used: {}", frame.columns.len());

    // Train / test split
    let labels = y.to_vec();
    let split = stratified_split(&labels, TEST_SIZE, RANDOM_STATE)?;
    let x_train = frame.select_rows(&split.train);
    let x_test = frame.select_rows(&split.test);
    let y_train = y.select(Axis(0), &split.train);
    let y_test = y.select(Axis(0), &split.test);

    io::write_frame(&paths.x_train(), &x_train)?;
    io::write_labels(&paths.y_train(), &y_train)?;
    io::write_frame(&paths.x_test(), &x_test)?;
    io::write_labels(&paths.y_test(), &y_test)?;
    tracing::info!("Train/test saved: {} / {} rows", x_train.nrows(), x_test.nrows());

    let mut fitted = Vec::new();
    let mut skipped = Vec::new();
    let mut final_model: Option<RiskModel> = None;

    for candidate in Candidate::ALL {
        tracing::info!("Training {}", candidate.name());
        match candidate.fit(&x_train.values, &y_train) {
            Ok(model) => {
                model.save(&paths.model_artifact(candidate.file_name()))?;
                fitted.push(candidate);
                if candidate == Candidate::Svm {
                    final_model = Some(model);
                }
            }
            // SVM - финальная модель, без нее продолжать нельзя
            Err(e) if candidate == Candidate::Svm => return Err(e),
            Err(e) => {
                tracing::warn!("Training {} failed: {}", candidate.name(), e);
                skipped.push((candidate, e.to_string()));
            }
        }
    }

    let final_model = final_model.ok_or_else(|| PipelineError::fit("SVM", "no model produced"))?;
    final_model.save(&paths.final_model())?;
    tracing::info!("Final model (SVM) saved to {}", paths.final_model().display());

    let config = ModelConfig::for_svm(frame.columns.clone(), x_train.nrows(), x_test.nrows(), threshold);
    config.save(&paths.model_config())?;
    tracing::info!("Model config saved to {}", paths.model_config().display());

    Ok(TrainingSummary {
        features: frame.columns,
        train_size: x_train.nrows(),
        test_size: x_test.nrows(),
        fitted,
        skipped,
    })
}

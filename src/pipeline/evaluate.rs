//! Этап evaluate: метрики финальной модели и сравнение кандидатов

use ndarray::Array1;

use crate::config::{ModelConfig, PipelinePaths};
use crate::error::Result;
use crate::io::{self, FeatureFrame};
use crate::metrics::Evaluation;
use crate::models::{Candidate, RiskModel};
use crate::types::{CandidateMetricsRow, MetricsRow};

pub fn score(model: &RiskModel, x: &FeatureFrame, y: &Array1<usize>, threshold: f64) -> Result<Evaluation> {
    let proba = model.predict_proba(&x.values)?;
    let pred = proba.mapv(|p| (p >= threshold) as usize);
    Evaluation::compute(y, &pred, &proba)
}

pub fn run(paths: &PipelinePaths) -> Result<MetricsRow> {
    let config = ModelConfig::load(&paths.model_config())?;

    // Тестовая выборка приводится к списку признаков модели
    let x_test = io::read_frame(&paths.x_test(), &[])?.align(&config.features);
    let y_test = io::read_labels(&paths.y_test())?;

    let model = RiskModel::load(&paths.final_model())?;
    let evaluation = score(&model, &x_test, &y_test, config.threshold)?;

    println!("\n--- Classification Report ---");
    println!("{}", evaluation.report);
    println!("ROC AUC: {:.4}", evaluation.roc_auc);
    println!("\n--- Confusion Matrix ---");
    println!("{}", evaluation.confusion);

    let metrics = evaluation.summary();
    io::write_records(&paths.final_metrics(), &[metrics])?;
    tracing::info!("Metrics saved to {}", paths.final_metrics().display());

    let candidates = compare_candidates(paths, &x_test, &y_test, config.threshold);
    if !candidates.is_empty() {
        io::write_records(&paths.candidate_metrics(), &candidates)?;
        tracing::info!(
            "Candidate comparison ({} models) saved to {}",
            candidates.len(),
            paths.candidate_metrics().display()
        );
    }

    Ok(metrics)
}

/// Оценивает все сохраненные кандидаты; отсутствующие и сломанные пропускаются
pub fn compare_candidates(
    paths: &PipelinePaths,
    x_test: &FeatureFrame,
    y_test: &Array1<usize>,
    threshold: f64,
) -> Vec<CandidateMetricsRow> {
    let mut rows = Vec::new();
    for candidate in Candidate::ALL {
        let path = paths.model_artifact(candidate.file_name());
        if !path.exists() {
            continue;
        }

        let result = RiskModel::load(&path).and_then(|model| score(&model, x_test, y_test, threshold));
        match result {
            Ok(evaluation) => {
                let metrics = evaluation.summary();
                tracing::info!(
                    "{}: ROC AUC {:.4}, F1 {:.4}",
                    candidate.name(),
                    metrics.roc_auc,
                    metrics.f1
                );
                rows.push(CandidateMetricsRow::new(candidate.name(), metrics));
            }
            Err(e) => tracing::warn!("Skipping {}: {}", candidate.name(), e),
        }
    }
    rows
}

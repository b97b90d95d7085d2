//! Этап prepare: сырые данные -> датасет, готовый к обучению

use std::path::Path;

use crate::config::PipelinePaths;
use crate::error::{PipelineError, Result};
use crate::io;
use crate::preprocessing::{FeatureEngineer, Imputer};
use crate::types::{LabelThresholds, Observation, ProcessedObservation, RawObservation};

pub fn load_raw(path: &Path) -> Result<Vec<Observation>> {
    let raw: Vec<RawObservation> = io::read_records(path)?;
    if raw.is_empty() {
        return Err(PipelineError::EmptyDataset(path.display().to_string()));
    }
    Ok(raw.into_iter().map(Observation::from).collect())
}

/// Убирает идентификаторы, которые не участвуют в обучении
pub fn prepare_dataset(rows: &[Observation]) -> Vec<ProcessedObservation> {
    rows.iter().map(ProcessedObservation::from).collect()
}

/// Импутация, признаки и метка над уже загруженными строками
pub fn process(rows: &mut [Observation]) -> (LabelThresholds, Vec<ProcessedObservation>) {
    Imputer::clean_and_impute(rows);
    FeatureEngineer::add_ratio_features(rows);
    let thresholds = FeatureEngineer::create_target(rows);
    (thresholds, prepare_dataset(rows))
}

pub fn run(paths: &PipelinePaths) -> Result<LabelThresholds> {
    let raw_path = paths.raw_dataset();
    tracing::info!("Loading raw dataset from {}", raw_path.display());
    let mut rows = load_raw(&raw_path)?;

    let (thresholds, processed) = process(&mut rows);

    let out_path = paths.processed_dataset();
    io::write_records(&out_path, &processed)?;
    tracing::info!("Processed dataset saved: {} rows -> {}", processed.len(), out_path.display());

    Ok(thresholds)
}

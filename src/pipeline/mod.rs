//! Этапы пакетного пайплайна: prepare -> train -> evaluate

pub mod evaluate;
pub mod prepare;
pub mod train;

use crate::config::PipelinePaths;
use crate::error::Result;
use crate::types::MetricsRow;

/// Все три этапа подряд
pub fn run_all(paths: &PipelinePaths, threshold: f64) -> Result<MetricsRow> {
    prepare::run(paths)?;
    train::run(paths, threshold)?;
    evaluate::run(paths)
}

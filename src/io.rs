//! Чтение и запись плоских файлов (CSV)

use std::fs::{self, File};
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::types::{NON_FEATURES, TARGET};

/// Числовая таблица признаков с именами колонок
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    pub columns: Vec<String>,
    pub values: Array2<f64>,
}

impl FeatureFrame {
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    /// Приводит таблицу к списку признаков модели: порядок как в `features`,
    /// отсутствующие колонки заполняются 0.0, лишние отбрасываются.
    pub fn align(&self, features: &[String]) -> FeatureFrame {
        let mut values = Array2::zeros((self.nrows(), features.len()));
        for (j, feature) in features.iter().enumerate() {
            if let Some(src) = self.columns.iter().position(|c| c == feature) {
                values.column_mut(j).assign(&self.values.column(src));
            }
        }
        FeatureFrame {
            columns: features.to_vec(),
            values,
        }
    }

    pub fn select_rows(&self, indices: &[usize]) -> FeatureFrame {
        FeatureFrame {
            columns: self.columns.clone(),
            values: self.values.select(ndarray::Axis(0), indices),
        }
    }
}

fn parse_number(raw: &str, column: &str, line: usize) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse::<f64>().map_err(|_| {
        PipelineError::InvalidInput(format!(
            "line {line}: column {column} has non-numeric value '{trimmed}'"
        ))
    })
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn create_writer(path: &Path) -> Result<csv::Writer<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
    }
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(csv::Writer::from_writer(file))
}

/// Читает типизированные строки
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = open_reader(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Записывает типизированные строки с заголовком
pub fn write_records<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = create_writer(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))?;
    Ok(())
}

/// Читает числовую таблицу, пропуская колонки из `skip`
pub fn read_frame(path: &Path, skip: &[&str]) -> Result<FeatureFrame> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers()?.clone();

    let kept: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !skip.contains(name))
        .map(|(i, name)| (i, name.to_string()))
        .collect();

    let mut data = Vec::new();
    let mut n_rows = 0usize;
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        for (i, name) in &kept {
            let raw = record.get(*i).unwrap_or("");
            data.push(parse_number(raw, name, row_idx + 2)?);
        }
        n_rows += 1;
    }

    let values = Array2::from_shape_vec((n_rows, kept.len()), data)
        .map_err(|e| PipelineError::Shape(e.to_string()))?;

    Ok(FeatureFrame {
        columns: kept.into_iter().map(|(_, name)| name).collect(),
        values,
    })
}

pub fn write_frame(path: &Path, frame: &FeatureFrame) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record(&frame.columns)?;
    for row in frame.values.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))?;
    Ok(())
}

/// Читает обработанный датасет: признаки (все колонки кроме служебных) и метку
pub fn read_dataset(path: &Path) -> Result<(FeatureFrame, Array1<usize>)> {
    let target = read_labels_column(path, TARGET)?;
    let features = read_frame(path, &NON_FEATURES)?;
    Ok((features, target))
}

fn read_labels_column(path: &Path, column: &str) -> Result<Array1<usize>> {
    let mut reader = open_reader(path)?;
    let idx = reader
        .headers()?
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| PipelineError::MissingColumn(column.to_string()))?;

    let mut labels = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = row_idx + 2;
        let label = match parse_number(record.get(idx).unwrap_or(""), column, line)? {
            v if v == 0.0 => 0,
            v if v == 1.0 => 1,
            other => {
                return Err(PipelineError::InvalidInput(format!(
                    "line {line}: {column} must be 0 or 1, got {other}"
                )))
            }
        };
        labels.push(label);
    }

    Ok(Array1::from(labels))
}

/// Читает файл меток (y_train.csv / y_test.csv)
pub fn read_labels(path: &Path) -> Result<Array1<usize>> {
    read_labels_column(path, TARGET)
}

pub fn write_labels(path: &Path, labels: &Array1<usize>) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record([TARGET])?;
    for label in labels.iter() {
        writer.write_record([label.to_string()])?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))?;
    Ok(())
}

//! Стандартизация признаков (StandardScaler)

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(X: &Array2<f64>) -> Result<Self> {
        if X.nrows() == 0 {
            return Err(PipelineError::EmptyDataset("scaler fit".to_string()));
        }

        // Среднее и стандартное отклонение (ddof = 0) по каждому признаку
        let mean = X
            .mean_axis(Axis(0))
            .ok_or_else(|| PipelineError::EmptyDataset("scaler mean".to_string()))?;
        let mut std = X.std_axis(Axis(0), 0.0);

        // Избегаем деления на ноль
        for val in std.iter_mut() {
            if *val < 1e-10 {
                *val = 1.0;
            }
        }

        Ok(Self { mean, std })
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        if X.ncols() != self.mean.len() {
            return Err(PipelineError::Shape(format!(
                "scaler fitted on {} features, got {}",
                self.mean.len(),
                X.ncols()
            )));
        }

        // (X - mean) / std
        Ok((X - &self.mean) / &self.std)
    }

    pub fn fit_transform(X: &Array2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(X)?;
        let scaled = scaler.transform(X)?;
        Ok((scaler, scaled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn standardises_each_column() {
        let X = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let (_, scaled) = StandardScaler::fit_transform(&X).unwrap();

        let mean = scaled.mean_axis(Axis(0)).unwrap();
        assert!(mean[0].abs() < 1e-12);
        assert!((scaled.std_axis(Axis(0), 0.0)[0] - 1.0).abs() < 1e-12);
        // Константный столбец: std заменено на 1
        assert_eq!(scaled[[0, 1]], 0.0);
    }

    #[test]
    fn rejects_wrong_width() {
        let scaler = StandardScaler::fit(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert!(scaler.transform(&array![[1.0, 2.0, 3.0]]).is_err());
    }

    #[test]
    fn rejects_empty_fit() {
        assert!(StandardScaler::fit(&Array2::zeros((0, 3))).is_err());
    }
}

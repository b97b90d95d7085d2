//! Логистическая регрессия (linfa-logistic)

#![allow(non_snake_case)]

use linfa::prelude::*;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::balance_by_replication;
use crate::error::{PipelineError, Result};
use crate::preprocessing::StandardScaler;

#[derive(Debug, Clone, Copy)]
pub struct LogisticParams {
    pub scaled: bool,
    pub balanced: bool,
    pub max_iterations: u64,
}

#[derive(Serialize, Deserialize)]
pub struct LogisticModel {
    scaler: Option<StandardScaler>,
    model: FittedLogisticRegression<f64, usize>,
}

impl LogisticModel {
    pub fn fit(X: &Array2<f64>, y: &Array1<usize>, params: LogisticParams) -> Result<Self> {
        let scaler = if params.scaled {
            Some(StandardScaler::fit(X)?)
        } else {
            None
        };
        let X = match &scaler {
            Some(s) => s.transform(X)?,
            None => X.clone(),
        };

        // linfa-logistic не поддерживает веса: балансируем дублированием меньшего класса
        let (X, y) = if params.balanced {
            balance_by_replication(&X, y)
        } else {
            (X, y.clone())
        };

        let dataset = Dataset::new(X, y);
        let model = LogisticRegression::default()
            .max_iterations(params.max_iterations)
            .fit(&dataset)
            .map_err(|e| PipelineError::fit("logistic regression", e))?;

        Ok(Self { scaler, model })
    }

    /// Вероятность класса 1. linfa считает положительным больший класс
    /// (при равенстве - первый встреченный), поэтому иногда нужно 1 - p.
    pub fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        let X = match &self.scaler {
            Some(s) => s.transform(X)?,
            None => X.clone(),
        };
        let proba = self.model.predict_probabilities(&X);
        if self.model.labels().pos.class == 1 {
            Ok(proba)
        } else {
            Ok(proba.mapv(|p| 1.0 - p))
        }
    }
}

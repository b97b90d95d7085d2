//! SVM с RBF-ядром и вероятностями Платта (linfa-svm)

#![allow(non_snake_case)]

use linfa::dataset::Pr;
use linfa::prelude::*;
use linfa_svm::Svm;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::class_weights;
use crate::error::{PipelineError, Result};
use crate::preprocessing::StandardScaler;

#[derive(Serialize, Deserialize)]
pub struct SvmModel {
    scaler: StandardScaler,
    svm: Svm<f64, Pr>,
}

impl SvmModel {
    /// gamma = 1 / (n_features * var(X)) после стандартизации,
    /// в linfa ядро exp(-|a-b|^2 / eps), т.е. eps = 1 / gamma
    pub fn fit(X: &Array2<f64>, y: &Array1<usize>, balanced: bool) -> Result<Self> {
        let (scaler, X_scaled) = StandardScaler::fit_transform(X)?;

        let n_values = X_scaled.len().max(1) as f64;
        let mean = X_scaled.sum() / n_values;
        let variance = X_scaled.mapv(|v| (v - mean).powi(2)).sum() / n_values;
        let eps = if variance > 0.0 {
            X_scaled.ncols() as f64 * variance
        } else {
            1.0
        };

        let (w_neg, w_pos) = if balanced { class_weights(y) } else { (1.0, 1.0) };
        let targets = y.mapv(|label| label == 1);
        let dataset = Dataset::new(X_scaled, targets);

        let svm = Svm::<f64, Pr>::params()
            .pos_neg_weights(w_pos, w_neg)
            .gaussian_kernel(eps)
            .fit(&dataset)
            .map_err(|e| PipelineError::fit("SVM", e))?;

        tracing::debug!("SVM fitted with {} support vectors", svm.nsupport());

        Ok(Self { scaler, svm })
    }

    pub fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        let X_scaled = self.scaler.transform(X)?;
        let probs: Array1<Pr> = self.svm.predict(&X_scaled);
        Ok(probs.mapv(|p| *p as f64))
    }
}

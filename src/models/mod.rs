//! ML модели

#![allow(non_snake_case)]

pub mod logistic;
pub mod svm;
pub mod tree;

use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::config::RANDOM_STATE;
use crate::error::{PipelineError, Result};

pub use logistic::{LogisticModel, LogisticParams};
pub use svm::SvmModel;
pub use tree::{ForestModel, ForestParams, TreeModel, TreeParams};

/// Веса классов "balanced": n / (2 * n_c). Возвращает (w_0, w_1).
pub fn class_weights(y: &Array1<usize>) -> (f64, f64) {
    let n = y.len() as f64;
    let n_pos = y.iter().filter(|&&l| l == 1).count() as f64;
    let n_neg = n - n_pos;
    let weight = |count: f64| if count > 0.0 { n / (2.0 * count) } else { 1.0 };
    (weight(n_neg), weight(n_pos))
}

/// Дублирует строки меньшего класса по кругу, пока классы не сравняются
pub fn balance_by_replication(X: &Array2<f64>, y: &Array1<usize>) -> (Array2<f64>, Array1<usize>) {
    let positives: Vec<usize> = (0..y.len()).filter(|&i| y[i] == 1).collect();
    let negatives: Vec<usize> = (0..y.len()).filter(|&i| y[i] != 1).collect();

    let (minority, majority_len) = if positives.len() < negatives.len() {
        (&positives, negatives.len())
    } else {
        (&negatives, positives.len())
    };

    if minority.is_empty() || minority.len() == majority_len {
        return (X.clone(), y.clone());
    }

    let mut indices: Vec<usize> = (0..y.len()).collect();
    indices.extend(minority.iter().cycle().take(majority_len - minority.len()));

    (X.select(Axis(0), &indices), y.select(Axis(0), &indices))
}

/// Обученная модель, сохраняемая в JSON
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskModel {
    Logistic(LogisticModel),
    DecisionTree(TreeModel),
    RandomForest(ForestModel),
    Svm(SvmModel),
}

impl RiskModel {
    /// Вероятность риска (класс 1) для каждой строки
    pub fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            RiskModel::Logistic(m) => m.predict_proba(X),
            RiskModel::DecisionTree(m) => Ok(m.predict_proba(X)),
            RiskModel::RandomForest(m) => Ok(m.predict_proba(X)),
            RiskModel::Svm(m) => m.predict_proba(X),
        }
    }

    pub fn predict(&self, X: &Array2<f64>, threshold: f64) -> Result<Array1<usize>> {
        Ok(self
            .predict_proba(X)?
            .mapv(|p| (p >= threshold) as usize))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        let json = serde_json::to_string(self)?;
        fs::write(path, json).map_err(|e| PipelineError::io(path, e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Пять кандидатов, обучаемых на этапе train
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    LogRegBaseline,
    LogRegBalanced,
    DecisionTree,
    RandomForest,
    Svm,
}

impl Candidate {
    pub const ALL: [Candidate; 5] = [
        Candidate::LogRegBaseline,
        Candidate::LogRegBalanced,
        Candidate::DecisionTree,
        Candidate::RandomForest,
        Candidate::Svm,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Candidate::LogRegBaseline => "logreg_baseline",
            Candidate::LogRegBalanced => "logreg_balanced",
            Candidate::DecisionTree => "decision_tree",
            Candidate::RandomForest => "random_forest",
            Candidate::Svm => "svm",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Candidate::LogRegBaseline => "trained_model_1_logreg_baseline.json",
            Candidate::LogRegBalanced => "trained_model_2_logreg_balanced.json",
            Candidate::DecisionTree => "trained_model_3_decision_tree.json",
            Candidate::RandomForest => "trained_model_4_random_forest.json",
            Candidate::Svm => "trained_model_5_svm.json",
        }
    }

    pub fn fit(&self, X: &Array2<f64>, y: &Array1<usize>) -> Result<RiskModel> {
        if X.nrows() != y.len() {
            return Err(PipelineError::Shape(format!(
                "{} rows of features for {} labels",
                X.nrows(),
                y.len()
            )));
        }
        if y.iter().all(|&l| l == y[0]) {
            return Err(PipelineError::SingleClass(y.len()));
        }

        let model = match self {
            Candidate::LogRegBaseline => RiskModel::Logistic(LogisticModel::fit(
                X,
                y,
                LogisticParams {
                    scaled: false,
                    balanced: false,
                    max_iterations: 3000,
                },
            )?),
            Candidate::LogRegBalanced => RiskModel::Logistic(LogisticModel::fit(
                X,
                y,
                LogisticParams {
                    scaled: true,
                    balanced: true,
                    max_iterations: 3000,
                },
            )?),
            Candidate::DecisionTree => RiskModel::DecisionTree(TreeModel::fit(
                X,
                y,
                TreeParams {
                    max_depth: 5,
                    min_samples_split: 2.0,
                    min_samples_leaf: 20.0,
                    balanced: true,
                },
            )?),
            Candidate::RandomForest => RiskModel::RandomForest(ForestModel::fit(
                X,
                y,
                ForestParams {
                    n_estimators: 200,
                    tree: TreeParams {
                        max_depth: 5,
                        min_samples_split: 20.0,
                        min_samples_leaf: 10.0,
                        balanced: true,
                    },
                    seed: RANDOM_STATE,
                },
            )?),
            Candidate::Svm => RiskModel::Svm(SvmModel::fit(X, y, true)?),
        };

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Два хорошо разделимых облака в трех признаках
    fn separable(n_per_class: usize) -> (Array2<f64>, Array1<usize>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n_per_class {
            let jitter = (i % 7) as f64 * 0.05;
            rows.extend_from_slice(&[1.0 + jitter, 2.0 - jitter, 0.5 + jitter]);
            labels.push(0);
            rows.extend_from_slice(&[4.0 + jitter, -1.0 - jitter, 3.0 + jitter]);
            labels.push(1);
        }
        (
            Array2::from_shape_vec((2 * n_per_class, 3), rows).unwrap(),
            Array1::from(labels),
        )
    }

    /// Риск - меньший класс: 3 нормальные строки на 1 рискованную
    fn imbalanced(n_positive: usize) -> (Array2<f64>, Array1<usize>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..4 * n_positive {
            let jitter = (i % 5) as f64 * 0.1;
            if i % 4 == 3 {
                rows.extend_from_slice(&[5.0 + jitter, 5.0 - jitter]);
                labels.push(1);
            } else {
                rows.extend_from_slice(&[0.0 + jitter, 0.0 - jitter]);
                labels.push(0);
            }
        }
        (
            Array2::from_shape_vec((4 * n_positive, 2), rows).unwrap(),
            Array1::from(labels),
        )
    }

    fn accuracy(pred: &Array1<usize>, y: &Array1<usize>) -> f64 {
        pred.iter().zip(y.iter()).filter(|(a, b)| a == b).count() as f64 / y.len() as f64
    }

    #[test]
    fn balanced_weights_are_inverse_frequency() {
        let y = array![0, 0, 0, 1];
        let (w0, w1) = class_weights(&y);
        assert!((w0 - 4.0 / 6.0).abs() < 1e-12);
        assert!((w1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn replication_equalises_classes() {
        let X = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let y = array![0, 0, 0, 0, 1];
        let (Xb, yb) = balance_by_replication(&X, &y);

        assert_eq!(yb.len(), 8);
        assert_eq!(yb.iter().filter(|&&l| l == 1).count(), 4);
        assert_eq!(Xb.nrows(), 8);
        assert_eq!(Xb[[7, 0]], 4.0);
    }

    #[test]
    fn single_class_target_is_rejected() {
        let (X, _) = separable(5);
        let y = Array1::zeros(X.nrows());
        let err = Candidate::Svm.fit(&X, &y).err().unwrap();
        assert!(matches!(err, PipelineError::SingleClass(_)));
    }

    #[test]
    fn logistic_candidates_separate_clean_data() {
        let (X, y) = separable(40);
        for candidate in [Candidate::LogRegBaseline, Candidate::LogRegBalanced] {
            let model = candidate.fit(&X, &y).unwrap();
            let pred = model.predict(&X, 0.5).unwrap();
            assert!(accuracy(&pred, &y) > 0.95, "{}", candidate.name());
        }
    }

    #[test]
    fn tree_candidates_separate_clean_data() {
        let (X, y) = separable(40);
        for candidate in [Candidate::DecisionTree, Candidate::RandomForest] {
            let model = candidate.fit(&X, &y).unwrap();
            let proba = model.predict_proba(&X).unwrap();
            assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
            let pred = model.predict(&X, 0.5).unwrap();
            assert!(accuracy(&pred, &y) > 0.9, "{}", candidate.name());
        }
    }

    #[test]
    fn svm_ranks_positive_class_higher() {
        let (X, y) = separable(30);
        let model = Candidate::Svm.fit(&X, &y).unwrap();
        let proba = model.predict_proba(&X).unwrap();

        assert!(proba.iter().all(|p| p.is_finite() && (0.0..=1.0).contains(p)));
        let mean = |class: usize| {
            let values: Vec<f64> = (0..y.len()).filter(|&i| y[i] == class).map(|i| proba[i]).collect();
            values.iter().sum::<f64>() / values.len() as f64
        };
        assert!(mean(1) > mean(0));
    }

    #[test]
    fn every_candidate_scores_minority_class_as_risk() {
        let (X, y) = imbalanced(20);
        let rows = array![[0.2, -0.2], [5.2, 4.8]];

        for candidate in Candidate::ALL {
            let model = candidate.fit(&X, &y).unwrap();
            let proba = model.predict_proba(&rows).unwrap();
            assert!(proba[0] < 0.5, "{}: healthy row scored {}", candidate.name(), proba[0]);
            assert!(proba[1] >= 0.5, "{}: risky row scored {}", candidate.name(), proba[1]);
            assert!(proba[1] > proba[0], "{}", candidate.name());
        }
    }

    #[test]
    fn logistic_probability_follows_class_one_when_classes_tie() {
        // Первой встречается метка 0, классы равны по размеру
        let (X, y) = separable(20);
        assert_eq!(y[0], 0);

        let model = Candidate::LogRegBaseline.fit(&X, &y).unwrap();
        let proba = model.predict_proba(&array![[1.0, 2.0, 0.5], [4.0, -1.0, 3.0]]).unwrap();

        assert!(proba[0] < 0.5);
        assert!(proba[1] > 0.5);
    }

    #[test]
    fn artifact_roundtrip_preserves_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("final_model.json");
        let (X, y) = separable(20);

        let model = Candidate::LogRegBalanced.fit(&X, &y).unwrap();
        model.save(&path).unwrap();
        let loaded = RiskModel::load(&path).unwrap();

        let before = model.predict_proba(&X).unwrap();
        let after = loaded.predict_proba(&X).unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}

//! Дерево решений (linfa-trees) и случайный лес на его основе

#![allow(non_snake_case)]

use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::class_weights;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: f32,
    pub min_samples_leaf: f32,
    pub balanced: bool,
}

fn fit_tree(X: Array2<f64>, y: Array1<usize>, weights: Option<Array1<f32>>, params: &TreeParams) -> Result<DecisionTree<f64, usize>> {
    let mut dataset = Dataset::new(X, y);
    if let Some(weights) = weights {
        dataset = dataset.with_weights(weights);
    }

    // При сбалансированных весах минимумы задаются суммарным весом, а не числом строк
    DecisionTree::params()
        .split_quality(SplitQuality::Gini)
        .max_depth(Some(params.max_depth))
        .min_weight_split(params.min_samples_split)
        .min_weight_leaf(params.min_samples_leaf)
        .fit(&dataset)
        .map_err(|e| PipelineError::fit("decision tree", e))
}

fn sample_weights(y: &Array1<usize>, balanced: bool) -> Option<Array1<f32>> {
    if !balanced {
        return None;
    }
    let (w_neg, w_pos) = class_weights(y);
    Some(y.mapv(|label| if label == 1 { w_pos as f32 } else { w_neg as f32 }))
}

#[derive(Serialize, Deserialize)]
pub struct TreeModel {
    tree: DecisionTree<f64, usize>,
}

impl TreeModel {
    pub fn fit(X: &Array2<f64>, y: &Array1<usize>, params: TreeParams) -> Result<Self> {
        let weights = sample_weights(y, params.balanced);
        let tree = fit_tree(X.clone(), y.clone(), weights, &params)?;
        Ok(Self { tree })
    }

    pub fn predict(&self, X: &Array2<f64>) -> Array1<usize> {
        self.tree.predict(X)
    }

    /// Дерево linfa не отдает доли классов в листьях: вероятность равна метке
    pub fn predict_proba(&self, X: &Array2<f64>) -> Array1<f64> {
        self.predict(X).mapv(|label| label as f64)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub tree: TreeParams,
    pub seed: u64,
}

#[derive(Serialize, Deserialize)]
struct ForestMember {
    features: Vec<usize>,
    tree: DecisionTree<f64, usize>,
}

/// Бэггинг деревьев: bootstrap-выборка строк и случайное подмножество
/// из ceil(sqrt(p)) признаков на каждое дерево
#[derive(Serialize, Deserialize)]
pub struct ForestModel {
    members: Vec<ForestMember>,
}

impl ForestModel {
    pub fn fit(X: &Array2<f64>, y: &Array1<usize>, params: ForestParams) -> Result<Self> {
        let n_samples = X.nrows();
        let n_features = X.ncols();
        if n_samples == 0 || n_features == 0 {
            return Err(PipelineError::EmptyDataset("random forest".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let max_features = ((n_features as f64).sqrt().ceil() as usize).clamp(1, n_features);
        let weights = sample_weights(y, params.tree.balanced);

        let mut members = Vec::with_capacity(params.n_estimators);
        for _ in 0..params.n_estimators {
            let rows: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
            let mut features = sample(&mut rng, n_features, max_features).into_vec();
            features.sort_unstable();

            let X_boot = X.select(Axis(0), &rows).select(Axis(1), &features);
            let y_boot = y.select(Axis(0), &rows);
            let w_boot = weights.as_ref().map(|w| w.select(Axis(0), &rows));

            let tree = fit_tree(X_boot, y_boot, w_boot, &params.tree)?;
            members.push(ForestMember { features, tree });
        }

        tracing::debug!(
            "Random forest fitted: {} trees, {} features per tree",
            members.len(),
            max_features
        );

        Ok(Self { members })
    }

    /// Доля деревьев, проголосовавших за класс 1
    pub fn predict_proba(&self, X: &Array2<f64>) -> Array1<f64> {
        let mut votes = Array1::<f64>::zeros(X.nrows());
        for member in &self.members {
            let subset = X.select(Axis(1), &member.features);
            let labels: Array1<usize> = member.tree.predict(&subset);
            votes += &labels.mapv(|label| label as f64);
        }
        if !self.members.is_empty() {
            votes /= self.members.len() as f64;
        }
        votes
    }
}

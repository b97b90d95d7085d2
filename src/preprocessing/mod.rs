//! Модуль предобработки данных

pub mod feature_engineering;
pub mod imputation;
pub mod normalization;
pub mod split;
pub mod stats;

pub use feature_engineering::FeatureEngineer;
pub use imputation::Imputer;
pub use normalization::StandardScaler;
pub use split::{stratified_split, SplitIndices};

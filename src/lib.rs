//! FinRisk ML - система раннего предупреждения о финансовом ухудшении бизнес-единиц

pub mod config;
pub mod error;
pub mod inference;
pub mod io;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod server;
pub mod types;

pub use config::{ModelConfig, PipelinePaths};
pub use error::{PipelineError, Result};
pub use models::{Candidate, RiskModel};
pub use types::*;

pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub use app::pipeline_use_case::{PipelineRun, PipelineStages, PipelineUseCase};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Unsupported input extension '{0}' (expected csv, tsv or txt)")]
    UnsupportedExtension(String),

    #[error("Input file {} contains no lead rows", .0.display())]
    EmptyInput(PathBuf),

    #[error("No usable lead records remain after cleaning")]
    NoUsableRecords,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Errors caused by the input itself rather than the environment.
    pub fn is_fatal_input(&self) -> bool {
        matches!(
            self,
            PipelineError::InputNotFound(_)
                | PipelineError::UnsupportedExtension(_)
                | PipelineError::EmptyInput(_)
                | PipelineError::NoUsableRecords
        )
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InputNotFound(_) => "input_not_found",
            PipelineError::UnsupportedExtension(_) => "unsupported_extension",
            PipelineError::EmptyInput(_) => "empty_input",
            PipelineError::NoUsableRecords => "no_usable_records",
            PipelineError::Csv(_) => "csv",
            PipelineError::Io(_) => "io",
            PipelineError::Toml(_) => "toml",
            PipelineError::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

//! Batch labelling of card photos with a local vision model
//!
//! A scan job walks one folder of images, asks the analyzer about each image
//! in turn, and stores every card the model is confident enough about.

pub mod analyzer;
pub mod folder;
pub mod jobs;
pub mod ollama;
pub mod processor;

use thiserror::Error;

pub use analyzer::{CardAnalysis, CardImageAnalyzer};
pub use jobs::{JobHandle, ScanJobStore};
pub use ollama::OllamaClient;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llava:latest";

/// Result type alias for scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("No image files found in the specified folder")]
    NoImages,

    #[error("Too many image files in the folder: {0}")]
    TooManyImages(usize),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Ollama not available: {0}")]
    OllamaUnavailable(String),

    #[error("Scan job not found")]
    JobNotFound,
}

//! Chapterline: a resumable web-novel archiver
//!
//! This crate implements a sequential crawler that walks a paginated novel
//! catalog, probes each novel's chapters one by one, and materializes the
//! result as a local, append-only dataset that an interrupted run can
//! resume without re-fetching completed work.

pub mod config;
pub mod crawler;
pub mod genres;
pub mod ids;
pub mod model;
pub mod output;
pub mod state;
pub mod storage;
pub mod text;

use thiserror::Error;

/// Main error type for Chapterline operations
#[derive(Debug, Error)]
pub enum ChapterlineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Chapterline operations
pub type Result<T> = std::result::Result<T, ChapterlineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use genres::GenreRegistry;
pub use ids::{EntityKind, IdGenerator};
pub use state::{CrawlState, NovelProgress};
pub use storage::Archive;

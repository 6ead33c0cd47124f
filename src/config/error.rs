//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid oracle timeout")]
    InvalidTimeout,

    #[error("Invalid oracle poll interval")]
    InvalidPollInterval,
}

/// Errors that can occur while loading or validating a funnel catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read funnel catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse funnel catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog has no funnels")]
    Empty,

    #[error("Duplicate funnel id: {0}")]
    DuplicateFunnel(String),

    #[error("Funnel {funnel}: component {component} references unknown question {question}")]
    UnknownQuestion {
        funnel: String,
        component: String,
        question: String,
    },

    #[error("Funnel {funnel}: component {component} depends on unknown component {dependency}")]
    UnknownDependency {
        funnel: String,
        component: String,
        dependency: String,
    },
}

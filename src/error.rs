//! Error types for world generation

use thiserror::Error;

/// Errors that can occur during world generation or queries
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Generation could not produce a usable partition
    #[error("generation failed: {0}")]
    GenerationFailed(String),
    /// Requested region ID does not exist
    #[error("region not found: {0}")]
    RegionNotFound(usize),
    /// Generation was cancelled between two regions
    #[error("generation cancelled")]
    Cancelled,
}

/// Result type alias for world generation
pub type Result<T> = std::result::Result<T, WorldError>;

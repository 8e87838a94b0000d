//! Error types for voxkit-sp
//!
//! Processing and registry failures are kept separate: pipeline callers
//! handle per-sample outcomes, registry callers handle catalog state.

use thiserror::Error;

/// Sample processing error
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Audio file could not be opened, probed, or decoded
    #[error("Unreadable audio: {0}")]
    UnreadableAudio(String),

    /// No segment of usable voice content was found in the sample
    #[error("No voice activity detected in sample")]
    NoVoiceDetected,

    /// Caller supplied invalid input (bad path, empty clip, bad config)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A processing artifact (report, cleaned clip, segment export) could
    /// not be written
    #[error("Failed to persist artifact: {0}")]
    Persistence(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Speaker registry error
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A speaker with this name is already registered
    #[error("Speaker already exists: {0}")]
    AlreadyExists(String),

    /// No speaker with this name is registered
    #[error("Speaker not found: {0}")]
    NotFound(String),

    /// Speaker name is empty or otherwise unusable as a key
    #[error("Invalid speaker name: {0}")]
    InvalidName(String),

    /// Registry document exists but could not be parsed
    #[error("Registry document is corrupt: {0}")]
    Corrupt(String),

    /// Registry document could not be written
    #[error("Failed to persist registry: {0}")]
    Persistence(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline and analysis operations
pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

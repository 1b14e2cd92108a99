use thiserror::Error;

use crate::shape::ShapeId;

/// Errors raised while running or undoing a command
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    #[error("Need at least {required} shapes, got {actual}")]
    NotEnoughShapes { required: usize, actual: usize },

    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),

    #[error("Shape already in document: {0}")]
    DuplicateShape(ShapeId),
}

/// Result type for command operations
pub type CommandResult<T = ()> = Result<T, CommandError>;

/// Errors that can occur while loading editor configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

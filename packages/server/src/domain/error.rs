//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// ConnectionId validation error
    #[error("ConnectionId cannot be empty")]
    ConnectionIdEmpty,

    /// ConnectionId too long error
    #[error("ConnectionId cannot exceed {max} characters (got {actual})")]
    ConnectionIdTooLong { max: usize, actual: usize },

    /// EndpointName validation error
    #[error("Server must have name")]
    EndpointNameEmpty,
}

/// Errors returned by the connection registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Identity already registered by another active connection
    #[error("Connection '{0}' is already registered")]
    DuplicateConnection(String),

    /// Identity not present in the registry
    #[error("Connection '{0}' not found")]
    ConnectionNotFound(String),
}

//! UseCase layer error definitions.

use thiserror::Error;
use wschat_shared::CodecError;

use crate::domain::{RepositoryError, ValueObjectError};

/// Errors while accepting a new connection
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to generate connection id: {0}")]
    IdGeneration(#[from] ValueObjectError),

    #[error(transparent)]
    Encode(#[from] CodecError),

    #[error("failed to register connection: {0}")]
    Registration(#[from] RepositoryError),
}

/// Errors while re-broadcasting an inbound message
#[derive(Debug, Error)]
pub enum SendMessageError {
    #[error(transparent)]
    Encode(#[from] CodecError),
}

/// Errors while tearing down a connection
#[derive(Debug, Error)]
pub enum DisconnectError {
    #[error("failed to unregister connection: {0}")]
    Unregister(#[from] RepositoryError),

    #[error(transparent)]
    Encode(#[from] CodecError),
}

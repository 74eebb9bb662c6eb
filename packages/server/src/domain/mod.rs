//! Domain layer for the broadcast hub.
//!
//! Connection identities and the registry abstraction live here, independent
//! of the WebSocket transport and of the concrete registry storage.

pub mod error;
pub mod factory;
pub mod repository;
pub mod value_object;

pub use error::{RepositoryError, ValueObjectError};
pub use factory::ConnectionIdFactory;
pub use repository::{ConnectionRepository, OutboundQueue};
pub use value_object::{ConnectionId, EndpointName};

#[cfg(test)]
pub use repository::MockConnectionRepository;

//! WebSocket broadcast hub.
//!
//! Every accepted connection is assigned an identity, announced to all other
//! connections, and from then on every chat message it sends is re-broadcast
//! to every connection with the sender forced to that identity.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

// Re-export entry points
pub use config::ServerConfig;
pub use ui::run as run_server;

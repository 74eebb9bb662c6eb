//! Infrastructure layer: queue, registry storage and endpoint directory.

pub mod directory;
pub mod queue;
pub mod repository;

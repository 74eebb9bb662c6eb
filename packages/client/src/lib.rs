//! Load generator and protocol validation harness for the wschat hub.
//!
//! In load mode every worker connects and sends its messages as fast as it
//! can. In test mode every worker also checks the handshake and that each of
//! its own messages comes back, and the run ends with a report.

pub mod browser;
pub mod config;
pub mod connector;
pub mod error;
pub mod gate;
pub mod load;
pub mod orchestrator;
pub mod report;
pub mod result;
pub mod runner;

mod app;

// Re-export entry points
pub use app::run_client;
pub use config::{HarnessArgs, RunSettings};
pub use error::{ClientError, ConfigError, HarnessError};
pub use orchestrator::Orchestrator;

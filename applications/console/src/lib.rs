//! Chorus Console Library
//!
//! Runs the playback core against a simulated voice transport and a fixed
//! catalog, reading chat commands from a terminal.
//!
//! This library exposes the components for testing purposes.

pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod resolver;
pub mod transport;

// Re-export commonly used types for convenience
pub use commands::Command;
pub use config::{CatalogEntry, ConsoleConfig};
pub use console::{Console, Reply};
pub use error::{ConsoleError, Result};
pub use resolver::CatalogResolver;
pub use transport::SimulatedTransport;

//! Editing session server module.
//!
//! Provides a JSON-RPC 2.0 over STDIO interface that feeds canvas events
//! (drops, connections, drag ends, re-layout, export) into a graph builder.

pub mod commands;
pub mod server;
pub mod types;

pub use commands::{ChartSession, CommandError, METHODS};

//! Configuration management for the terminal client.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! command line arguments and their environment variables.

mod config;

pub use config::*;

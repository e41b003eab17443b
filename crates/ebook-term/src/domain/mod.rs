//! Terminal-side domain logic.
//!
//! Generation state itself lives in the `ebook-client` controller; this module
//! holds what only the terminal needs: input, alerts, key handling and the
//! plumbing between terminal events and controller commands.

pub mod models;
pub mod services;

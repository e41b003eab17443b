//! Mock ebook generation backend
//!
//! Serves the same HTTP surface as the real generator (`POST /api/generate`,
//! `GET /api/logs`, `GET /` and `/static/{file}`) without doing any generation.
//! A `Scenario` controls how long a run takes and whether it fails, and every
//! run writes log lines into an in-memory log so the log tail endpoint has
//! something to return.

pub mod handlers;
pub mod scenario;
pub mod server;

pub use scenario::{BackendLog, Scenario};
pub use server::MockServer;

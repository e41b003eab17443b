//! Client SDK for tracking ebook generation runs against a remote backend
//!
//! The backend does all the real work (search, analysis, images, formatting,
//! PDF assembly, verification) behind two HTTP endpoints and offers no progress
//! channel. This crate owns everything on the client side of that boundary: the
//! wire contract, the HTTP implementation, and the controller that turns a single
//! blocking request into an observable session with simulated progress, merged
//! client/server logs and a bounded wait.

use anyhow::Result;
use async_trait::async_trait;
pub use bytes::Bytes;
pub use reqwest::Url;

pub mod controller;
pub mod errors;
pub mod http_client;
pub mod logs;
pub mod session;
pub mod steps;
pub mod types;

pub use controller::{
    ControllerConfig, ControllerHandle, ControllerState, GenerationController, StartOutcome,
};
pub use errors::{ErrorInfo, ErrorKind, GenerationError};
pub use logs::{LogEntry, LogSource};
pub use session::{Session, SessionStatus};
pub use steps::{StepState, StepStatus, STEP_LABELS};
pub use types::*;

/// EbookBackend trait for talking to the ebook generation service
#[async_trait]
pub trait EbookBackend: Send + Sync {
    /// Run a full generation for a topic and wait for the produced artifact
    async fn generate(&self, request: GenerateRequest)
        -> Result<GenerationResult, GenerationError>;

    /// Fetch the most recent `lines` lines of the backend log
    async fn fetch_logs(&self, lines: usize) -> Result<Vec<String>>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> Result<()>;

    /// Resolve the download URL of a produced artifact
    fn artifact_url(&self, result: &GenerationResult) -> Result<Url>;

    /// Download a produced artifact
    async fn download(&self, result: &GenerationResult) -> Result<Bytes>;
}

pub type EbookBackendBox = Box<dyn EbookBackend>;

/// Factory for creating EbookBackend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create an HTTP backend for a remote server
    pub fn create_http_backend(base_url: &str) -> Result<EbookBackendBox> {
        Ok(Box::new(http_client::HttpEbookBackend::new(base_url)?))
    }
}

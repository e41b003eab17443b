use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{generate, get_logs, get_static, read_root};
use crate::scenario::{BackendLog, Scenario};

pub struct AppState {
    pub scenario: Scenario,
    pub log: BackendLog,
}

pub struct MockServer {
    state: Arc<AppState>,
}

impl MockServer {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            state: Arc::new(AppState {
                scenario,
                log: BackendLog::default(),
            }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(read_root))
            .route("/api/generate", post(generate))
            .route("/api/logs", get(get_logs))
            .route("/static/{filename}", get(get_static))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind `addr` and serve in the background. Returns the bound address, so
    /// port 0 can be used in tests.
    pub async fn spawn(self, addr: &str) -> anyhow::Result<(SocketAddr, JoinHandle<anyhow::Result<()>>)> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let app = self.router();

        tracing::info!("Ebook backend mock listening on {}", local_addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .map_err(|e| anyhow::anyhow!("Mock server error: {}", e))
        });

        Ok((local_addr, handle))
    }

    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let (_, handle) = self.spawn(addr).await?;
        handle.await?
    }
}

use std::sync::Arc;

use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::scenario::artifact_name;
use crate::server::AppState;

const STEPS: [&str; 6] = [
    "Searching the web",
    "Analyzing research data",
    "Generating images",
    "Formatting content",
    "Creating PDF",
    "Verifying PDF",
];

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub lines: Option<usize>,
}

pub async fn read_root() -> impl IntoResponse {
    Json(json!({
        "message": "AI Ebook Generator API. Frontend runs on port 3000."
    }))
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let log = &state.log;
    log.push(
        "INFO",
        &format!("Starting ebook generation for topic: {}", request.topic),
    );

    let pause = state.scenario.duration / STEPS.len() as u32;
    for step in STEPS {
        tokio::time::sleep(pause).await;
        log.push("INFO", step);
    }

    if let Some(detail) = state.scenario.failure.as_ref() {
        log.push("ERROR", &format!("Ebook generation failed: {detail}"));
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": detail })),
        )
            .into_response();
    }

    let filename = artifact_name(&request.topic, log.next_run());
    let content = format!("%PDF-1.4\n% {}\n%%EOF\n", request.topic).into_bytes();
    log.store_artifact(&filename, content);
    log.push(
        "INFO",
        &format!("Ebook generation completed successfully: {filename}"),
    );

    let path_field = state.scenario.path_field.as_deref().unwrap_or("pdf_path");
    let mut body = json!({
        "status": "success",
        "filename": filename,
    });
    body[path_field] = json!(format!("static/{filename}"));

    Json(body).into_response()
}

pub async fn get_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> impl IntoResponse {
    let (lines, total) = state.log.tail(query.lines.unwrap_or(100));
    if total == 0 {
        return Json(json!({ "logs": [], "message": "No logs available yet" }));
    }

    Json(json!({
        "logs": lines,
        "total_lines": total,
        "showing": lines.len(),
    }))
}

pub async fn get_static(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    match state.log.artifact(&filename) {
        Some(content) => ([(header::CONTENT_TYPE, "application/pdf")], content).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

use serde::{Deserialize, Serialize};

/// Fallback message when a failed response carries no readable body
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";
/// Fallback message when a failed response body has no `detail`
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate ebook";

/// Directory the backend serves produced artifacts from
const STATIC_PREFIX: &str = "static";

/// Request body for `POST /api/generate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
}

impl GenerateRequest {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.trim().to_string(),
        }
    }
}

/// A produced ebook, present only on a succeeded session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GenerateResponse")]
pub struct GenerationResult {
    pub filename: String,
    pub download_path: String,
}

impl GenerationResult {
    pub fn new(filename: &str, download_path: &str) -> Self {
        Self {
            filename: filename.to_string(),
            download_path: download_path.to_string(),
        }
    }
}

/// Success body as sent by the backend. Deployed backends disagree on the name
/// of the path field, so each spelling is read on its own and `pdf_path` wins
/// when a body carries both.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    filename: String,
    #[serde(default)]
    pdf_path: Option<String>,
    #[serde(default, alias = "downloadPath")]
    download_path: Option<String>,
}

impl From<GenerateResponse> for GenerationResult {
    fn from(raw: GenerateResponse) -> Self {
        let download_path = [raw.pdf_path, raw.download_path]
            .into_iter()
            .flatten()
            .find(|path| !path.trim().is_empty())
            .unwrap_or_else(|| format!("{STATIC_PREFIX}/{}", raw.filename));

        Self {
            filename: raw.filename,
            download_path,
        }
    }
}

/// Error body of a non-2xx response
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Pick the user-facing message out of a raw error body
    pub fn message_from(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                detail: Some(detail),
            }) if !detail.is_empty() => detail,
            Ok(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            Err(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Response body of `GET /api/logs`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_lines: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showing: Option<usize>,
}

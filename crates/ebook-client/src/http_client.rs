use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;

use crate::errors::GenerationError;
use crate::types::{ErrorBody, GenerateRequest, GenerationResult, LogsResponse};
use crate::EbookBackend;

/// HTTP client for a remote ebook generation backend
pub struct HttpEbookBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpEbookBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("Invalid backend URL '{base_url}'"))?;

        // Relative paths join onto the last segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

#[async_trait]
impl EbookBackend for HttpEbookBackend {
    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let generate_url = self
            .endpoint("api/generate")
            .map_err(|err| GenerationError::Network(err.to_string()))?;

        tracing::debug!(url = %generate_url, topic = %request.topic, "sending generation request");

        let response = self
            .client
            .post(generate_url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = ErrorBody::message_from(&body);
            tracing::error!(status = status.as_u16(), message = %message, "generation request failed");
            return Err(GenerationError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let result: GenerationResult = serde_json::from_slice(&body)?;

        Ok(result)
    }

    async fn fetch_logs(&self, lines: usize) -> Result<Vec<String>> {
        let mut logs_url = self.endpoint("api/logs")?;
        logs_url
            .query_pairs_mut()
            .append_pair("lines", &lines.to_string());

        let response = self.client.get(logs_url).send().await?;
        if !response.status().is_success() {
            bail!("Log request failed: {}", response.status());
        }

        let logs: LogsResponse = response.json().await?;
        Ok(logs.logs)
    }

    async fn health_check(&self) -> Result<()> {
        let response = self.client.get(self.base_url.clone()).send().await?;

        if !response.status().is_success() {
            bail!("Health check failed: {}", response.status());
        }

        Ok(())
    }

    fn artifact_url(&self, result: &GenerationResult) -> Result<Url> {
        self.endpoint(&result.download_path)
    }

    async fn download(&self, result: &GenerationResult) -> Result<Bytes> {
        let url = self.artifact_url(result)?;
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            bail!("Download of {} failed: {}", url, response.status());
        }

        Ok(response.bytes().await?)
    }
}

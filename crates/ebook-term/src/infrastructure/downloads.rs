use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use ebook_client::EbookBackend;
use ebook_client::GenerationResult;
use tokio::fs;

/// Only the final path component of a backend supplied filename is trusted.
fn local_file_name(result: &GenerationResult) -> Result<String> {
    let name = Path::new(result.filename.trim())
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    if name.is_empty() {
        bail!("Generated ebook has no usable file name: '{}'", result.filename);
    }

    return Ok(name);
}

/// Download a produced ebook into `output_dir` and return where it landed.
pub async fn save_artifact(
    backend: &dyn EbookBackend,
    result: &GenerationResult,
    output_dir: &Path,
) -> Result<PathBuf> {
    let name = local_file_name(result)?;
    let bytes = backend
        .download(result)
        .await
        .with_context(|| format!("Failed to download {}", result.filename))?;

    fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let path = output_dir.join(name);
    fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), size = bytes.len(), "saved ebook");

    return Ok(path);
}

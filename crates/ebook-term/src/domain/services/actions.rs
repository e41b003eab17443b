use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use ebook_client::ControllerHandle;
use ebook_client::EbookBackend;
use ebook_client::GenerationResult;
use ebook_client::StartOutcome;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::infrastructure::downloads;

fn start_generation(
    handle: &ControllerHandle,
    topic: &str,
    event_tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    match handle.start(topic) {
        Ok(StartOutcome::Started) => {
            tracing::info!(topic = %topic.trim(), "generation requested");
        }
        Ok(StartOutcome::Ignored) => {}
        Err(err) => {
            event_tx.send(Event::Alert(err.to_string()))?;
        }
    }

    return Ok(());
}

async fn download(
    backend: &dyn EbookBackend,
    result: GenerationResult,
    output_dir: PathBuf,
    event_tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    match downloads::save_artifact(backend, &result, &output_dir).await {
        Ok(path) => {
            event_tx.send(Event::Notice(format!("Saved to {}", path.display())))?;
        }
        Err(err) => {
            tracing::error!(error = ?err, "download failed");
            event_tx.send(Event::Alert(format!("Error: {err:#}")))?;
        }
    }

    return Ok(());
}

pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        handle: ControllerHandle,
        backend: Arc<dyn EbookBackend>,
        output_dir: PathBuf,
        event_tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        while let Some(action) = rx.recv().await {
            match action {
                Action::Generate(topic) => {
                    start_generation(&handle, &topic, &event_tx)?;
                }
                Action::ToggleServerLogs => {
                    handle.toggle_server_logs()?;
                }
                Action::RefreshServerLogs => {
                    handle.refresh_server_logs()?;
                }
                Action::Download(result) => {
                    let worker_backend = backend.clone();
                    let worker_event_tx = event_tx.clone();
                    let worker_dir = output_dir.clone();
                    tokio::spawn(async move {
                        return download(
                            worker_backend.as_ref(),
                            result,
                            worker_dir,
                            &worker_event_tx,
                        )
                        .await;
                    });
                }
            }
        }

        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;
    use async_trait::async_trait;
    use ebook_client::Bytes;
    use ebook_client::ControllerConfig;
    use ebook_client::GenerateRequest;
    use ebook_client::GenerationController;
    use ebook_client::GenerationError;
    use ebook_client::Url;

    use super::*;

    struct MockBackend {
        artifact: Option<&'static str>,
    }

    #[async_trait]
    impl EbookBackend for MockBackend {
        async fn generate(
            &self,
            request: GenerateRequest,
        ) -> Result<GenerationResult, GenerationError> {
            let filename = format!("{}.pdf", request.topic);
            return Ok(GenerationResult::new(&filename, &format!("static/{filename}")));
        }

        async fn fetch_logs(&self, _lines: usize) -> Result<Vec<String>> {
            return Ok(vec![]);
        }

        async fn health_check(&self) -> Result<()> {
            return Ok(());
        }

        fn artifact_url(&self, result: &GenerationResult) -> Result<Url> {
            return Ok(Url::parse("http://localhost:8000/")?.join(&result.download_path)?);
        }

        async fn download(&self, _result: &GenerationResult) -> Result<Bytes> {
            match self.artifact {
                Some(body) => return Ok(Bytes::from_static(body.as_bytes())),
                None => bail!("connection refused"),
            }
        }
    }

    struct Harness {
        action_tx: mpsc::UnboundedSender<Action>,
        event_rx: mpsc::UnboundedReceiver<Event>,
        handle: ControllerHandle,
        _controller: GenerationController,
    }

    fn harness(artifact: Option<&'static str>, output_dir: PathBuf) -> Harness {
        let backend: Arc<dyn EbookBackend> = Arc::new(MockBackend { artifact });
        let (controller, handle) =
            GenerationController::new(backend.clone(), ControllerConfig::default()).unwrap();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

        let worker_handle = handle.clone();
        tokio::spawn(async move {
            ActionsService::start(worker_handle, backend, output_dir, event_tx, &mut action_rx)
                .await
                .unwrap();
        });

        return Harness {
            action_tx,
            event_rx,
            handle,
            _controller: controller,
        };
    }

    #[tokio::test]
    async fn test_generate_with_empty_topic_alerts() {
        let mut harness = harness(None, PathBuf::from("."));

        harness
            .action_tx
            .send(Action::Generate("   ".to_string()))
            .unwrap();

        let event = harness.event_rx.recv().await.unwrap();
        assert!(matches!(event, Event::Alert(msg) if msg == "Please enter a topic"));
        assert!(!harness.handle.is_generating());
    }

    #[tokio::test]
    async fn test_generate_marks_handle_busy() {
        let mut harness = harness(None, PathBuf::from("."));

        harness
            .action_tx
            .send(Action::Generate("Learn Python".to_string()))
            .unwrap();
        harness
            .action_tx
            .send(Action::Generate("Second topic".to_string()))
            .unwrap();
        drop(harness.action_tx);

        // The service loop ends once every sender is gone; no alert is raised for
        // the ignored second start.
        assert!(harness.event_rx.recv().await.is_none());
        assert!(harness.handle.is_generating());
    }

    #[tokio::test]
    async fn test_download_saves_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let mut harness = harness(Some("%PDF-1.4"), dir.path().to_path_buf());

        harness
            .action_tx
            .send(Action::Download(GenerationResult::new(
                "rust.pdf",
                "static/rust.pdf",
            )))
            .unwrap();

        let event = harness.event_rx.recv().await.unwrap();
        let expected = format!("Saved to {}", dir.path().join("rust.pdf").display());
        assert!(matches!(event, Event::Notice(msg) if msg == expected));
        assert_eq!(
            tokio::fs::read(dir.path().join("rust.pdf")).await.unwrap(),
            b"%PDF-1.4"
        );
    }

    #[tokio::test]
    async fn test_download_failure_alerts() {
        let dir = tempfile::tempdir().unwrap();
        let mut harness = harness(None, dir.path().to_path_buf());

        harness
            .action_tx
            .send(Action::Download(GenerationResult::new(
                "rust.pdf",
                "static/rust.pdf",
            )))
            .unwrap();

        let event = harness.event_rx.recv().await.unwrap();
        assert!(matches!(event, Event::Alert(msg) if msg.contains("connection refused")));
    }
}

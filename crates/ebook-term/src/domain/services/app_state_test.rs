use anyhow::bail;
use async_trait::async_trait;
use ebook_client::Bytes;
use ebook_client::ErrorInfo;
use ebook_client::ErrorKind;
use ebook_client::GenerateRequest;
use ebook_client::GenerationError;
use ebook_client::GenerationResult;
use ebook_client::Session;
use ebook_client::Url;
use tui_textarea::Input;
use tui_textarea::Key;

use super::*;

struct MockBackend {
    healthy: bool,
}

#[async_trait]
impl EbookBackend for MockBackend {
    async fn generate(
        &self,
        _request: GenerateRequest,
    ) -> Result<GenerationResult, GenerationError> {
        return Err(GenerationError::Cancelled);
    }

    async fn fetch_logs(&self, _lines: usize) -> Result<Vec<String>> {
        return Ok(vec![]);
    }

    async fn health_check(&self) -> Result<()> {
        if !self.healthy {
            bail!("connection refused");
        }
        return Ok(());
    }

    fn artifact_url(&self, result: &GenerationResult) -> Result<Url> {
        return Ok(Url::parse("http://localhost:8000/")?.join(&result.download_path)?);
    }

    async fn download(&self, _result: &GenerationResult) -> Result<Bytes> {
        return Ok(Bytes::new());
    }
}

async fn app_state(healthy: bool) -> AppState<'static> {
    let props = AppStateProps {
        backend: Arc::new(MockBackend { healthy }),
        server_url: "http://localhost:8000".to_string(),
    };

    return AppState::new(props).await.unwrap();
}

fn running() -> ControllerState {
    return ControllerState {
        session: Some(Session::start("Learn Python")),
        generating: true,
        ..Default::default()
    };
}

fn settled(status: SessionStatus) -> ControllerState {
    let mut state = running();
    state.generating = false;
    if let Some(session) = state.session.as_mut() {
        session.status = status;
    }
    return state;
}

fn type_text(app_state: &mut AppState, tx: &mpsc::UnboundedSender<Action>, text: &str) {
    for c in text.chars() {
        let input = Input {
            key: Key::Char(c),
            ..Default::default()
        };
        app_state
            .handle_event(Event::KeyboardCharInput(input), tx)
            .unwrap();
    }
}

#[tokio::test]
async fn test_new_warns_when_backend_is_down() {
    let app_state = app_state(false).await;

    let alert = app_state.alert.unwrap();
    assert!(alert.contains("http://localhost:8000"));
    assert!(alert.contains("connection refused"));
}

#[tokio::test]
async fn test_enter_submits_trimmed_topic() {
    let mut app_state = app_state(true).await;
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();

    type_text(&mut app_state, &tx, "  Learn Python ");
    app_state.handle_event(Event::KeyboardEnter, &tx).unwrap();

    assert_eq!(
        rx.try_recv().unwrap(),
        Action::Generate("Learn Python".to_string())
    );
}

#[tokio::test]
async fn test_enter_with_empty_topic_alerts() {
    let mut app_state = app_state(true).await;
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();

    type_text(&mut app_state, &tx, "   ");
    app_state.handle_event(Event::KeyboardEnter, &tx).unwrap();

    assert_eq!(app_state.alert.as_deref(), Some("Please enter a topic"));
    assert!(rx.try_recv().is_err());

    // The next Enter only dismisses the alert.
    app_state.handle_event(Event::KeyboardEnter, &tx).unwrap();
    assert!(app_state.alert.is_none());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_input_is_locked_while_generating() {
    let mut app_state = app_state(true).await;
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();

    type_text(&mut app_state, &tx, "Rust");
    app_state
        .handle_event(Event::ControllerUpdate(running()), &tx)
        .unwrap();
    type_text(&mut app_state, &tx, "acean");
    app_state.handle_event(Event::KeyboardEnter, &tx).unwrap();

    assert_eq!(app_state.topic(), "Rust");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_failure_raises_error_alert_once() {
    let mut app_state = app_state(true).await;
    let (tx, _rx) = mpsc::unbounded_channel::<Action>();

    let mut failed = settled(SessionStatus::Failed);
    failed.error = Some(ErrorInfo {
        kind: ErrorKind::Http,
        message: "search failed".to_string(),
    });

    app_state
        .handle_event(Event::ControllerUpdate(running()), &tx)
        .unwrap();
    app_state
        .handle_event(Event::ControllerUpdate(failed.clone()), &tx)
        .unwrap();
    assert_eq!(app_state.alert.as_deref(), Some("Error: search failed"));

    app_state.handle_event(Event::KeyboardEsc, &tx).unwrap();
    app_state
        .handle_event(Event::ControllerUpdate(failed), &tx)
        .unwrap();
    assert!(app_state.alert.is_none());
}

#[tokio::test]
async fn test_success_resolves_artifact_url_and_allows_download() {
    let mut app_state = app_state(true).await;
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();

    let result = GenerationResult::new("learn_python.pdf", "static/learn_python.pdf");
    let mut succeeded = settled(SessionStatus::Succeeded);
    succeeded.result = Some(result.clone());

    app_state
        .handle_event(Event::ControllerUpdate(succeeded), &tx)
        .unwrap();
    assert_eq!(
        app_state.artifact_url.as_deref(),
        Some("http://localhost:8000/static/learn_python.pdf")
    );

    app_state.handle_event(Event::KeyboardCTRLS, &tx).unwrap();
    assert_eq!(rx.try_recv().unwrap(), Action::Download(result));
    assert_eq!(
        app_state.notice.as_deref(),
        Some("Downloading learn_python.pdf...")
    );

    // A new session clears the previous artifact.
    app_state
        .handle_event(Event::ControllerUpdate(running()), &tx)
        .unwrap();
    assert!(app_state.artifact_url.is_none());
    assert!(app_state.notice.is_none());
}

#[tokio::test]
async fn test_download_without_result_is_noop() {
    let mut app_state = app_state(true).await;
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();

    app_state.handle_event(Event::KeyboardCTRLS, &tx).unwrap();

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_server_log_hotkeys() {
    let mut app_state = app_state(true).await;
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();

    app_state.handle_event(Event::KeyboardCTRLL, &tx).unwrap();
    assert_eq!(rx.try_recv().unwrap(), Action::ToggleServerLogs);

    // Refresh needs the panel open.
    app_state.handle_event(Event::KeyboardCTRLR, &tx).unwrap();
    assert!(rx.try_recv().is_err());

    let mut open = ControllerState::default();
    open.logs.set_server_visible(true);
    app_state
        .handle_event(Event::ControllerUpdate(open.clone()), &tx)
        .unwrap();
    app_state.handle_event(Event::KeyboardCTRLR, &tx).unwrap();
    assert_eq!(rx.try_recv().unwrap(), Action::RefreshServerLogs);

    // Polling already covers a running session.
    let mut busy = running();
    busy.logs = open.logs;
    app_state
        .handle_event(Event::ControllerUpdate(busy), &tx)
        .unwrap();
    app_state.handle_event(Event::KeyboardCTRLR, &tx).unwrap();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_scroll_and_quit() {
    let mut app_state = app_state(true).await;
    let (tx, _rx) = mpsc::unbounded_channel::<Action>();

    app_state.handle_event(Event::UIScrollPageUp, &tx).unwrap();
    app_state.handle_event(Event::UIScrollDown, &tx).unwrap();
    assert_eq!(app_state.log_scroll, 9);

    app_state.handle_event(Event::UIScrollPageDown, &tx).unwrap();
    assert_eq!(app_state.log_scroll, 0);

    assert!(app_state.handle_event(Event::KeyboardCTRLC, &tx).unwrap());
}

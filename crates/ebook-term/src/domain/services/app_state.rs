use std::sync::Arc;

use anyhow::Result;
use ebook_client::errors::VALIDATION_MESSAGE;
use ebook_client::ControllerState;
use ebook_client::EbookBackend;
use ebook_client::SessionStatus;
use ratatui::style::Style;
use tokio::sync::mpsc;
use tui_textarea::TextArea;

use crate::domain::models::Action;
use crate::domain::models::Event;

#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

const PAGE_SIZE: usize = 10;

pub struct AppStateProps {
    pub backend: Arc<dyn EbookBackend>,
    pub server_url: String,
}

pub struct AppState<'a> {
    pub alert: Option<String>,
    pub artifact_url: Option<String>,
    pub controller: ControllerState,
    pub input: TextArea<'a>,
    /// Lines scrolled up from the tail of the log pane; 0 follows new lines
    pub log_scroll: usize,
    pub notice: Option<String>,
    pub server_url: String,
    backend: Arc<dyn EbookBackend>,
}

impl<'a> AppState<'a> {
    pub async fn new(props: AppStateProps) -> Result<AppState<'a>> {
        let mut app_state = AppState::init(props);

        if let Err(err) = app_state.backend.health_check().await {
            tracing::warn!(error = %err, "backend health check failed");
            app_state.alert = Some(format!(
                "Can't reach the ebook backend at {}. Generation will fail until it is running.\n\nError: {err}",
                app_state.server_url
            ));
        }

        return Ok(app_state);
    }

    pub(crate) fn init(props: AppStateProps) -> AppState<'a> {
        let mut input = TextArea::default();
        input.set_cursor_line_style(Style::default());
        input.set_placeholder_text("Enter a topic, e.g. Learn Python");

        return AppState {
            alert: None,
            artifact_url: None,
            controller: ControllerState::default(),
            input,
            log_scroll: 0,
            notice: None,
            server_url: props.server_url,
            backend: props.backend,
        };
    }

    pub fn is_generating(&self) -> bool {
        return self.controller.generating;
    }

    pub fn topic(&self) -> String {
        return self.input.lines().join(" ").trim().to_string();
    }

    /// Apply one event. Returns true when the application should exit.
    pub fn handle_event(
        &mut self,
        event: Event,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<bool> {
        match event {
            Event::ControllerUpdate(state) => {
                self.apply_controller_state(state);
            }
            Event::Alert(msg) => {
                self.alert = Some(msg);
            }
            Event::Notice(msg) => {
                self.notice = Some(msg);
            }
            Event::KeyboardCTRLC => {
                return Ok(true);
            }
            Event::KeyboardEnter => {
                if self.alert.take().is_some() {
                    return Ok(false);
                }
                self.submit(tx)?;
            }
            Event::KeyboardEsc => {
                self.alert = None;
            }
            Event::KeyboardCTRLL => {
                tx.send(Action::ToggleServerLogs)?;
            }
            Event::KeyboardCTRLR => {
                if !self.is_generating() && self.controller.logs.server_visible() {
                    tx.send(Action::RefreshServerLogs)?;
                }
            }
            Event::KeyboardCTRLS => {
                if self.is_generating() {
                    return Ok(false);
                }
                if let Some(result) = self.controller.result.clone() {
                    self.notice = Some(format!("Downloading {}...", result.filename));
                    tx.send(Action::Download(result))?;
                }
            }
            Event::KeyboardCharInput(input) => {
                if self.alert.is_none() && !self.is_generating() {
                    self.input.input(input);
                }
            }
            Event::KeyboardPaste(text) => {
                if self.alert.is_none() && !self.is_generating() {
                    self.input.insert_str(text.replace(['\r', '\n'], " "));
                }
            }
            Event::UIScrollUp => {
                self.log_scroll = self.log_scroll.saturating_add(1);
            }
            Event::UIScrollDown => {
                self.log_scroll = self.log_scroll.saturating_sub(1);
            }
            Event::UIScrollPageUp => {
                self.log_scroll = self.log_scroll.saturating_add(PAGE_SIZE);
            }
            Event::UIScrollPageDown => {
                self.log_scroll = self.log_scroll.saturating_sub(PAGE_SIZE);
            }
            Event::UITick => {}
        }

        return Ok(false);
    }

    fn submit(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if self.is_generating() {
            return Ok(());
        }

        let topic = self.topic();
        if topic.is_empty() {
            self.alert = Some(VALIDATION_MESSAGE.to_string());
            return Ok(());
        }

        tx.send(Action::Generate(topic))?;
        return Ok(());
    }

    fn apply_controller_state(&mut self, state: ControllerState) {
        let previous = self.controller.status();
        let status = state.status();

        if state.generating && !self.controller.generating {
            self.artifact_url = None;
            self.notice = None;
            self.log_scroll = 0;
        }

        if status == SessionStatus::Failed && previous != SessionStatus::Failed {
            if let Some(error) = state.error.as_ref() {
                self.alert = Some(format!("Error: {}", error.message));
            }
        }

        if state.result != self.controller.result {
            self.artifact_url = state.result.as_ref().and_then(|result| {
                self.backend
                    .artifact_url(result)
                    .map(|url| url.to_string())
                    .ok()
            });
        }

        self.controller = state;
    }
}

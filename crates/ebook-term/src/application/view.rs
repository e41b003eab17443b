use ebook_client::LogEntry;
use ebook_client::SessionStatus;
use ebook_client::StepStatus;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Frame;

use crate::domain::services::AppState;

pub const NO_SERVER_LOGS: &str = "No server logs available";

fn step_line(label: &str, status: StepStatus) -> Line<'static> {
    let (symbol, style) = match status {
        StepStatus::Completed => ("✓", Style::default().fg(Color::Green)),
        StepStatus::Active => (
            "►",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        StepStatus::Pending => ("○", Style::default().fg(Color::DarkGray)),
    };

    return Line::from(vec![
        Span::styled(format!(" {symbol} "), style),
        Span::styled(label.to_string(), style),
    ]);
}

/// Scroll offset that keeps the tail in view, `from_tail` lines up from the bottom.
fn tail_offset(total: usize, height: u16, from_tail: usize) -> u16 {
    let visible = usize::from(height.saturating_sub(2));
    let offset = total.saturating_sub(visible).saturating_sub(from_tail);
    return u16::try_from(offset).unwrap_or(u16::MAX);
}

fn log_pane<'a>(title: &'a str, entries: &[LogEntry], empty: &'a str) -> Paragraph<'a> {
    let lines = if entries.is_empty() {
        vec![Line::styled(
            empty.to_string(),
            Style::default().fg(Color::DarkGray),
        )]
    } else {
        entries
            .iter()
            .map(|entry| Line::from(entry.to_string()))
            .collect()
    };

    return Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
}

fn render_logs(frame: &mut Frame, app_state: &AppState, area: Rect) {
    let logs = &app_state.controller.logs;

    if !logs.server_visible() {
        let pane = log_pane(" Progress log ", logs.client(), "");
        let offset = tail_offset(logs.client().len(), area.height, app_state.log_scroll);
        frame.render_widget(pane.scroll((offset, 0)), area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let client = log_pane(" Progress log ", logs.client(), "");
    let client_offset = tail_offset(logs.client().len(), area.height, app_state.log_scroll);
    frame.render_widget(client.scroll((client_offset, 0)), columns[0]);

    let server = log_pane(" Server log (Ctrl+L to hide) ", logs.server(), NO_SERVER_LOGS);
    let server_offset = tail_offset(logs.server().len(), area.height, app_state.log_scroll);
    frame.render_widget(server.scroll((server_offset, 0)), columns[1]);
}

fn status_lines(app_state: &AppState) -> Vec<Line<'static>> {
    let controller = &app_state.controller;
    let mut lines = vec![];

    match controller.status() {
        SessionStatus::Idle => {
            lines.push(Line::from("Enter a topic and press Enter to generate an ebook."));
        }
        SessionStatus::Running => {
            let topic = controller
                .session
                .as_ref()
                .map(|session| session.topic.clone())
                .unwrap_or_default();
            lines.push(Line::styled(
                format!("Generating \"{topic}\"... this can take several minutes."),
                Style::default().fg(Color::Yellow),
            ));
        }
        SessionStatus::Succeeded => {
            if let Some(result) = controller.result.as_ref() {
                lines.push(Line::styled(
                    format!("Ebook ready: {}", result.filename),
                    Style::default().fg(Color::Green),
                ));
            }
            if let Some(url) = app_state.artifact_url.as_ref() {
                lines.push(Line::from(format!("Download: {url}  (Ctrl+S to save)")));
            }
        }
        SessionStatus::Failed => {
            if let Some(error) = controller.error.as_ref() {
                lines.push(Line::styled(
                    format!("Error: {}", error.message),
                    Style::default().fg(Color::Red),
                ));
            }
        }
    }

    if let Some(notice) = app_state.notice.as_ref() {
        lines.push(Line::styled(
            notice.to_string(),
            Style::default().fg(Color::Cyan),
        ));
    }

    return lines;
}

fn popup_area(area: Rect) -> Rect {
    let width = area.width.saturating_mul(3) / 5;
    let height = area.height.min(9);

    return Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };
}

pub fn render(frame: &mut Frame, app_state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Min(5),
            Constraint::Length(5),
        ])
        .split(frame.area());

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                "AI Ebook Generator",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", app_state.server_url),
                Style::default().fg(Color::DarkGray),
            ),
        ])),
        rows[0],
    );

    let mut input = app_state.input.clone();
    let input_title = if app_state.is_generating() {
        " Topic (generating...) "
    } else {
        " Topic "
    };
    input.set_block(Block::default().borders(Borders::ALL).title(input_title));
    frame.render_widget(&input, rows[1]);

    let idle = app_state.controller.session.is_none();
    let steps = app_state
        .controller
        .steps
        .iter()
        .map(|(label, status)| {
            if idle {
                return step_line(label, StepStatus::Pending);
            }
            return step_line(label, status);
        })
        .collect::<Vec<_>>();
    frame.render_widget(
        Paragraph::new(steps).block(Block::default().borders(Borders::ALL).title(" Progress ")),
        rows[2],
    );

    render_logs(frame, app_state, rows[3]);

    frame.render_widget(
        Paragraph::new(status_lines(app_state))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Ctrl+L server log | Ctrl+R refresh | Ctrl+S save | Ctrl+C quit "),
            ),
        rows[4],
    );

    if let Some(alert) = app_state.alert.as_ref() {
        let area = popup_area(frame.area());
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(alert.to_string())
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red))
                        .title(" Enter to dismiss "),
                ),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ebook_client::http_client::HttpEbookBackend;
    use ebook_client::ControllerState;
    use ebook_client::GenerationResult;
    use ebook_client::Session;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::models::Event;
    use crate::domain::services::AppStateProps;

    fn app_state() -> AppState<'static> {
        let props = AppStateProps {
            backend: Arc::new(HttpEbookBackend::new("http://localhost:8000").unwrap()),
            server_url: "http://localhost:8000".to_string(),
        };
        return AppState::init(props);
    }

    fn draw(app_state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, app_state)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        return buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");
    }

    fn update(app_state: &mut AppState, state: ControllerState) {
        let (tx, _rx) = mpsc::unbounded_channel();
        app_state
            .handle_event(Event::ControllerUpdate(state), &tx)
            .unwrap();
    }

    #[test]
    fn test_render_idle() {
        let screen = draw(&app_state());

        assert!(screen.contains("AI Ebook Generator"));
        assert!(screen.contains("○ Web Search"));
        assert!(screen.contains("Enter a topic and press Enter"));
        assert!(!screen.contains("Server log"));
    }

    #[test]
    fn test_render_running_marks_steps() {
        let mut app_state = app_state();
        let mut state = ControllerState {
            session: Some(Session::start("Learn Python")),
            generating: true,
            ..Default::default()
        };
        state.steps.advance();
        state.logs.push_client("Starting ebook generation...");
        update(&mut app_state, state);

        let screen = draw(&app_state);
        assert!(screen.contains("✓ Web Search"));
        assert!(screen.contains("► Data Analysis"));
        assert!(screen.contains("Starting ebook generation..."));
        assert!(screen.contains("Generating \"Learn Python\""));
    }

    #[test]
    fn test_render_server_panel_placeholder() {
        let mut app_state = app_state();
        let mut state = ControllerState::default();
        state.logs.set_server_visible(true);
        update(&mut app_state, state);

        assert!(draw(&app_state).contains(NO_SERVER_LOGS));
    }

    #[test]
    fn test_render_success_shows_download_url() {
        let mut app_state = app_state();
        let mut state = ControllerState {
            session: Some(Session::start("Learn Python")),
            result: Some(GenerationResult::new("x.pdf", "static/x.pdf")),
            ..Default::default()
        };
        if let Some(session) = state.session.as_mut() {
            session.status = SessionStatus::Succeeded;
        }
        state.steps.complete();
        update(&mut app_state, state);

        let screen = draw(&app_state);
        assert!(screen.contains("Ebook ready: x.pdf"));
        assert!(screen.contains("http://localhost:8000/static/x.pdf"));
        assert!(screen.contains("✓ Verification"));
    }

    #[test]
    fn test_render_alert_popup() {
        let mut app_state = app_state();
        app_state.alert = Some("Please enter a topic".to_string());

        let screen = draw(&app_state);
        assert!(screen.contains("Enter to dismiss"));
        assert!(screen.contains("Please enter a topic"));
    }

    #[test]
    fn test_tail_offset_follows_new_lines() {
        assert_eq!(tail_offset(3, 10, 0), 0);
        assert_eq!(tail_offset(20, 10, 0), 12);
        assert_eq!(tail_offset(20, 10, 5), 7);
        assert_eq!(tail_offset(20, 10, 50), 0);
    }
}

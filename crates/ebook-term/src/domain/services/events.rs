use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::EventStream;
use ebook_client::ControllerState;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::time;
use tui_textarea::Input;
use tui_textarea::Key;

use crate::domain::models::Event;

pub struct EventsService {
    crossterm_events: EventStream,
    events: mpsc::UnboundedReceiver<Event>,
    controller: watch::Receiver<ControllerState>,
    controller_open: bool,
}

impl EventsService {
    pub fn new(
        events: mpsc::UnboundedReceiver<Event>,
        controller: watch::Receiver<ControllerState>,
    ) -> EventsService {
        return EventsService {
            crossterm_events: EventStream::new(),
            events,
            controller,
            controller_open: true,
        };
    }

    fn handle_crossterm(&self, event: CrosstermEvent) -> Option<Event> {
        match event {
            CrosstermEvent::Paste(text) => {
                return Some(Event::KeyboardPaste(text));
            }
            CrosstermEvent::Mouse(mouseevent) => match mouseevent.kind {
                crossterm::event::MouseEventKind::ScrollUp => {
                    return Some(Event::UIScrollUp);
                }
                crossterm::event::MouseEventKind::ScrollDown => {
                    return Some(Event::UIScrollDown);
                }
                _ => {
                    return None;
                }
            },
            CrosstermEvent::Key(keyevent) => {
                if keyevent.kind != crossterm::event::KeyEventKind::Press {
                    return None;
                }

                let key = match keyevent.code {
                    crossterm::event::KeyCode::Char(c) => Key::Char(c),
                    crossterm::event::KeyCode::Enter => Key::Enter,
                    crossterm::event::KeyCode::Left => Key::Left,
                    crossterm::event::KeyCode::Right => Key::Right,
                    crossterm::event::KeyCode::Up => Key::Up,
                    crossterm::event::KeyCode::Down => Key::Down,
                    crossterm::event::KeyCode::Home => Key::Home,
                    crossterm::event::KeyCode::End => Key::End,
                    crossterm::event::KeyCode::PageUp => Key::PageUp,
                    crossterm::event::KeyCode::PageDown => Key::PageDown,
                    crossterm::event::KeyCode::Delete => Key::Delete,
                    crossterm::event::KeyCode::Backspace => Key::Backspace,
                    crossterm::event::KeyCode::Esc => Key::Esc,
                    _ => return None,
                };

                let input = Input {
                    key,
                    ctrl: keyevent
                        .modifiers
                        .contains(crossterm::event::KeyModifiers::CONTROL),
                    alt: keyevent
                        .modifiers
                        .contains(crossterm::event::KeyModifiers::ALT),
                    shift: keyevent
                        .modifiers
                        .contains(crossterm::event::KeyModifiers::SHIFT),
                };

                return Some(EventsService::map_input(input));
            }
            _ => return None,
        }
    }

    fn map_input(input: Input) -> Event {
        match input {
            Input { key: Key::Down, .. } => {
                return Event::UIScrollDown;
            }
            Input { key: Key::Up, .. } => {
                return Event::UIScrollUp;
            }
            Input {
                key: Key::PageDown, ..
            } => {
                return Event::UIScrollPageDown;
            }
            Input {
                key: Key::PageUp, ..
            } => {
                return Event::UIScrollPageUp;
            }
            Input {
                key: Key::Char('c'),
                ctrl: true,
                ..
            } => {
                return Event::KeyboardCTRLC;
            }
            Input {
                key: Key::Char('l'),
                ctrl: true,
                ..
            } => {
                return Event::KeyboardCTRLL;
            }
            Input {
                key: Key::Char('r'),
                ctrl: true,
                ..
            } => {
                return Event::KeyboardCTRLR;
            }
            Input {
                key: Key::Char('s'),
                ctrl: true,
                ..
            } => {
                return Event::KeyboardCTRLS;
            }
            Input {
                key: Key::Enter, ..
            } => {
                return Event::KeyboardEnter;
            }
            Input { key: Key::Esc, .. } => {
                return Event::KeyboardEsc;
            }
            input => {
                return Event::KeyboardCharInput(input);
            }
        }
    }

    pub async fn next(&mut self) -> Result<Event> {
        loop {
            let evt = tokio::select! {
                event = self.events.recv() => event,
                changed = self.controller.changed(), if self.controller_open => match changed {
                    Ok(()) => Some(Event::ControllerUpdate(self.controller.borrow_and_update().clone())),
                    Err(_) => {
                        self.controller_open = false;
                        None
                    }
                },
                event = self.crossterm_events.next() => match event {
                    Some(Ok(input)) => self.handle_crossterm(input),
                    Some(Err(_)) => None,
                    None => None
                },
                _ = time::sleep(time::Duration::from_millis(500)) => Some(Event::UITick)
            };

            if let Some(event) = evt {
                return Ok(event);
            }
        }
    }
}

use ebook_client::ControllerState;
use tui_textarea::Input;

#[derive(Debug)]
pub enum Event {
    ControllerUpdate(ControllerState),
    Alert(String),
    Notice(String),
    KeyboardCharInput(Input),
    KeyboardCTRLC,
    KeyboardCTRLL,
    KeyboardCTRLR,
    KeyboardCTRLS,
    KeyboardEnter,
    KeyboardEsc,
    KeyboardPaste(String),
    UITick,
    UIScrollDown,
    UIScrollUp,
    UIScrollPageDown,
    UIScrollPageUp,
}

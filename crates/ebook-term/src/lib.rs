//! Terminal client for the ebook generation service.
//!
//! A thin view over `ebook-client`'s generation controller: an interactive
//! terminal UI and a headless mode for scripts. All generation state is owned by
//! the controller; this crate only renders snapshots of it and forwards user
//! intent back.

pub mod application;
pub mod configuration;
pub mod domain;
pub mod infrastructure;
pub use application::ui::{destruct_terminal_for_panic, start_loop};
pub use configuration::{Config, ConfigKey};
pub use domain::models::{Action, Event};
pub use domain::services::{AppState, AppStateProps};

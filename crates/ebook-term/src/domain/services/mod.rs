pub mod actions;
mod app_state;
pub mod events;

pub use app_state::*;

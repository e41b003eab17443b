//! Application layer driving the terminal client.
//!
//! This module handles command-line parsing, the interactive UI loop with its
//! view, and the headless single-run mode.

pub mod cli;
pub mod headless;
pub mod ui;
pub mod view;

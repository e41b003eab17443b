//! Infrastructure layer providing external integrations.
//!
//! Saving downloaded artifacts to disk and wiring diagnostic logging to a file.

pub mod downloads;
pub mod logging;

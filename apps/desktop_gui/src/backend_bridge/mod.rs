//! Bridge between the UI thread and the prediction worker thread.

pub mod commands;
pub mod runtime;

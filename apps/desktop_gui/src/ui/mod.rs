//! UI layer: app shell, form fields, and outcome panels.

pub mod app;
pub mod form;
pub mod outcome;

pub use app::PredictorApp;

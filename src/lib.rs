//! Library exports for the dropout-risk batch predictor.
/// Application directory resolution.
pub mod app_dirs;
/// Fitted artifact loading and the shared read-only handle.
pub mod artifacts;
/// TOML settings for the developer shell.
pub mod config;
/// Tracing subscriber setup.
pub mod logging;
/// Fitted scaler and classifier models.
pub mod ml;
/// Validate, scale, predict, label and summarize.
pub mod pipeline;
/// Required student feature columns.
pub mod schema;
/// Tabular input and the CSV reader.
pub mod table;

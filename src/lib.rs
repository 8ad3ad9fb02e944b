//! Library exports for reuse in the CLI binary and integration tests.
/// Application directory helpers.
pub mod app_dirs;
/// Typed client for the remote classification service.
pub mod classifier_api;
/// Endpoint and credential configuration.
pub mod config;
pub(crate) mod http_client;
/// Logging setup.
pub mod logging;
/// Sequence cleanup and validation.
pub mod sequence_sanitize;
/// Prediction session state machine.
pub mod session;

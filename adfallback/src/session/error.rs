//! Session error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by [`super::Session::start`].
///
/// The page never sees these; a failed start leaves it untouched.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("session already started")]
    AlreadyStarted,
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

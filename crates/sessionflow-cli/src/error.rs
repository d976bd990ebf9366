use sessionflow_layout::{ConfigError, EventLoadError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Exit code when the batch holds no session with a transition.
pub const EXIT_INSUFFICIENT_DATA: i32 = 3;

/// Exit code when `check` finds broken invariants.
pub const EXIT_VIOLATIONS: i32 = 4;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("event batch error: {0}")]
    Events(#[from] EventLoadError),

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("{message}")]
    Exit { code: i32, message: String },
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exit { code, .. } => *code,
            Self::InvalidArgument { .. } => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub fn exit(code: i32, message: impl Into<String>) -> Self {
        Self::Exit {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type using [`MobError`].
pub type MobResult<T> = Result<T, MobError>;

/// Every failure a `mob`, `solo` or `add-author` invocation can surface.
#[derive(Debug, Error)]
pub enum MobError {
    /// The authors file does not exist.
    #[error("authors file not found at {}", path.display())]
    NotFound { path: PathBuf },

    /// The authors file exists but is not a valid registry.
    #[error("cannot parse authors file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// One or more initials are not registered.
    #[error("author with initials \"{}\" not found in the authors file", .0.join("\", \""))]
    UnknownInitials(Vec<String>),

    /// Rejected by the email validator.
    #[error("invalid email format: {0:?}")]
    InvalidEmail(String),

    /// Empty, or contains line breaks, control characters or angle brackets.
    #[error("invalid co-author name: {0:?}")]
    InvalidName(String),

    /// `git` is missing or a git invocation failed.
    #[error("`{command}` failed: {message}")]
    ExternalTool {
        command: String,
        /// Exit status, `None` when the process never ran or was killed.
        code: Option<i32>,
        message: String,
    },

    /// The active co-author set was cleared but could not be fully rewritten.
    #[error("co-author set is incomplete ({source}); run the command again to repair it")]
    InconsistentMob {
        #[source]
        source: Box<MobError>,
    },

    /// No home directory to derive the authors file location from.
    #[error("cannot locate a home directory; set {var} to the authors file path")]
    MissingHome { var: &'static str },

    /// The registry could not be encoded for writing.
    #[error("cannot serialize authors file {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Interactive input failed or is not possible.
    #[error("{0}")]
    Prompt(String),
}

impl MobError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Exit status of the failed git invocation, if that is what failed.
    pub fn tool_exit_code(&self) -> Option<i32> {
        match self {
            Self::ExternalTool { code, .. } => *code,
            _ => None,
        }
    }
}

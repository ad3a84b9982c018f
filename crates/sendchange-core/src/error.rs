use thiserror::Error;

use crate::process::ProcessError;

/// Errors produced while turning raw VCS output into commit metadata
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No author found for revision {revision}")]
    MissingAuthor { revision: String },
}

/// Errors from a VCS backend, scoped to one ref update or one revision
#[derive(Error, Debug)]
pub enum VcsError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Invalid revision '{revision}': {reason}")]
    InvalidRevision { revision: String, reason: String },

    #[error("VCS query failed: {0}")]
    Query(#[from] ProcessError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl VcsError {
    pub fn repository(err: impl std::fmt::Display) -> Self {
        VcsError::Repository(err.to_string())
    }
}

/// Errors from dispatching a notification
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notifier failed: {0}")]
    Process(#[from] ProcessError),
}

/// A failure confined to a single revision (or a single ref update when the
/// revision range itself could not be enumerated)
#[derive(Error, Debug)]
pub enum RevisionError {
    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Errors that abort the whole hook run
#[derive(Error, Debug)]
pub enum HookError {
    #[error("Malformed hook input on line {line_number}: expected '<oldrev> <newrev> <refname>', got {line:?}")]
    MalformedInputLine { line_number: usize, line: String },

    #[error("Failed to read hook input: {0}")]
    Input(#[from] std::io::Error),
}

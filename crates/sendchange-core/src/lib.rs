//! # sendchange-core
//!
//! Commit metadata extraction and categorizing for the sendchange hook.
//!
//! ## Overview
//!
//! For every revision a push introduces, the hook:
//! - queries the VCS for the revision's raw metadata
//! - parses it into a [`CommitMetadata`] (changed files, author, log message)
//! - derives a category from the changed files
//! - hands a [`NotificationRequest`] to a [`Notifier`]
//!
//! ## Key Types
//!
//! - [`HookRunner`] - Batch driver over hook input
//! - [`VcsBackend`] - Git or SVN metadata source
//! - [`Notifier`] - Build master notification
//! - [`NotifierConfig`] - Immutable run configuration
//! - [`ProcessRunner`] - Argument-vector process execution

mod category;
mod error;
mod metadata;
mod process;
mod ref_update;
mod report;
mod request;
mod runner;
mod settings;
mod traits;

pub use category::{categorize, DEFAULT_CATEGORY, DEFAULT_CATEGORY_MARKER};
pub use error::{HookError, NotifyError, ParseError, RevisionError, VcsError};
pub use metadata::{parse_git_show, parse_svnlook, sanitize_author, CommitMetadata};
pub use process::{ProcessError, ProcessOutput, ProcessRunner};
pub use ref_update::RefUpdate;
pub use report::{BatchReport, RevisionFailure, RevisionOutcome};
pub use request::{NotificationRequest, VcsKind};
pub use runner::{read_ref_updates, HookRunner};
pub use settings::{
    NotifierConfig, DEFAULT_BRANCH, DEFAULT_MASTER, DEFAULT_NOTIFIER, DEFAULT_REPOSITORY,
};
pub use traits::{Notifier, VcsBackend};

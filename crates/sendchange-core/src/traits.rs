use async_trait::async_trait;

use crate::error::{NotifyError, VcsError};
use crate::metadata::CommitMetadata;
use crate::ref_update::RefUpdate;
use crate::request::{NotificationRequest, VcsKind};

/// A version control system the hook can read commits from.
///
/// Git and SVN differ only in how revisions are enumerated and how their
/// metadata is queried; the runner treats them identically.
#[async_trait]
pub trait VcsBackend: Send + Sync {
    fn kind(&self) -> VcsKind;

    /// Revisions introduced by `update`, oldest first
    async fn revisions(&self, update: &RefUpdate) -> Result<Vec<String>, VcsError>;

    /// Query and parse the metadata of one revision
    async fn metadata(&self, revision: &str) -> Result<CommitMetadata, VcsError>;
}

/// Something that tells the build master about a revision
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, request: &NotificationRequest) -> Result<(), NotifyError>;
}

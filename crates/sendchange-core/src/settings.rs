use std::path::PathBuf;

use crate::category::{DEFAULT_CATEGORY, DEFAULT_CATEGORY_MARKER};
use crate::request::VcsKind;

pub const DEFAULT_MASTER: &str = "localhost:9990";
pub const DEFAULT_REPOSITORY: &str = "git://git.reactos.org/reactos.git";
pub const DEFAULT_BRANCH: &str = "refs/heads/master";
pub const DEFAULT_NOTIFIER: &str = "buildbot";

/// Immutable settings for one hook run.
///
/// Built once at startup and handed by reference to the backends, the
/// notifier and the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Which VCS backend produces the metadata
    pub vcs: VcsKind,
    /// Repository on disk (git dir or svn repos path)
    pub repo_path: PathBuf,
    /// Buildbot master address (`host:port`)
    pub master: String,
    /// Repository identifier reported to the master
    pub repository: String,
    /// Full name of the tracked ref, e.g. `refs/heads/master`
    pub branch: String,
    /// Notifier binary
    pub notifier: PathBuf,
    pub git: PathBuf,
    pub svnlook: PathBuf,
    /// Path component that marks the test subtree
    pub category_marker: String,
    /// Category sent for revisions touching the marker
    pub category: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            vcs: VcsKind::Git,
            repo_path: PathBuf::from("."),
            master: DEFAULT_MASTER.to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            notifier: PathBuf::from(DEFAULT_NOTIFIER),
            git: PathBuf::from("git"),
            svnlook: PathBuf::from("svnlook"),
            category_marker: DEFAULT_CATEGORY_MARKER.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl NotifierConfig {
    pub fn new(vcs: VcsKind, repo_path: PathBuf) -> Self {
        Self {
            vcs,
            repo_path,
            ..Default::default()
        }
    }

    /// Branch designator sent to the master: the tracked ref without its
    /// `refs/heads/` prefix
    pub fn branch_name(&self) -> &str {
        self.branch
            .strip_prefix("refs/heads/")
            .unwrap_or(&self.branch)
    }
}

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use sendchange_core::{
    parse_svnlook, CommitMetadata, NotifierConfig, ProcessRunner, RefUpdate, VcsBackend,
    VcsError, VcsKind,
};

/// Reads commits from a Subversion repository through `svnlook`
pub struct SvnBackend {
    repo_path: PathBuf,
    svnlook: PathBuf,
    runner: ProcessRunner,
}

impl SvnBackend {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            svnlook: PathBuf::from("svnlook"),
            runner: ProcessRunner::new(),
        }
    }

    pub fn from_config(config: &NotifierConfig) -> Self {
        Self::new(&config.repo_path).with_svnlook_binary(&config.svnlook)
    }

    pub fn with_svnlook_binary(mut self, svnlook: impl Into<PathBuf>) -> Self {
        self.svnlook = svnlook.into();
        self
    }

    async fn svnlook(&self, subcommand: &str, revision: &str) -> Result<String, VcsError> {
        let args = vec![
            subcommand.to_string(),
            "-r".to_string(),
            revision.to_string(),
            self.repo_path.display().to_string(),
        ];

        let output = self.runner.run_checked(&self.svnlook, &args, None).await?;
        Ok(output.stdout)
    }
}

/// Largest number of revisions a single update may cover
pub const MAX_REVISION_SPAN: u64 = 10_000;

/// Revisions after `old_rev` up to and including `new_rev`
pub fn numeric_range(update: &RefUpdate) -> Result<Vec<String>, VcsError> {
    let old = parse_revision_number(&update.old_rev)?;
    let new = parse_revision_number(&update.new_rev)?;

    if new < old {
        return Err(VcsError::InvalidRevision {
            revision: update.new_rev.clone(),
            reason: format!("older than {}", update.old_rev),
        });
    }
    if new - old > MAX_REVISION_SPAN {
        return Err(VcsError::InvalidRevision {
            revision: update.new_rev.clone(),
            reason: format!(
                "{} revisions after {}, more than {} in one update",
                new - old,
                update.old_rev,
                MAX_REVISION_SPAN
            ),
        });
    }

    // new >= old, so an empty range is the only case where old + 1 overflows
    let first = match old.checked_add(1) {
        Some(first) => first,
        None => return Ok(Vec::new()),
    };

    Ok((first..=new).map(|rev| rev.to_string()).collect())
}

fn parse_revision_number(rev: &str) -> Result<u64, VcsError> {
    rev.trim_start_matches('r')
        .parse()
        .map_err(|_| VcsError::InvalidRevision {
            revision: rev.to_string(),
            reason: "not a revision number".to_string(),
        })
}

#[async_trait]
impl VcsBackend for SvnBackend {
    fn kind(&self) -> VcsKind {
        VcsKind::Svn
    }

    async fn revisions(&self, update: &RefUpdate) -> Result<Vec<String>, VcsError> {
        numeric_range(update)
    }

    async fn metadata(&self, revision: &str) -> Result<CommitMetadata, VcsError> {
        parse_revision_number(revision)?;

        let changed = self.svnlook("changed", revision).await?;
        let author = self.svnlook("author", revision).await?;
        let log = self.svnlook("log", revision).await?;

        debug!(
            revision,
            repo = %self.repo_path.display(),
            "Queried svnlook"
        );

        Ok(parse_svnlook(revision, &changed, &author, &log)?)
    }
}

use async_trait::async_trait;
use git2::{BranchType, Oid, Repository, Sort};
use std::path::PathBuf;
use tracing::debug;

use sendchange_core::{
    parse_git_show, CommitMetadata, NotifierConfig, ProcessRunner, RefUpdate, VcsBackend,
    VcsError, VcsKind,
};

/// Reads commits from a git repository.
///
/// Revision ranges are walked with libgit2; per-revision metadata comes from
/// `git show --raw --pretty=full`, which is what the parser understands.
pub struct GitBackend {
    repo_path: PathBuf,
    git: PathBuf,
    runner: ProcessRunner,
}

impl GitBackend {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        let repo_path = repo_path.into();
        Self {
            runner: ProcessRunner::new().with_working_dir(&repo_path),
            repo_path,
            git: PathBuf::from("git"),
        }
    }

    pub fn from_config(config: &NotifierConfig) -> Self {
        Self::new(&config.repo_path).with_git_binary(&config.git)
    }

    pub fn with_git_binary(mut self, git: impl Into<PathBuf>) -> Self {
        self.git = git.into();
        self
    }

    /// Commits reachable from `update.new_rev` but not from `update.old_rev`,
    /// parents before children.
    ///
    /// When the ref is new, everything reachable from another local branch is
    /// excluded instead, so only commits new to the repository show up.
    pub fn revision_range(&self, update: &RefUpdate) -> Result<Vec<String>, VcsError> {
        let repo = Repository::discover(&self.repo_path).map_err(VcsError::repository)?;

        let new_oid = resolve_commit(&repo, &update.new_rev)?;

        let mut walk = repo.revwalk().map_err(VcsError::repository)?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)
            .map_err(VcsError::repository)?;
        walk.push(new_oid).map_err(VcsError::repository)?;

        if update.is_creation() {
            for tip in other_branch_tips(&repo, &update.ref_name)? {
                walk.hide(tip).map_err(VcsError::repository)?;
            }
        } else {
            let old_oid = resolve_commit(&repo, &update.old_rev)?;
            walk.hide(old_oid).map_err(VcsError::repository)?;
        }

        let revisions = walk
            .map(|oid| oid.map(|oid| oid.to_string()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(VcsError::repository)?;

        debug!(
            ref_name = %update.ref_name,
            created = update.is_creation(),
            count = revisions.len(),
            "Walked revision range"
        );

        Ok(revisions)
    }
}

fn resolve_commit(repo: &Repository, rev: &str) -> Result<Oid, VcsError> {
    repo.revparse_single(rev)
        .and_then(|object| object.peel_to_commit())
        .map(|commit| commit.id())
        .map_err(|e| VcsError::InvalidRevision {
            revision: rev.to_string(),
            reason: e.message().to_string(),
        })
}

fn other_branch_tips(repo: &Repository, ref_name: &str) -> Result<Vec<Oid>, VcsError> {
    let mut tips = Vec::new();

    for branch in repo
        .branches(Some(BranchType::Local))
        .map_err(VcsError::repository)?
    {
        let (branch, _) = branch.map_err(VcsError::repository)?;
        let reference = branch.get();

        if reference.name() == Some(ref_name) {
            continue;
        }
        if let Some(oid) = reference.target() {
            tips.push(oid);
        }
    }

    Ok(tips)
}

#[async_trait]
impl VcsBackend for GitBackend {
    fn kind(&self) -> VcsKind {
        VcsKind::Git
    }

    async fn revisions(&self, update: &RefUpdate) -> Result<Vec<String>, VcsError> {
        self.revision_range(update)
    }

    async fn metadata(&self, revision: &str) -> Result<CommitMetadata, VcsError> {
        let args: Vec<String> = [
            "-c",
            "core.quotepath=off",
            "show",
            "--raw",
            "--pretty=full",
            "--encoding=UTF-8",
            revision,
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect();

        let output = self.runner.run_checked(&self.git, &args, None).await?;

        Ok(parse_git_show(revision, &output.stdout)?)
    }
}

use serde::{Deserialize, Serialize};

use crate::category::categorize;
use crate::metadata::CommitMetadata;
use crate::settings::NotifierConfig;

/// Supported version control systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    Git,
    Svn,
}

impl std::fmt::Display for VcsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VcsKind::Git => write!(f, "git"),
            VcsKind::Svn => write!(f, "svn"),
        }
    }
}

/// Everything the notifier is told about one revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    pub revision: String,
    pub author: String,
    pub repository: String,
    pub master: String,
    pub branch: String,
    pub vcs_kind: VcsKind,
    pub category: Option<String>,
    pub files: Vec<String>,
    pub log_message: String,
}

impl NotificationRequest {
    /// Derive a request from parsed metadata.
    ///
    /// Returns `None` for revisions without changed files; those are never
    /// sent.
    pub fn from_metadata(metadata: CommitMetadata, config: &NotifierConfig) -> Option<Self> {
        if metadata.changed_files.is_empty() {
            return None;
        }

        let category = categorize(
            &metadata.changed_files,
            &config.category_marker,
            &config.category,
        )
        .map(str::to_string);

        Some(Self {
            revision: metadata.revision,
            author: metadata.author,
            repository: config.repository.clone(),
            master: config.master.clone(),
            branch: config.branch_name().to_string(),
            vcs_kind: config.vcs,
            category,
            files: metadata.changed_files,
            log_message: metadata.log_message,
        })
    }

    /// Arguments for `buildbot sendchange`, binary excluded.
    ///
    /// The log message is read from stdin (`--logfile -`); the files follow
    /// `--` so that a path starting with `-` stays positional.
    pub fn sendchange_args(&self) -> Vec<String> {
        let mut args = vec![
            "sendchange".to_string(),
            "--master".to_string(),
            self.master.clone(),
            "--repository".to_string(),
            self.repository.clone(),
            "--branch".to_string(),
            self.branch.clone(),
            "--revision".to_string(),
            self.revision.clone(),
            "--who".to_string(),
            self.author.clone(),
            "--vc".to_string(),
            self.vcs_kind.to_string(),
        ];

        if let Some(ref category) = self.category {
            args.push("--category".to_string());
            args.push(category.clone());
        }

        args.push("--logfile".to_string());
        args.push("-".to_string());
        args.push("--".to_string());
        args.extend(self.files.iter().cloned());

        args
    }
}

//! Configuration file support for sendchange.
//!
//! Settings come from `sendchange.toml`, looked up in the repository
//! directory and then in the user config directory. Command line flags
//! override the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use sendchange_core::{NotifierConfig, VcsKind};
use sendchange_logging::LogFormat;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "sendchange.toml";

/// Settings loaded from `sendchange.toml`. Every key is optional.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub vcs: Option<VcsKind>,
    pub repo_path: Option<PathBuf>,
    /// Buildbot master address (`host:port`)
    pub master: Option<String>,
    /// Repository identifier reported to the master
    pub repository: Option<String>,
    /// Tracked ref, e.g. `refs/heads/master`
    pub branch: Option<String>,
    /// Path to the `buildbot` binary
    pub notifier: Option<PathBuf>,
    pub git: Option<PathBuf>,
    pub svnlook: Option<PathBuf>,
    pub category_marker: Option<String>,
    pub category: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
}

impl FileConfig {
    /// Load configuration from an explicit path. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Look for `sendchange.toml` in `repo_dir`, then in the user config
    /// directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if a file exists and parses successfully
    /// - `Ok(None)` if there is no file
    /// - `Err(...)` if a file exists but fails to parse (hard error)
    pub fn discover(repo_dir: &Path) -> Result<Option<Self>> {
        let candidates = [
            Some(repo_dir.join(CONFIG_FILE_NAME)),
            dirs::config_dir().map(|dir| dir.join("sendchange").join(CONFIG_FILE_NAME)),
        ];

        for path in candidates.into_iter().flatten() {
            if path.exists() {
                return Self::load(&path).map(Some);
            }
        }

        Ok(None)
    }

    /// Overlay the keys present in the file on `config`
    pub fn apply(&self, config: &mut NotifierConfig) {
        if let Some(vcs) = self.vcs {
            config.vcs = vcs;
        }
        if let Some(ref path) = self.repo_path {
            config.repo_path = path.clone();
        }
        if let Some(ref master) = self.master {
            config.master = master.clone();
        }
        if let Some(ref repository) = self.repository {
            config.repository = repository.clone();
        }
        if let Some(ref branch) = self.branch {
            config.branch = branch.clone();
        }
        if let Some(ref notifier) = self.notifier {
            config.notifier = notifier.clone();
        }
        if let Some(ref git) = self.git {
            config.git = git.clone();
        }
        if let Some(ref svnlook) = self.svnlook {
            config.svnlook = svnlook.clone();
        }
        if let Some(ref marker) = self.category_marker {
            config.category_marker = marker.clone();
        }
        if let Some(ref category) = self.category {
            config.category = category.clone();
        }
    }
}

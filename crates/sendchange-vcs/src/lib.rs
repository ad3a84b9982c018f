//! # sendchange-vcs
//!
//! Version control backends for the sendchange hook.
//!
//! - [`GitBackend`] - libgit2 revision walks, `git show` metadata
//! - [`SvnBackend`] - numeric revision ranges, `svnlook` metadata
//!
//! Both implement [`sendchange_core::VcsBackend`]; [`create_backend`] picks
//! one from the configuration.

mod git;
mod svn;

pub use git::GitBackend;
pub use svn::{numeric_range, SvnBackend};

use sendchange_core::{NotifierConfig, VcsBackend, VcsKind};

/// Create the backend matching `config.vcs`
pub fn create_backend(config: &NotifierConfig) -> Box<dyn VcsBackend> {
    match config.vcs {
        VcsKind::Git => Box::new(GitBackend::from_config(config)),
        VcsKind::Svn => Box::new(SvnBackend::from_config(config)),
    }
}

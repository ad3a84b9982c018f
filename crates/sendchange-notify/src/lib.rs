mod buildbot;
mod dry_run;

pub use buildbot::BuildbotNotifier;
pub use dry_run::DryRunNotifier;

use sendchange_core::{Notifier, NotifierConfig};

/// Create the notifier for this run
pub fn create_notifier(config: &NotifierConfig, dry_run: bool) -> Box<dyn Notifier> {
    if dry_run {
        Box::new(DryRunNotifier::new(config.notifier.clone()))
    } else {
        Box::new(BuildbotNotifier::from_config(config))
    }
}

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use sendchange_core::{NotificationRequest, Notifier, NotifyError};

/// Logs the command that would run instead of running it
pub struct DryRunNotifier {
    binary_path: PathBuf,
}

impl DryRunNotifier {
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// The full command line, binary first
    pub fn command_line(&self, request: &NotificationRequest) -> Vec<String> {
        let mut argv = vec![self.binary_path.display().to_string()];
        argv.extend(request.sendchange_args());
        argv
    }
}

#[async_trait]
impl Notifier for DryRunNotifier {
    fn name(&self) -> &str {
        "dry run"
    }

    async fn notify(&self, request: &NotificationRequest) -> Result<(), NotifyError> {
        info!(
            revision = %request.revision,
            argv = ?self.command_line(request),
            log_len = request.log_message.len(),
            "Dry run, not running sendchange"
        );
        Ok(())
    }
}

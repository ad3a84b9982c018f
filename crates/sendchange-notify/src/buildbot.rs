use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use sendchange_core::{NotificationRequest, Notifier, NotifierConfig, NotifyError, ProcessRunner};

/// Notifies a buildbot master by running `buildbot sendchange`
pub struct BuildbotNotifier {
    binary_path: PathBuf,
    runner: ProcessRunner,
}

impl BuildbotNotifier {
    pub fn with_binary_path(path: PathBuf) -> Self {
        Self {
            binary_path: path,
            runner: ProcessRunner::new(),
        }
    }

    pub fn from_config(config: &NotifierConfig) -> Self {
        Self::with_binary_path(config.notifier.clone())
    }
}

#[async_trait]
impl Notifier for BuildbotNotifier {
    fn name(&self) -> &str {
        "buildbot sendchange"
    }

    async fn notify(&self, request: &NotificationRequest) -> Result<(), NotifyError> {
        let args = request.sendchange_args();

        debug!(
            revision = %request.revision,
            binary = %self.binary_path.display(),
            "Running sendchange"
        );

        let output = self
            .runner
            .run_checked(
                &self.binary_path,
                &args,
                Some(request.log_message.as_bytes()),
            )
            .await?;

        debug!(
            revision = %request.revision,
            duration_ms = output.duration.as_millis(),
            stdout = %output.stdout.trim(),
            "sendchange finished"
        );

        Ok(())
    }
}

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::error::{HookError, RevisionError};
use crate::ref_update::RefUpdate;
use crate::report::{BatchReport, RevisionOutcome};
use crate::request::NotificationRequest;
use crate::settings::NotifierConfig;
use crate::traits::{Notifier, VcsBackend};

/// Drives the hook: ref updates in, one notification per new revision out
pub struct HookRunner<'a> {
    backend: &'a dyn VcsBackend,
    notifier: &'a dyn Notifier,
    config: &'a NotifierConfig,
}

impl<'a> HookRunner<'a> {
    pub fn new(
        backend: &'a dyn VcsBackend,
        notifier: &'a dyn Notifier,
        config: &'a NotifierConfig,
    ) -> Self {
        Self {
            backend,
            notifier,
            config,
        }
    }

    /// Process hook input (`<oldrev> <newrev> <refname>` per line).
    ///
    /// The whole input is read and validated before anything is sent, so a
    /// malformed line aborts the run without partial notifications.
    /// Failures of individual revisions are collected in the report.
    pub async fn run<R>(&self, input: R) -> Result<BatchReport, HookError>
    where
        R: AsyncBufRead + Unpin,
    {
        let updates = read_ref_updates(input).await?;

        info!(
            ref_updates = updates.len(),
            vcs = %self.backend.kind(),
            notifier = self.notifier.name(),
            "Processing hook input"
        );

        let mut report = BatchReport::default();
        for update in &updates {
            self.process_update(update, &mut report).await;
        }

        info!(
            notified = report.notified.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "Hook run finished"
        );

        Ok(report)
    }

    /// Process explicitly named revisions, bypassing ref filtering
    pub async fn run_revisions(&self, revisions: &[String]) -> BatchReport {
        let mut report = BatchReport::default();
        for revision in revisions {
            self.process_and_record(&self.config.branch, revision, &mut report)
                .await;
        }
        report
    }

    async fn process_update(&self, update: &RefUpdate, report: &mut BatchReport) {
        report.ref_updates += 1;

        if update.ref_name != self.config.branch {
            debug!(ref_name = %update.ref_name, "Ignoring untracked ref");
            report.ignored_ref_updates += 1;
            return;
        }

        if update.is_deletion() {
            info!(ref_name = %update.ref_name, "Ignoring branch deletion");
            report.ignored_ref_updates += 1;
            return;
        }

        let revisions = match self.backend.revisions(update).await {
            Ok(revisions) => revisions,
            Err(e) => {
                warn!(
                    ref_name = %update.ref_name,
                    old_rev = %update.old_rev,
                    new_rev = %update.new_rev,
                    error = %e,
                    "Failed to enumerate revisions"
                );
                report.record_failure(&update.ref_name, None, e);
                return;
            }
        };

        debug!(
            ref_name = %update.ref_name,
            count = revisions.len(),
            "Enumerated revisions"
        );

        for revision in &revisions {
            self.process_and_record(&update.ref_name, revision, report)
                .await;
        }
    }

    async fn process_and_record(&self, ref_name: &str, revision: &str, report: &mut BatchReport) {
        match self.process_revision(revision).await {
            Ok(outcome) => report.record(revision, outcome),
            Err(e) => {
                warn!(revision, error = %e, "Failed to process revision");
                report.record_failure(ref_name, Some(revision), e);
            }
        }
    }

    /// Parse, categorize and dispatch a single revision
    pub async fn process_revision(&self, revision: &str) -> Result<RevisionOutcome, RevisionError> {
        let metadata = self.backend.metadata(revision).await?;

        let Some(request) = NotificationRequest::from_metadata(metadata, self.config) else {
            info!(revision, "No changed files, not notifying");
            return Ok(RevisionOutcome::Skipped);
        };

        self.notifier.notify(&request).await?;

        info!(
            revision,
            author = %request.author,
            files = request.files.len(),
            category = request.category.as_deref().unwrap_or("-"),
            "Notified build master"
        );

        Ok(RevisionOutcome::Notified {
            category: request.category,
        })
    }
}

/// Read and validate every hook input line. Blank lines are skipped.
pub async fn read_ref_updates<R>(input: R) -> Result<Vec<RefUpdate>, HookError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut updates = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        updates.push(RefUpdate::parse_line(&line, line_number)?);
    }

    Ok(updates)
}

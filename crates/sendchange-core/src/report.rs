use serde::Serialize;

/// What happened to a single revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionOutcome {
    /// The notifier accepted the revision
    Notified { category: Option<String> },
    /// No changed files, nothing was sent
    Skipped,
}

/// A revision (or a whole ref update) that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionFailure {
    pub ref_name: String,
    /// `None` when the revision range itself could not be enumerated
    pub revision: Option<String>,
    pub error: String,
}

/// Summary of one hook run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub ref_updates: usize,
    /// Ref updates for untracked refs, or branch deletions
    pub ignored_ref_updates: usize,
    pub notified: Vec<String>,
    pub skipped: Vec<String>,
    pub failures: Vec<RevisionFailure>,
}

impl BatchReport {
    pub fn record(&mut self, revision: &str, outcome: RevisionOutcome) {
        match outcome {
            RevisionOutcome::Notified { .. } => self.notified.push(revision.to_string()),
            RevisionOutcome::Skipped => self.skipped.push(revision.to_string()),
        }
    }

    pub fn record_failure(
        &mut self,
        ref_name: &str,
        revision: Option<&str>,
        error: impl std::fmt::Display,
    ) {
        self.failures.push(RevisionFailure {
            ref_name: ref_name.to_string(),
            revision: revision.map(str::to_string),
            error: error.to_string(),
        });
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// 0 when every revision went through, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

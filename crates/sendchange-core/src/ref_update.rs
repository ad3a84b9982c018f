use serde::Serialize;

use crate::error::HookError;

/// One line of hook input: `<oldrev> <newrev> <refname>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefUpdate {
    pub old_rev: String,
    pub new_rev: String,
    pub ref_name: String,
}

impl RefUpdate {
    pub fn new(
        old_rev: impl Into<String>,
        new_rev: impl Into<String>,
        ref_name: impl Into<String>,
    ) -> Self {
        Self {
            old_rev: old_rev.into(),
            new_rev: new_rev.into(),
            ref_name: ref_name.into(),
        }
    }

    /// Parse a hook input line. `line_number` is 1-based and only used for
    /// the error.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Self, HookError> {
        let fields: Vec<&str> = line.split_whitespace().collect();

        match fields.as_slice() {
            [old_rev, new_rev, ref_name] => Ok(Self::new(*old_rev, *new_rev, *ref_name)),
            _ => Err(HookError::MalformedInputLine {
                line_number,
                line: line.to_string(),
            }),
        }
    }

    /// The ref did not exist before this push
    pub fn is_creation(&self) -> bool {
        is_null_revision(&self.old_rev)
    }

    /// The ref was removed by this push
    pub fn is_deletion(&self) -> bool {
        is_null_revision(&self.new_rev)
    }
}

/// Git reports a missing side of a ref update as all zeros
fn is_null_revision(rev: &str) -> bool {
    !rev.is_empty() && rev.bytes().all(|b| b == b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZEROS: &str = "0000000000000000000000000000000000000000";

    #[test]
    fn test_parse_line() {
        let update = RefUpdate::parse_line("aaa bbb refs/heads/master", 1).unwrap();
        assert_eq!(update, RefUpdate::new("aaa", "bbb", "refs/heads/master"));
    }

    #[test]
    fn test_parse_line_tolerates_extra_whitespace() {
        let update = RefUpdate::parse_line("  aaa\tbbb   refs/tags/0.4.7 \r", 3).unwrap();
        assert_eq!(update.ref_name, "refs/tags/0.4.7");
    }

    #[test]
    fn test_parse_line_rejects_wrong_field_count() {
        for line in ["aaa bbb", "aaa bbb refs/heads/master extra", "single"] {
            match RefUpdate::parse_line(line, 7) {
                Err(HookError::MalformedInputLine { line_number, line: l }) => {
                    assert_eq!(line_number, 7);
                    assert_eq!(l, line);
                }
                other => panic!("expected MalformedInputLine, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_creation_and_deletion() {
        let created = RefUpdate::new(ZEROS, "bbb", "refs/heads/master");
        assert!(created.is_creation());
        assert!(!created.is_deletion());

        let deleted = RefUpdate::new("aaa", ZEROS, "refs/heads/master");
        assert!(deleted.is_deletion());
        assert!(!deleted.is_creation());
    }
}

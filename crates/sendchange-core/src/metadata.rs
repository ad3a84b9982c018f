//! Parsing of raw VCS output into [`CommitMetadata`].
//!
//! Two input shapes are understood:
//!
//! - Git: the combined output of `git show --raw --pretty=full <rev>`
//! - SVN: the separate outputs of `svnlook changed`, `svnlook author` and
//!   `svnlook log`
//!
//! Both parsers are pure functions of their input text.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::ParseError;

/// Indentation git uses for commit message lines in `--pretty=full`
const MESSAGE_INDENT: &str = "    ";

/// Width of the status columns in `svnlook changed` output
const SVN_STATUS_WIDTH: usize = 4;

/// Characters never allowed in an author handed to the notifier
const FORBIDDEN_AUTHOR_CHARS: &[char] = &[
    '!', '"', '#', '$', '%', '&', '\'', '*', '/', ':', ';', '?', '\\', '^', '`',
];

lazy_static! {
    // `:100644 100644 1a2b3c4 5d6e7f8 M\tpath`, or `::...` with one more
    // mode/hash column per parent for merges. Modes and hashes are hex, so
    // the status letters can't be confused with them.
    static ref RAW_CHANGE: Regex =
        Regex::new(r"^:+[0-9a-f. ]+ ([MAD]+)\t(.+)$").expect("raw change pattern is valid");
    static ref AUTHOR_LINE: Regex =
        Regex::new(r"^Author:\s+(.+)$").expect("author pattern is valid");
}

/// Metadata of a single revision, as far as the notifier cares
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitMetadata {
    pub revision: String,
    pub author: String,
    /// Changed paths in the order the VCS reported them
    pub changed_files: Vec<String>,
    /// Commit message with its original line breaks
    pub log_message: String,
}

/// Parse the output of `git show --raw --pretty=full` for one revision
pub fn parse_git_show(revision: &str, raw: &str) -> Result<CommitMetadata, ParseError> {
    let mut author: Option<String> = None;
    let mut author_seen = false;
    let mut changed_files = Vec::new();
    let mut log_message = String::new();

    for line in raw.split_inclusive('\n') {
        if let Some(message_line) = line.strip_prefix(MESSAGE_INDENT) {
            log_message.push_str(message_line);
            continue;
        }

        let line = line.trim_end_matches(['\n', '\r']);

        if let Some(caps) = RAW_CHANGE.captures(line) {
            changed_files.push(unquote_path(&caps[2]));
            continue;
        }

        if !author_seen {
            if let Some(caps) = AUTHOR_LINE.captures(line) {
                author_seen = true;
                author = sanitize_author(&caps[1]);
            }
        }
    }

    finish(revision, author, changed_files, log_message)
}

/// Parse the outputs of `svnlook changed`, `svnlook author` and `svnlook log`
/// for one revision
pub fn parse_svnlook(
    revision: &str,
    changed: &str,
    author: &str,
    log: &str,
) -> Result<CommitMetadata, ParseError> {
    let changed_files = changed
        .lines()
        .filter_map(|line| line.get(SVN_STATUS_WIDTH..))
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect();

    let author = author.lines().next().and_then(sanitize_author);

    finish(revision, author, changed_files, log.to_string())
}

/// Undo git's C-style quoting of a path.
///
/// `core.quotepath=off` keeps non-ASCII bytes as they are, but paths with a
/// double quote, backslash or control character still come back as
/// `"dir/we\"ird.c"`. Unquoted paths are returned unchanged.
fn unquote_path(path: &str) -> String {
    let inner = match path
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner,
        None => return path.to_string(),
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut rest = inner.as_bytes();

    while let Some((&byte, tail)) = rest.split_first() {
        rest = tail;
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }

        let Some((&escaped, tail)) = rest.split_first() else {
            bytes.push(b'\\');
            break;
        };
        rest = tail;

        let unescaped = match escaped {
            b'a' => 0x07,
            b'b' => 0x08,
            b't' => b'\t',
            b'n' => b'\n',
            b'v' => 0x0b,
            b'f' => 0x0c,
            b'r' => b'\r',
            b'0'..=b'3' if rest.len() >= 2 && is_octal(rest[0]) && is_octal(rest[1]) => {
                let value = (escaped - b'0') * 64 + (rest[0] - b'0') * 8 + (rest[1] - b'0');
                rest = &rest[2..];
                value
            }
            other => other,
        };
        bytes.push(unescaped);
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

fn is_octal(byte: u8) -> bool {
    (b'0'..=b'7').contains(&byte)
}

fn finish(
    revision: &str,
    author: Option<String>,
    changed_files: Vec<String>,
    log_message: String,
) -> Result<CommitMetadata, ParseError> {
    let author = author.ok_or_else(|| ParseError::MissingAuthor {
        revision: revision.to_string(),
    })?;

    debug!(
        revision,
        author = %author,
        files = changed_files.len(),
        log_len = log_message.len(),
        "Parsed commit metadata"
    );

    Ok(CommitMetadata {
        revision: revision.to_string(),
        author,
        changed_files,
        log_message,
    })
}

/// Strip characters that are unsafe in an argument, collapse whitespace.
///
/// Returns `None` when nothing usable is left.
pub fn sanitize_author(raw: &str) -> Option<String> {
    let stripped: String = raw
        .chars()
        .filter(|c| !FORBIDDEN_AUTHOR_CHARS.contains(c))
        .collect();

    let author = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if author.is_empty() {
        None
    } else {
        Some(author)
    }
}

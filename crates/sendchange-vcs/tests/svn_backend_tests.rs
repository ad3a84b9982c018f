#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use sendchange_core::{RefUpdate, VcsBackend, VcsError, VcsKind};
use sendchange_vcs::SvnBackend;
use tempfile::TempDir;

/// Helper: an executable standing in for `svnlook`, answering for r73512
/// only and logging its arguments next to itself.
fn fake_svnlook(dir: &TempDir) -> PathBuf {
    let script = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/calls.log"
if [ "$3" != "73512" ]; then
    echo "svnlook: E160006: No such revision $3" >&2
    exit 1
fi
case "$1" in
    changed)
        printf 'U   trunk/reactos/dll/win32/kernel32/file.c\n'
        printf 'A   trunk/rostests/winetests/kernel32/file.c\n'
        ;;
    author)
        printf 'cfinck\n'
        ;;
    log)
        printf '[KERNEL32] Fix CreateFileW.\n\nSee issue #1234.\n'
        ;;
esac
"#;
    let path = dir.path().join("svnlook");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
async fn test_metadata_from_svnlook() {
    let dir = TempDir::new().unwrap();
    let backend = SvnBackend::new("/srv/svn/reactos").with_svnlook_binary(fake_svnlook(&dir));

    let metadata = backend.metadata("73512").await.unwrap();

    assert_eq!(backend.kind(), VcsKind::Svn);
    assert_eq!(metadata.author, "cfinck");
    assert_eq!(
        metadata.changed_files,
        vec![
            "trunk/reactos/dll/win32/kernel32/file.c",
            "trunk/rostests/winetests/kernel32/file.c",
        ]
    );
    assert_eq!(
        metadata.log_message,
        "[KERNEL32] Fix CreateFileW.\n\nSee issue #1234.\n"
    );

    let calls = fs::read_to_string(dir.path().join("calls.log")).unwrap();
    assert_eq!(
        calls,
        "changed -r 73512 /srv/svn/reactos\n\
author -r 73512 /srv/svn/reactos\n\
log -r 73512 /srv/svn/reactos\n"
    );
}

#[tokio::test]
async fn test_svnlook_failure_is_a_query_error() {
    let dir = TempDir::new().unwrap();
    let backend = SvnBackend::new("/srv/svn/reactos").with_svnlook_binary(fake_svnlook(&dir));

    let err = backend.metadata("99999").await.unwrap_err();
    assert!(matches!(err, VcsError::Query(_)));
    assert!(err.to_string().contains("No such revision"));
}

#[tokio::test]
async fn test_non_numeric_revision_is_rejected_before_querying() {
    let dir = TempDir::new().unwrap();
    let backend = SvnBackend::new("/srv/svn/reactos").with_svnlook_binary(fake_svnlook(&dir));

    let err = backend.metadata("HEAD; rm -rf /").await.unwrap_err();
    assert!(matches!(err, VcsError::InvalidRevision { .. }));
    assert!(!dir.path().join("calls.log").exists());
}

#[tokio::test]
async fn test_revisions_are_numeric_range() {
    let backend = SvnBackend::new("/srv/svn/reactos");
    let update = RefUpdate::new("73510", "73512", "trunk");

    assert_eq!(
        backend.revisions(&update).await.unwrap(),
        vec!["73511", "73512"]
    );
}

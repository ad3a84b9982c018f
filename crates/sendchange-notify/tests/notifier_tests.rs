#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use sendchange_core::{
    CommitMetadata, NotificationRequest, Notifier, NotifierConfig, NotifyError, ProcessError,
};
use sendchange_notify::{create_notifier, BuildbotNotifier, DryRunNotifier};
use tempfile::TempDir;

/// Helper: an executable standing in for `buildbot` that records its
/// arguments (one per line) and stdin, then exits with `exit_code`.
fn fake_buildbot(dir: &TempDir, exit_code: i32) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
out="$(dirname "$0")"
for arg in "$@"; do
    printf '%s\n' "$arg" >> "$out/argv.txt"
done
cat > "$out/stdin.txt"
if [ {code} -ne 0 ]; then
    echo "failed to connect to master" >&2
fi
exit {code}
"#,
        code = exit_code
    );
    let path = dir.path().join("buildbot");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn request(author: &str, files: &[&str]) -> NotificationRequest {
    let metadata = CommitMetadata {
        revision: "bbb".to_string(),
        author: author.to_string(),
        changed_files: files.iter().map(|f| f.to_string()).collect(),
        log_message: "Fix bug\n\nCORE-1234\n".to_string(),
    };
    NotificationRequest::from_metadata(metadata, &NotifierConfig::default()).unwrap()
}

#[tokio::test]
async fn test_sendchange_receives_argv_and_log_on_stdin() {
    let dir = TempDir::new().unwrap();
    let notifier = BuildbotNotifier::with_binary_path(fake_buildbot(&dir, 0));

    notifier
        .notify(&request("Colin Finck", &["rostests/foo.c", "base/my file.c"]))
        .await
        .unwrap();

    let argv = fs::read_to_string(dir.path().join("argv.txt")).unwrap();
    let argv: Vec<&str> = argv.lines().collect();
    assert_eq!(
        argv,
        vec![
            "sendchange",
            "--master",
            "localhost:9990",
            "--repository",
            "git://git.reactos.org/reactos.git",
            "--branch",
            "master",
            "--revision",
            "bbb",
            "--who",
            "Colin Finck",
            "--vc",
            "git",
            "--category",
            "rostests",
            "--logfile",
            "-",
            "--",
            "rostests/foo.c",
            "base/my file.c",
        ]
    );

    let stdin = fs::read_to_string(dir.path().join("stdin.txt")).unwrap();
    assert_eq!(stdin, "Fix bug\n\nCORE-1234\n");
}

#[tokio::test]
async fn test_shell_metacharacters_stay_literal() {
    let dir = TempDir::new().unwrap();
    let notifier = BuildbotNotifier::with_binary_path(fake_buildbot(&dir, 0));

    notifier
        .notify(&request("Dev <dev@example.org>", &["$(touch pwned).c", "a|b.c"]))
        .await
        .unwrap();

    let argv = fs::read_to_string(dir.path().join("argv.txt")).unwrap();
    assert!(argv.lines().any(|l| l == "$(touch pwned).c"));
    assert!(argv.lines().any(|l| l == "a|b.c"));
    assert!(argv.lines().any(|l| l == "Dev <dev@example.org>"));
    assert!(!dir.path().join("pwned").exists());
}

#[tokio::test]
async fn test_non_zero_exit_is_an_error() {
    let dir = TempDir::new().unwrap();
    let notifier = BuildbotNotifier::with_binary_path(fake_buildbot(&dir, 2));

    let err = notifier
        .notify(&request("Colin Finck", &["foo.c"]))
        .await
        .unwrap_err();

    match err {
        NotifyError::Process(ProcessError::NonZeroExit {
            exit_code, stderr, ..
        }) => {
            assert_eq!(exit_code, 2);
            assert_eq!(stderr, "failed to connect to master");
        }
        other => panic!("expected NonZeroExit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_binary_is_an_error() {
    let notifier =
        BuildbotNotifier::with_binary_path(PathBuf::from("/nonexistent/buildbot-for-tests"));

    let err = notifier
        .notify(&request("Colin Finck", &["foo.c"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        NotifyError::Process(ProcessError::SpawnFailed { .. })
    ));
}

#[tokio::test]
async fn test_dry_run_spawns_nothing() {
    let dir = TempDir::new().unwrap();
    let binary = fake_buildbot(&dir, 0);
    let notifier = DryRunNotifier::new(binary.clone());
    let req = request("Colin Finck", &["foo.c"]);

    notifier.notify(&req).await.unwrap();

    assert!(!dir.path().join("argv.txt").exists());
    let argv = notifier.command_line(&req);
    assert_eq!(argv[0], binary.display().to_string());
    assert_eq!(argv[1], "sendchange");
    assert_eq!(argv.last().map(String::as_str), Some("foo.c"));
}

#[test]
fn test_create_notifier_picks_implementation() {
    let config = NotifierConfig::default();
    assert_eq!(create_notifier(&config, true).name(), "dry run");
    assert_eq!(create_notifier(&config, false).name(), "buildbot sendchange");
}

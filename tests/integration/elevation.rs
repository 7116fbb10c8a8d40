//! Elevation tests.
//!
//! Every privileged invocation needs its own accepted secret. A rejected or
//! unverifiable secret must never reach a privileged endpoint.

use folio_shell::shell::{InputMode, LineKind};

use crate::fixtures::{ApiCall, ShellHarness, SECRET};

/// Test: Accepted secret
/// Given `elevate update-server`
/// When the right secret is typed
/// Then the command runs with that secret as its bearer
#[tokio::test]
async fn test_accepted_secret_runs_command() {
    let mut h = ShellHarness::new();

    h.type_line("elevate update-server").await;
    assert_eq!(h.shell.state().pending_command(), Some("update-server"));

    h.type_line(SECRET).await;
    assert!(h.shell.state().is_idle());
    assert!(h.has_line(LineKind::Success, "[elevate] secret accepted"));
    assert_eq!(h.last().kind, LineKind::Success);
    assert_eq!(h.last().text, "Server will be updated shortly...");
    assert_eq!(
        h.api.calls(),
        vec![
            ApiCall::VerifySecret(SECRET.to_string()),
            ApiCall::UpdateServer {
                bearer: SECRET.to_string()
            },
        ]
    );
}

/// Test: The secret never appears in the transcript
#[tokio::test]
async fn test_secret_is_not_echoed() {
    let mut h = ShellHarness::new();
    h.elevate("update-server", SECRET).await;
    h.elevate("update-server", "wrong-guess").await;

    assert!(h.texts().iter().all(|t| !t.contains(SECRET)));
    assert!(h.texts().iter().all(|t| !t.contains("wrong-guess")));
}

/// Test: Wrong secret
/// Then "Sorry, try again." is shown and no privileged call is made.
#[tokio::test]
async fn test_wrong_secret_makes_no_privileged_call() {
    let mut h = ShellHarness::new();
    h.elevate("update-server", "nope").await;

    let last = h.last();
    assert_eq!(last.kind, LineKind::Error);
    assert_eq!(last.text, "Sorry, try again.");
    assert!(h.shell.state().is_idle());
    assert!(h.api.privileged_calls().is_empty());
}

/// Test: Verifier unreachable counts as a rejection
#[tokio::test]
async fn test_verifier_failure_fails_closed() {
    let mut h = ShellHarness::new();
    h.api.fail("verify");
    h.elevate("purge-all-cache", SECRET).await;

    assert_eq!(h.last().text, "Sorry, try again.");
    assert!(h.api.privileged_calls().is_empty());
}

/// Test: An empty secret is still sent for verification and rejected
#[tokio::test]
async fn test_empty_secret_is_rejected() {
    let mut h = ShellHarness::new();
    h.elevate("update-server", "").await;

    assert_eq!(h.api.calls(), vec![ApiCall::VerifySecret(String::new())]);
    assert_eq!(h.last().text, "Sorry, try again.");
}

/// Test: Correct secret, failing endpoint
/// Then the acceptance line is followed by the command's own error.
#[tokio::test]
async fn test_failing_update_after_accepted_secret() {
    let mut h = ShellHarness::new();
    h.api.fail("update-server");
    h.elevate("update-server", SECRET).await;

    let lines = h.lines();
    let n = lines.len();
    assert_eq!(lines[n - 2].text, "[elevate] secret accepted");
    assert_eq!(lines[n - 1].kind, LineKind::Error);
    assert_eq!(lines[n - 1].text, "Failed to schedule server update.");
    assert!(h.shell.state().is_idle());
}

/// Test: No elevated session
/// A successful elevation does not carry over to the next command line.
#[tokio::test]
async fn test_elevation_is_per_invocation() {
    let mut h = ShellHarness::new();
    h.elevate("update-server", SECRET).await;

    h.type_line("update-server").await;
    assert_eq!(
        h.last().text,
        "update-server: not enough privileges. Try 'elevate update-server'."
    );

    h.type_line("elevate purge-all-cache").await;
    assert_eq!(h.shell.state().pending_command(), Some("purge-all-cache"));
    h.type_line(SECRET).await;
    assert_eq!(h.last().text, "Entire cache purged.");

    let verifications = h
        .api
        .calls()
        .iter()
        .filter(|c| matches!(c, ApiCall::VerifySecret(_)))
        .count();
    assert_eq!(verifications, 2);
}

#[tokio::test]
async fn test_sudo_is_an_alias() {
    let mut h = ShellHarness::new();
    h.elevate("authenticate", SECRET).await;
    let via_elevate = h.last();

    h.type_line("sudo authenticate").await;
    assert_eq!(h.shell.state().pending_command(), Some("authenticate"));
    h.type_line(SECRET).await;
    assert_eq!(h.last(), via_elevate);
    assert_eq!(
        via_elevate.text,
        "Analytics unlocked: https://folio.test/analytics?token=tok-123"
    );
}

/// Test: Elevation targets that cannot be elevated
#[tokio::test]
async fn test_bad_elevation_targets() {
    let mut h = ShellHarness::new();

    h.type_line("elevate").await;
    assert_eq!(h.last().text, "usage: elevate <command>");
    assert!(h.shell.state().is_idle());

    h.type_line("elevate teleport").await;
    assert_eq!(h.last().text, "elevate: teleport: command not found");
    assert!(h.shell.state().is_idle());

    h.type_line("elevate help").await;
    assert_eq!(h.last().kind, LineKind::Info);
    assert_eq!(h.last().text, "help does not require elevation");
    assert!(h.shell.state().is_idle());

    assert!(h.api.calls().is_empty());
}

/// Test: Input mode follows the challenge
#[tokio::test]
async fn test_mode_is_secret_while_challenged() {
    let mut h = ShellHarness::new();
    let mode = h.shell.subscribe_mode();

    h.type_line("elevate update-server").await;
    assert_eq!(*mode.borrow(), InputMode::Secret);

    h.type_line(SECRET).await;
    assert_eq!(*mode.borrow(), InputMode::Command);
}

/// Test: Cancel during the secret prompt
/// Then the next line is a command again, not a secret.
#[tokio::test]
async fn test_cancel_during_secret_prompt() {
    let mut h = ShellHarness::new();
    h.type_line("elevate update-server").await;
    h.shell.cancel();

    assert!(h.shell.state().is_idle());
    assert_eq!(h.last().text, "^C");

    h.type_line(SECRET).await;
    assert_eq!(h.last().text, format!("Command not found: {SECRET}"));
    assert!(h.api.calls().is_empty());

    h.elevate("update-server", SECRET).await;
    assert_eq!(h.last().text, "Server will be updated shortly...");
}

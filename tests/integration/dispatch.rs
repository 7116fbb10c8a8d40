//! Command routing tests.
//!
//! These verify that an idle shell echoes each line, resolves it against the
//! registry, and reports unknown or under-privileged commands without running
//! anything.

use folio_shell::app::Headless;
use folio_shell::shell::{InputMode, LineKind};

use crate::fixtures::{count, ShellHarness};

/// Test: Unknown command
/// Given an idle shell
/// When an unregistered line is typed
/// Then it is echoed and answered with one error, and the shell stays idle
#[tokio::test]
async fn test_unknown_command_is_reported() {
    let mut h = ShellHarness::new();
    h.type_line("make coffee").await;

    let lines = h.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].kind, LineKind::EchoedCommand);
    assert_eq!(lines[0].text, "make coffee");
    assert_eq!(lines[1].kind, LineKind::Error);
    assert_eq!(lines[1].text, "Command not found: make coffee");
    assert!(h.shell.state().is_idle());
    assert!(h.api.calls().is_empty());
}

/// Test: Matching is literal
/// Command names are case-sensitive and surrounding whitespace is ignored.
#[tokio::test]
async fn test_matching_is_exact_after_trim() {
    let mut h = ShellHarness::new();
    h.type_line("  version  ").await;
    assert_eq!(h.last().text, "Version: 1.4.2");

    h.type_line("VERSION").await;
    assert_eq!(h.last().text, "Command not found: VERSION");
}

#[tokio::test]
async fn test_empty_line_is_ignored() {
    let mut h = ShellHarness::new();
    h.type_line("").await;
    h.type_line("   ").await;
    assert!(h.transcript.is_empty());
    assert!(h.shell.state().is_idle());
}

/// Test: Privileged command without the prefix
/// Then an error is shown and no remote call of any kind is made.
#[tokio::test]
async fn test_privileged_command_without_prefix() {
    let mut h = ShellHarness::new();
    for name in ["update-server", "authenticate", "purge-cache", "purge-all-cache", "post-blog"] {
        h.type_line(name).await;
        let last = h.last();
        assert_eq!(last.kind, LineKind::Error);
        assert_eq!(
            last.text,
            format!("{name}: not enough privileges. Try 'elevate {name}'.")
        );
        assert!(h.shell.state().is_idle());
    }
    assert!(h.api.calls().is_empty());
}

/// Test: help lists unprivileged, visible commands only
#[tokio::test]
async fn test_help_lists_unprivileged_commands() {
    let mut h = ShellHarness::new();
    h.type_line("help").await;
    let texts = h.texts();

    assert!(texts.contains(&"Usage:".to_string()));
    assert!(texts.contains(&"- help: Show this help message".to_string()));
    assert!(texts.contains(&"- version: Show the current server version".to_string()));
    assert!(texts.contains(&"- clear: Clear the terminal output".to_string()));
    assert!(texts.iter().all(|t| !t.contains("update-server")));
    assert!(texts.iter().all(|t| !t.contains("neofetch | less")));
}

#[tokio::test]
async fn test_help_elevated_lists_privileged_commands() {
    let mut h = ShellHarness::new();
    h.elevate("help-elevated", crate::fixtures::SECRET).await;
    let texts = h.texts();
    assert!(texts.contains(&"Privileged commands:".to_string()));
    assert!(texts.iter().any(|t| t.starts_with("- update-server: ")));
    assert!(texts.iter().any(|t| t.starts_with("- post-blog: ")));
    assert!(texts.iter().all(|t| !t.starts_with("- help: ")));
}

#[tokio::test]
async fn test_version_failure_is_reported() {
    let mut h = ShellHarness::new();
    h.api.fail("version");
    h.type_line("version").await;
    let last = h.last();
    assert_eq!(last.kind, LineKind::Error);
    assert_eq!(last.text, "Failed to fetch version");
}

/// Test: clear
/// The transcript is emptied, including the echoed `clear` itself.
#[tokio::test]
async fn test_clear_empties_transcript() {
    let mut h = ShellHarness::new();
    h.type_line("help").await;
    h.type_line("bogus").await;
    assert!(!h.transcript.is_empty());

    h.type_line("clear").await;
    assert!(h.transcript.is_empty());

    h.type_line("version").await;
    assert_eq!(h.texts(), vec!["version", "Version: 1.4.2"]);
}

#[tokio::test]
async fn test_neofetch_hints_at_pager() {
    let mut h = ShellHarness::new();
    h.type_line("neofetch").await;
    assert_eq!(
        h.last().text,
        "Error: Not enough screen real estate. Try piping to less."
    );
}

/// Test: neofetch | less
/// Clears the screen, then prints the banner and QR link as raw lines.
#[tokio::test]
async fn test_neofetch_paged_prints_banner() {
    let mut h = ShellHarness::new();
    h.type_line("help").await;
    h.type_line("neofetch | less").await;

    let lines = h.lines();
    assert!(lines.iter().all(|l| l.kind == LineKind::Raw));
    assert!(count(&lines, LineKind::Raw) > 2);
    assert_eq!(h.last().text, "Portfolio QR code: https://folio.test/qr.png");
}

#[tokio::test]
async fn test_mode_stays_command_for_simple_commands() {
    let mut h = ShellHarness::new();
    let mode = h.shell.subscribe_mode();
    h.type_line("help").await;
    assert_eq!(*mode.borrow(), InputMode::Command);
}

/// Test: Headless front end prints the same transcript as plain text
#[tokio::test]
async fn test_headless_feed() {
    let mut h = ShellHarness::new();
    let lines = vec![
        "version".to_string(),
        "elevate update-server".to_string(),
        crate::fixtures::SECRET.to_string(),
    ];
    let mut out = Vec::new();
    Headless::feed(&mut h.shell, &lines, &mut out).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "$ version\nVersion: 1.4.2\n$ elevate update-server\n\
         [elevate] secret accepted\nServer will be updated shortly...\n"
    );
    assert!(!text.contains(crate::fixtures::SECRET));
}

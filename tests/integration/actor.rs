//! Shell actor tests.
//!
//! Lines and interrupts reach the shell in the order they were produced.
//! An interrupt aborts whatever the shell is doing at that moment; a line
//! typed while a handler is busy is dropped.

use folio_shell::actors::{ShellActor, ShellHandle};
use folio_shell::shell::{CommandDescriptor, InputMode, LineKind};

use crate::fixtures::{brief, extended_registry, slow, wait_for, ShellHarness, SECRET};

#[tokio::test]
async fn test_actor_runs_submitted_lines() {
    let h = ShellHarness::new();
    let handle = ShellActor::spawn(h.shell);

    handle.submit("version");
    wait_for(handle.transcript(), |lines| {
        lines.iter().any(|l| l.text == "Version: 1.4.2")
    })
    .await;
    handle.shutdown();
}

fn transcript_texts(handle: &ShellHandle) -> Vec<String> {
    handle
        .transcript()
        .lines()
        .into_iter()
        .map(|l| l.text)
        .collect()
}

/// Test: Interrupt aborts a running handler
/// Given a slow handler with a line typed behind it
/// When an interrupt arrives
/// Then the handler never finishes and the typed line is never run
#[tokio::test]
async fn test_interrupt_aborts_running_handler() {
    let h = ShellHarness::with_registry(extended_registry(&[CommandDescriptor::new(
        "slow",
        "Takes a while",
        slow,
    )]));
    let handle = ShellActor::spawn(h.shell);

    handle.submit("slow");
    handle.submit("version");
    handle.interrupt();
    wait_for(handle.transcript(), |lines| {
        lines.iter().any(|l| l.text == "^C")
    })
    .await;

    // The shell is idle again; a fresh line is a command.
    handle.submit("version");
    wait_for(handle.transcript(), |lines| {
        lines.iter().any(|l| l.text == "Version: 1.4.2")
    })
    .await;

    assert_eq!(
        transcript_texts(&handle),
        vec!["slow", "^C", "version", "Version: 1.4.2"]
    );
    handle.shutdown();
}

/// Test: A line typed while a handler is busy
/// Given a handler that runs for a moment on its own
/// When a command line is submitted before it finishes
/// Then that line is dropped, not run once the handler is done
#[tokio::test]
async fn test_line_while_busy_is_not_run_later() {
    let h = ShellHarness::with_registry(extended_registry(&[CommandDescriptor::new(
        "brief",
        "Busy for a moment",
        brief,
    )]));
    let handle = ShellActor::spawn(h.shell);

    handle.submit("brief");
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    handle.submit("version");

    wait_for(handle.transcript(), |lines| {
        lines.iter().any(|l| l.text == "brief finished")
    })
    .await;
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let texts = transcript_texts(&handle);
    assert_eq!(texts, vec!["brief", "brief finished"]);
    assert!(!texts.iter().any(|t| t == "Version: 1.4.2"));
    handle.shutdown();
}

/// Test: Interrupt during the secret prompt, then a command
/// The command after the interrupt must not be taken as the secret.
#[tokio::test]
async fn test_interrupt_then_line_is_a_command() {
    let h = ShellHarness::new();
    let api = h.api.clone();
    let mut handle = ShellActor::spawn(h.shell);

    handle.submit("elevate update-server");
    handle.interrupt();
    handle.submit(SECRET);

    let transcript = handle.transcript().clone();
    wait_for(&transcript, |lines| {
        lines
            .iter()
            .any(|l| l.kind == LineKind::Error && l.text.starts_with("Command not found"))
    })
    .await;
    assert!(api.calls().is_empty());

    // Mode settles back to the command prompt.
    handle.mode_changed();
    assert_eq!(handle.mode(), InputMode::Command);
    handle.shutdown();
}

#[tokio::test]
async fn test_actor_elevation_round_trip() {
    let h = ShellHarness::new();
    let mut handle = ShellActor::spawn(h.shell);

    handle.submit("elevate purge-cache");
    handle.submit(SECRET);
    wait_for(handle.transcript(), |lines| {
        lines
            .last()
            .is_some_and(|l| l.text == "Paths to purge (space separated):")
    })
    .await;
    handle.mode_changed();
    assert_eq!(
        handle.mode(),
        InputMode::Answer {
            prompt: "Paths to purge (space separated):".to_string()
        }
    );

    handle.submit("/blog");
    wait_for(handle.transcript(), |lines| {
        lines
            .iter()
            .any(|l| l.text == "Purged 1 path(s) from the cache.")
    })
    .await;
    handle.shutdown();
}

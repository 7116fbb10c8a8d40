//! Shell actor: owns the interpreter and serialises everything typed at it.

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::shell::{InputMode, Shell, Transcript};
use crate::{flog_debug, flog_warn};

use super::ActorHandle;

/// Input from the front end, in the order the user produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    Line(String),
    Interrupt,
}

/// Front-end side of a running [`ShellActor`].
pub struct ShellHandle {
    inputs: mpsc::UnboundedSender<ShellInput>,
    transcript: Transcript,
    mode: watch::Receiver<InputMode>,
    actor: ActorHandle,
}

impl ShellHandle {
    pub fn submit(&self, line: impl Into<String>) {
        if self.inputs.send(ShellInput::Line(line.into())).is_err() {
            flog_warn!("ShellHandle::submit: shell actor is gone");
        }
    }

    pub fn interrupt(&self) {
        if self.inputs.send(ShellInput::Interrupt).is_err() {
            flog_warn!("ShellHandle::interrupt: shell actor is gone");
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn mode(&self) -> InputMode {
        self.mode.borrow().clone()
    }

    /// True once per change of the input mode.
    pub fn mode_changed(&mut self) -> bool {
        let changed = self.mode.has_changed().unwrap_or(false);
        if changed {
            self.mode.borrow_and_update();
        }
        changed
    }

    pub fn shutdown(&self) {
        self.actor.shutdown();
    }
}

/// Runs a [`Shell`] on its own task.
///
/// Lines are dispatched one at a time. While a dispatch is in flight only an
/// interrupt is acted on: it aborts the dispatch and cancels the shell. Lines
/// that arrive meanwhile are dropped, never run later as commands.
pub struct ShellActor {
    shell: Shell,
    inputs: mpsc::UnboundedReceiver<ShellInput>,
}

impl ShellActor {
    pub fn spawn(shell: Shell) -> ShellHandle {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();
        let (tx, rx) = mpsc::unbounded_channel();
        let transcript = shell.transcript();
        let mode = shell.subscribe_mode();

        flog_debug!("ShellActor::spawn");

        let actor = Self { shell, inputs: rx };
        tokio::spawn(actor.run(cancel_clone));

        ShellHandle {
            inputs: tx,
            transcript,
            mode,
            actor: ActorHandle::new(cancel),
        }
    }

    async fn run(mut self, cancel: CancellationToken) {
        let mut inputs_open = true;

        while inputs_open {
            let input = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                input = self.inputs.recv() => match input {
                    Some(input) => input,
                    None => break,
                },
            };

            let line = match input {
                ShellInput::Interrupt => {
                    self.shell.cancel();
                    continue;
                }
                ShellInput::Line(line) => line,
            };

            let interrupted = {
                let dispatch = self.shell.dispatch(&line);
                tokio::pin!(dispatch);
                loop {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break false,
                        () = &mut dispatch => break false,
                        input = self.inputs.recv(), if inputs_open => match input {
                            Some(ShellInput::Interrupt) => break true,
                            // Contents may be a secret; only the length is logged.
                            Some(ShellInput::Line(dropped)) => flog_debug!(
                                "ShellActor: busy, dropping line (len={})",
                                dropped.len()
                            ),
                            None => inputs_open = false,
                        },
                    }
                }
            };

            if interrupted {
                flog_debug!("ShellActor: dispatch interrupted");
                self.shell.cancel();
            }
            if cancel.is_cancelled() {
                break;
            }
        }

        flog_debug!("ShellActor stopped");
    }
}

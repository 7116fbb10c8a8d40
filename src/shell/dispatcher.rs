//! The interpreter: routes each typed line according to the session state.
//!
//! A line is one of three things, decided only by [`SessionState`]:
//! - an answer for a handler suspended in `request_line`,
//! - the secret for a pending elevation challenge,
//! - a new command line.
//!
//! `dispatch` drives the running handler until it either finishes or
//! suspends for input, then returns. The suspended handler is parked inside
//! the state and resumed by the next `dispatch`.

use std::any::Any;
use std::fmt;
use std::future::poll_fn;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::Poll;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::watch;

use crate::api::Api;
use crate::config::Config;
use crate::{flog, flog_debug, flog_error, flog_warn, Result};

use super::elevation::{self, ElevationContext};
use super::registry::{CommandContext, CommandDescriptor, Registry};
use super::stdin::Stdin;
use super::transcript::{LineKind, Transcript};

/// First tokens that request elevation for the rest of the line.
pub const ELEVATION_PREFIXES: &[&str] = &["elevate", "sudo"];

pub const INTERRUPT_MARKER: &str = "^C";

type JobOutcome = std::result::Result<Result<()>, Box<dyn Any + Send>>;

/// A handler invocation in flight.
pub struct Job {
    name: &'static str,
    future: BoxFuture<'static, JobOutcome>,
}

impl Job {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[derive(Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingElevationSecret {
        pending_command: &'static str,
    },
    AwaitingInteractiveInput {
        job: Job,
    },
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    pub fn pending_command(&self) -> Option<&'static str> {
        match self {
            SessionState::AwaitingElevationSecret { pending_command } => Some(*pending_command),
            _ => None,
        }
    }

    pub fn is_awaiting_input(&self) -> bool {
        matches!(self, SessionState::AwaitingInteractiveInput { .. })
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::AwaitingElevationSecret { pending_command } => f
                .debug_struct("AwaitingElevationSecret")
                .field("pending_command", pending_command)
                .finish(),
            SessionState::AwaitingInteractiveInput { job } => f
                .debug_struct("AwaitingInteractiveInput")
                .field("command", &job.name)
                .finish(),
        }
    }
}

/// What the input field should look like right now.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Command,
    /// Masked entry for the elevation secret.
    Secret,
    Answer {
        prompt: String,
    },
    /// A handler is running and has not asked for input.
    Busy,
}

pub struct Shell {
    registry: Arc<Registry>,
    api: Arc<dyn Api>,
    config: Arc<Config>,
    transcript: Transcript,
    stdin: Stdin,
    state: SessionState,
    mode_tx: watch::Sender<InputMode>,
}

impl Shell {
    pub fn new(registry: Registry, api: Arc<dyn Api>, config: Config) -> Self {
        let (mode_tx, _) = watch::channel(InputMode::Command);
        Self {
            registry: Arc::new(registry),
            api,
            config: Arc::new(config),
            transcript: Transcript::new(),
            stdin: Stdin::new(),
            state: SessionState::Idle,
            mode_tx,
        }
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn subscribe_mode(&self) -> watch::Receiver<InputMode> {
        self.mode_tx.subscribe()
    }

    /// Handle one typed line. Returns once the shell is ready for the next.
    pub async fn dispatch(&mut self, line: &str) {
        let line = line.trim();
        // Taking the state means an abandoned dispatch leaves the shell Idle.
        match std::mem::take(&mut self.state) {
            SessionState::AwaitingInteractiveInput { job } => {
                self.transcript.append(LineKind::Answer, line);
                if !self.stdin.deliver(line.to_string()) {
                    flog_warn!("{}: answer delivered with no reader waiting", job.name);
                }
                self.drive(job).await;
            }
            SessionState::AwaitingElevationSecret { pending_command } => {
                self.answer_challenge(pending_command, line.to_string())
                    .await;
            }
            SessionState::Idle => self.run_line(line).await,
        }
        self.publish_mode();
    }

    /// Interrupt: drop any challenge or suspended handler and return to Idle.
    pub fn cancel(&mut self) {
        let previous = std::mem::take(&mut self.state);
        flog_debug!("cancel: state was {:?}", previous);
        self.stdin.abandon();
        // Dropping a parked job releases whatever its handler owned.
        drop(previous);
        self.transcript.info(INTERRUPT_MARKER);
        self.publish_mode();
    }

    async fn run_line(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        self.transcript.append(LineKind::EchoedCommand, line);
        flog!("dispatch: {}", line);

        if let Some(target) = elevation_target(line) {
            self.begin_elevation(target);
            return;
        }

        let descriptor = self.registry.get(line).copied();
        match descriptor {
            None => self.transcript.error(format!("Command not found: {line}")),
            Some(d) if d.requires_elevation => self.transcript.error(format!(
                "{}: not enough privileges. Try 'elevate {}'.",
                d.name, d.name
            )),
            Some(d) => self.start(d, None).await,
        }
    }

    fn begin_elevation(&mut self, target: &str) {
        if target.is_empty() {
            self.transcript.error("usage: elevate <command>");
            return;
        }
        match self.registry.get(target) {
            None => self
                .transcript
                .error(format!("elevate: {target}: command not found")),
            Some(d) if !d.requires_elevation => self
                .transcript
                .info(format!("{} does not require elevation", d.name)),
            Some(d) => {
                flog_debug!("elevation challenge for {}", d.name);
                self.state = SessionState::AwaitingElevationSecret {
                    pending_command: d.name,
                };
            }
        }
    }

    async fn answer_challenge(&mut self, pending_command: &'static str, secret: String) {
        self.mode_tx.send_replace(InputMode::Busy);
        let Some(elevation) = elevation::verify(self.api.as_ref(), secret).await else {
            self.transcript.error("Sorry, try again.");
            return;
        };
        self.transcript.success("[elevate] secret accepted");
        let descriptor = self.registry.get(pending_command).copied();
        match descriptor {
            Some(d) => self.start(d, Some(elevation)).await,
            None => self
                .transcript
                .error(format!("elevate: {pending_command}: command not found")),
        }
    }

    async fn start(&mut self, descriptor: CommandDescriptor, elevation: Option<ElevationContext>) {
        let ctx = CommandContext::new(
            self.transcript.clone(),
            self.stdin.clone(),
            self.api.clone(),
            self.config.clone(),
            self.registry.clone(),
            elevation,
        );
        let future = AssertUnwindSafe((descriptor.run)(ctx))
            .catch_unwind()
            .boxed();
        self.drive(Job {
            name: descriptor.name,
            future,
        })
        .await;
    }

    /// Poll `job` until it completes or parks on the stdin channel.
    async fn drive(&mut self, mut job: Job) {
        self.mode_tx.send_replace(InputMode::Busy);
        let stdin = self.stdin.clone();
        let outcome = poll_fn(|cx| match job.future.poll_unpin(cx) {
            Poll::Ready(outcome) => Poll::Ready(Some(outcome)),
            Poll::Pending if stdin.is_waiting() => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        })
        .await;

        let Some(outcome) = outcome else {
            flog_debug!("{}: waiting for input", job.name);
            self.state = SessionState::AwaitingInteractiveInput { job };
            return;
        };

        self.stdin.abandon();
        match outcome {
            Ok(Ok(())) => flog_debug!("{}: finished", job.name),
            Ok(Err(e)) => {
                flog_warn!("{}: failed: {}", job.name, e);
                self.transcript.error(format!("{}: {}", job.name, e));
            }
            Err(_) => {
                flog_error!("{}: handler panicked", job.name);
                self.transcript
                    .error(format!("{}: command crashed", job.name));
            }
        }
    }

    fn publish_mode(&self) {
        let mode = match &self.state {
            SessionState::Idle => InputMode::Command,
            SessionState::AwaitingElevationSecret { .. } => InputMode::Secret,
            SessionState::AwaitingInteractiveInput { .. } => InputMode::Answer {
                prompt: self.stdin.pending_prompt().unwrap_or_default(),
            },
        };
        self.mode_tx.send_replace(mode);
    }
}

/// `Some(rest)` when the line starts with an elevation prefix token.
fn elevation_target(line: &str) -> Option<&str> {
    let (head, rest) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));
    ELEVATION_PREFIXES.contains(&head).then(|| rest.trim())
}

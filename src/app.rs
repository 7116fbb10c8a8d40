use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tokio::runtime::Runtime;

use crate::actors::{ShellActor, ShellHandle};
use crate::api::{Api, HttpApi};
use crate::config::Config;
use crate::render::{plain_text, RenderState};
use crate::shell::{builtin_registry, Shell};
use crate::tea::{update, Command, Message, Model};
use crate::{flog, flog_debug, Result};

/// Build a shell talking to the configured backend.
pub fn build_shell(config: Config) -> Result<Shell> {
    let api: Arc<dyn Api> = Arc::new(HttpApi::new(&config)?);
    let registry = builtin_registry()?;
    flog_debug!(
        "build_shell: api={} commands={}",
        config.effective_api_base(),
        registry.len()
    );
    Ok(Shell::new(registry, api, config))
}

pub struct LogicThread;

impl LogicThread {
    pub fn run(
        config: Config,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        Runtime::new()?.block_on(Self::run_async(config, state_tx, shutdown))
    }

    async fn run_async(
        config: Config,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        let mut model = Model::new(config.effective_user());
        let shell = build_shell(config)?;
        let mut handle = ShellActor::spawn(shell);

        send_state(&state_tx, &model);
        let mut esc_filter = EscapeSequenceFilter::new();
        let mut seen_revision = handle.transcript().revision();

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Keyboard input (priority)
            while event::poll(Duration::ZERO)? {
                let msg = match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if let KeyCode::Char(c) = key.code {
                            if esc_filter.filter(c) {
                                continue;
                            }
                        }
                        Message::Key(key)
                    }
                    Event::Resize(w, h) => Message::Resize(w, h),
                    _ => continue,
                };

                if process(&mut model, msg, &handle) {
                    shutdown.store(true, Ordering::Relaxed);
                    handle.shutdown();
                    return Ok(());
                }

                if model.dirty {
                    send_state(&state_tx, &model);
                    model.dirty = false;
                }
            }

            // Shell output
            let revision = handle.transcript().revision();
            if revision != seen_revision {
                seen_revision = revision;
                let lines = handle.transcript().lines();
                process(&mut model, Message::TranscriptUpdated(lines), &handle);
            }
            if handle.mode_changed() {
                let mode = handle.mode();
                process(&mut model, Message::ModeChanged(mode), &handle);
            }

            if model.dirty {
                send_state(&state_tx, &model);
                model.dirty = false;
            }

            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        handle.shutdown();
        Ok(())
    }
}

/// Run `msg` through `update` and execute the resulting commands.
/// Returns true when the app should quit.
fn process(model: &mut Model, msg: Message, handle: &ShellHandle) -> bool {
    update(model, msg)
        .into_iter()
        .any(|cmd| execute_command(cmd, handle))
}

fn execute_command(cmd: Command, handle: &ShellHandle) -> bool {
    match cmd {
        Command::Submit { line } => {
            handle.submit(line);
        }
        Command::Interrupt => {
            flog_debug!("Command::Interrupt");
            handle.interrupt();
        }
        Command::Quit => {
            flog_debug!("Command::Quit");
            return true;
        }
    }

    false
}

fn send_state(state_tx: &Sender<RenderState>, model: &Model) {
    let _ = state_tx.try_send(model.snapshot());
}

/// Feeds lines to a shell without a terminal and prints the transcript as
/// plain text. Each line is routed exactly as if it had been typed.
pub struct Headless;

impl Headless {
    pub fn run(config: Config, lines: Vec<String>, out: &mut impl Write) -> Result<()> {
        Runtime::new()?.block_on(async {
            let mut shell = build_shell(config)?;
            Self::feed(&mut shell, &lines, out).await
        })
    }

    pub async fn feed(shell: &mut Shell, lines: &[String], out: &mut impl Write) -> Result<()> {
        let transcript = shell.transcript();
        let mut printed = 0;
        let mut clears = transcript.clears();
        for line in lines {
            shell.dispatch(line).await;
            if transcript.clears() != clears {
                clears = transcript.clears();
                printed = 0;
            }
            for line in transcript.lines_since(printed) {
                writeln!(out, "{}", plain_text(&line))?;
            }
            printed = transcript.len();
        }
        if !shell.state().is_idle() {
            flog!("headless: input ended in state {:?}", shell.state());
        }
        Ok(())
    }
}

struct EscapeSequenceFilter {
    len: u8,
    active: bool,
}

impl EscapeSequenceFilter {
    fn new() -> Self {
        Self {
            len: 0,
            active: false,
        }
    }

    fn filter(&mut self, c: char) -> bool {
        if c == '\x1b' {
            self.active = true;
            self.len = 1;
            return true;
        }
        if self.active {
            self.len += 1;
            if (self.len > 2 && (c.is_ascii_alphabetic() || c == '~')) || self.len > 10 {
                self.active = false;
            }
            return true;
        }
        false
    }
}

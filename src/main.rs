use std::io::{self, stdout, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use folio_shell::app::{Headless, LogicThread};
use folio_shell::config::Config;
use folio_shell::render::RenderState;
use folio_shell::shell::builtin_registry;
use folio_shell::{flog, ui, Result};

const FRAME_DURATION: Duration = Duration::from_micros(16_666); // 60fps

/// Folio shell - terminal front end for the portfolio site's admin commands
#[derive(Parser, Debug)]
#[command(name = "folio-shell")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    FOLIO_DEBUG=1   Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.folio/folio.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Backend base URL (overrides api_base in ~/.folio/folio.toml)
    #[arg(long, value_name = "URL")]
    pub api: Option<String>,

    /// Name shown in the elevation prompt
    #[arg(long)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Feed lines to the shell without a terminal and print the transcript
    Run {
        /// Lines to type, in order. Secrets and answers are lines too.
        #[arg(required = true)]
        lines: Vec<String>,
    },

    /// List every registered command
    Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on debug flag
    folio_shell::log::init_with_debug(cli.debug);

    let mut config = Config::load()?;
    if let Some(api) = cli.api {
        config.api_base = Some(api);
    }
    if let Some(user) = cli.user {
        config.user = Some(user);
    }

    match cli.command {
        Some(Command::Run { lines }) => {
            flog!("Headless run: {} line(s)", lines.len());
            return Headless::run(config, lines, &mut io::stdout().lock());
        }
        Some(Command::Commands) => {
            return run_commands();
        }
        None => {}
    }

    if cli.debug {
        flog!("folio-shell starting (debug mode enabled)");
    } else {
        flog!("folio-shell starting");
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);

    let shutdown_clone = shutdown.clone();
    let logic_handle = thread::spawn(move || LogicThread::run(config, state_tx, shutdown_clone));

    let mut terminal = setup_terminal()?;
    let result = render_loop(&mut terminal, state_rx, &shutdown);

    shutdown.store(true, Ordering::SeqCst);
    let logic_result = logic_handle.join();
    restore_terminal(&mut terminal)?;
    result?;
    match logic_result {
        Ok(r) => r,
        Err(_) => Err(folio_shell::Error::TaskJoin(
            "logic thread panicked".to_string(),
        )),
    }
}

fn run_commands() -> Result<()> {
    let registry = builtin_registry()?;
    for descriptor in registry.iter().filter(|d| !d.hidden) {
        let marker = if descriptor.requires_elevation {
            " (elevate)"
        } else {
            ""
        };
        println!("  {:<16} {}{}", descriptor.name, descriptor.summary, marker);
    }
    Ok(())
}

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version: u64 = 0;
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(s) => {
                dirty = dirty || s.version != last_version;
                state = s;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if dirty {
            terminal.draw(|f| ui::draw(f, &state))?;
            last_version = state.version;
            dirty = false;
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(disable_raw_mode()?)
}

//! Pure update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns a list of commands to execute.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::shell::InputMode;
use crate::flog_debug;

use super::command::Command;
use super::message::Message;
use super::model::Model;

/// Lines moved by PageUp/PageDown.
pub const PAGE: usize = 10;

/// Pure update function: Model + Message → Commands
///
/// This function:
/// 1. Takes the current model and an input message
/// 2. Mutates the model state (and sets dirty flag)
/// 3. Returns a list of commands (side effects) to execute
///
/// The function itself has no side effects - all I/O happens via returned Commands.
pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            model.dirty = true; // Keyboard input always triggers render
            update_key(model, key, &mut cmds);
        }
        Message::Resize(_, _) => {
            model.dirty = true;
        }
        Message::TranscriptUpdated(lines) => {
            if lines.len() < model.lines.len() {
                // Transcript was cleared.
                model.scroll = 0;
            }
            model.lines = lines;
            model.scroll = model.scroll.min(model.lines.len());
            model.dirty = true;
        }
        Message::ModeChanged(mode) => {
            flog_debug!("mode changed: {:?}", mode);
            if mode == InputMode::Secret || model.mode == InputMode::Secret {
                // Never carry typed text into or out of the secret field.
                model.input_buffer.clear();
            }
            model.mode = mode;
            model.dirty = true;
        }
    }

    cmds
}

fn update_key(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                model.input_buffer.clear();
                model.scroll = 0;
                cmds.push(Command::Interrupt);
            }
            KeyCode::Char('d') if model.input_buffer.is_empty() => {
                cmds.push(Command::Quit);
            }
            KeyCode::Char('u') => model.input_buffer.clear(),
            _ => {}
        }
        return;
    }

    match key.code {
        // The typed text stays put until the shell can take it.
        KeyCode::Enter if model.mode == InputMode::Busy => {}
        KeyCode::Enter => {
            let line = std::mem::take(&mut model.input_buffer);
            model.scroll = 0;
            cmds.push(Command::Submit { line });
        }
        KeyCode::Esc => {
            if model.input_buffer.is_empty() && model.mode == InputMode::Command {
                cmds.push(Command::Quit);
            } else {
                model.input_buffer.clear();
            }
        }
        KeyCode::Backspace => {
            model.input_buffer.pop();
        }
        KeyCode::PageUp => {
            model.scroll = (model.scroll + PAGE).min(model.lines.len());
        }
        KeyCode::PageDown => {
            model.scroll = model.scroll.saturating_sub(PAGE);
        }
        KeyCode::End => model.scroll = 0,
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => {
            model.input_buffer.push(c);
        }
        _ => {}
    }
}

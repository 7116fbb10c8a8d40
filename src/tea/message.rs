//! Messages for the TEA (The Elm Architecture) pattern.
//!
//! Messages are inputs to the update function - they come from external sources
//! like keyboard events or the shell actor.

use crossterm::event::KeyEvent;

use crate::shell::{InputMode, Line};

/// Input messages to the update function.
#[derive(Debug)]
pub enum Message {
    // Keyboard/terminal events
    Key(KeyEvent),
    Resize(u16, u16),

    // From the shell actor
    TranscriptUpdated(Vec<Line>),
    ModeChanged(InputMode),
}

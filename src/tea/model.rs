//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure front-end state - no channels, no handles, no runtime
//! infrastructure. The shell itself lives in its actor; the model only keeps
//! the latest copy of what the shell published.

use crate::render::{next_version, RenderState};
use crate::shell::{InputMode, Line};

/// Pure front-end state - the single source of truth for rendering.
pub struct Model {
    pub lines: Vec<Line>,
    pub mode: InputMode,
    pub input_buffer: String,
    /// Lines scrolled up from the bottom of the transcript.
    pub scroll: usize,
    /// Name shown in the elevation prompt.
    pub user: String,

    // Dirty flag - set when state changes and render is needed
    pub dirty: bool,
}

impl Model {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            lines: Vec::new(),
            mode: InputMode::Command,
            input_buffer: String::new(),
            scroll: 0,
            user: user.into(),
            dirty: true,
        }
    }

    /// Label in front of the input field.
    pub fn prompt_label(&self) -> String {
        match &self.mode {
            InputMode::Command => "$".to_string(),
            InputMode::Secret => format!("[elevate] secret for {}:", self.user),
            InputMode::Answer { prompt } if prompt.is_empty() => ">".to_string(),
            InputMode::Answer { prompt } => prompt.clone(),
            InputMode::Busy => "…".to_string(),
        }
    }

    /// The input buffer as it may be shown on screen.
    pub fn visible_input(&self) -> String {
        match self.mode {
            InputMode::Secret => "*".repeat(self.input_buffer.chars().count()),
            _ => self.input_buffer.clone(),
        }
    }

    /// Create an immutable snapshot for the render thread.
    pub fn snapshot(&self) -> RenderState {
        RenderState {
            version: next_version(),
            lines: self.lines.clone(),
            mode: self.mode.clone(),
            prompt: self.prompt_label(),
            input: self.visible_input(),
            scroll: self.scroll,
        }
    }
}

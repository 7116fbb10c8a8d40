use std::sync::atomic::{AtomicU64, Ordering};

use crate::shell::{InputMode, Line, LineKind};

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Immutable snapshot handed to the render thread.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub version: u64,
    pub lines: Vec<Line>,
    pub mode: InputMode,
    /// Label in front of the input field.
    pub prompt: String,
    /// Input as displayed; already masked for secrets.
    pub input: String,
    /// Lines scrolled up from the bottom.
    pub scroll: usize,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            version: 0,
            lines: Vec::new(),
            mode: InputMode::Command,
            prompt: "$".to_string(),
            input: String::new(),
            scroll: 0,
        }
    }
}

/// One transcript line as plain text, for headless output.
pub fn plain_text(line: &Line) -> String {
    match line.kind {
        LineKind::EchoedCommand => format!("$ {}", line.text),
        LineKind::Answer => format!("> {}", line.text),
        LineKind::Info | LineKind::Success | LineKind::Raw => line.text.clone(),
        LineKind::Error => format!("! {}", line.text),
    }
}

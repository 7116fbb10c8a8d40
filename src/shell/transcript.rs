//! Append-only transcript of everything the shell shows the user.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Presentation class of a transcript line.
///
/// The dispatcher chooses `EchoedCommand` and `Answer`; handlers choose the
/// rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    EchoedCommand,
    Answer,
    Info,
    Error,
    Success,
    Raw,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineKind::EchoedCommand => "echoed-command",
            LineKind::Answer => "answer",
            LineKind::Info => "info",
            LineKind::Error => "error",
            LineKind::Success => "success",
            LineKind::Raw => "raw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub text: String,
}

#[derive(Debug, Default)]
struct Inner {
    lines: Vec<Line>,
    revision: u64,
    clears: u64,
}

/// Shared handle to the transcript.
///
/// Cloning is cheap; all clones see the same lines. Lines are never edited
/// or reordered once appended, only dropped wholesale by [`Transcript::clear`].
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    inner: Arc<Mutex<Inner>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, kind: LineKind, text: impl Into<String>) {
        let mut inner = self.lock();
        inner.lines.push(Line {
            kind,
            text: text.into(),
        });
        inner.revision += 1;
    }

    pub fn info(&self, text: impl Into<String>) {
        self.append(LineKind::Info, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.append(LineKind::Error, text);
    }

    pub fn success(&self, text: impl Into<String>) {
        self.append(LineKind::Success, text);
    }

    pub fn raw(&self, text: impl Into<String>) {
        self.append(LineKind::Raw, text);
    }

    /// Drop every line. Only the `clear` family of commands call this.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.lines.clear();
        inner.revision += 1;
        inner.clears += 1;
    }

    /// Number of times the transcript has been cleared.
    pub fn clears(&self) -> u64 {
        self.lock().clears
    }

    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bumped on every append or clear; lets renderers skip unchanged frames.
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    pub fn lines(&self) -> Vec<Line> {
        self.lock().lines.clone()
    }

    /// Lines appended at or after index `from`.
    pub fn lines_since(&self, from: usize) -> Vec<Line> {
        let inner = self.lock();
        inner.lines.get(from..).map(<[Line]>::to_vec).unwrap_or_default()
    }

    pub fn count(&self, kind: LineKind) -> usize {
        self.lock().lines.iter().filter(|l| l.kind == kind).count()
    }
}

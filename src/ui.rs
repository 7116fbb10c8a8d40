//! Terminal UI rendering for the folio shell.
//!
//! Layout, top to bottom:
//! - Transcript viewport, colored by line kind, scrolled from the bottom
//! - Separator
//! - Input line with the mode-specific label
//! - Keymap for the current mode
//!
//! This module renders from RenderState (immutable snapshot) - it never
//! mutates application state. This enables the decoupled game loop.

use ansi_to_tui::IntoText;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::render::RenderState;
use crate::shell::{InputMode, Line as ShellLine, LineKind};

// Color tokens
const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;
const COLOR_SEPARATOR: Color = Color::White;

const COLOR_COMMAND: Color = Color::Cyan;
const COLOR_ERROR: Color = Color::Red;
const COLOR_SUCCESS: Color = Color::Green;
const COLOR_SECRET: Color = Color::Yellow;

/// Which keymap the bottom line shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeymapContext {
    Command,
    Secret,
    Answer,
    Busy,
}

impl KeymapContext {
    /// Derive keymap context from render state.
    pub fn from_render_state(state: &RenderState) -> Self {
        match state.mode {
            InputMode::Command => KeymapContext::Command,
            InputMode::Secret => KeymapContext::Secret,
            InputMode::Answer { .. } => KeymapContext::Answer,
            InputMode::Busy => KeymapContext::Busy,
        }
    }
}

/// A single keybinding entry for display.
struct Keybinding(&'static str, &'static str);

/// A group of related keybindings (separated by │).
struct KeybindingGroup(Vec<Keybinding>);

/// Get keybindings for a given context.
fn keybindings_for_context(ctx: KeymapContext) -> Vec<KeybindingGroup> {
    let scroll = KeybindingGroup(vec![Keybinding("PgUp/PgDn", "scroll")]);
    match ctx {
        KeymapContext::Command => vec![
            KeybindingGroup(vec![
                Keybinding("Enter", "run"),
                Keybinding("Ctrl+C", "interrupt"),
            ]),
            scroll,
            KeybindingGroup(vec![Keybinding("Esc", "quit")]),
        ],
        KeymapContext::Secret => vec![KeybindingGroup(vec![
            Keybinding("Enter", "verify"),
            Keybinding("Ctrl+C", "abort"),
        ])],
        KeymapContext::Answer => vec![
            KeybindingGroup(vec![
                Keybinding("Enter", "answer"),
                Keybinding("Ctrl+C", "abort"),
            ]),
            scroll,
        ],
        KeymapContext::Busy => vec![
            KeybindingGroup(vec![Keybinding("Ctrl+C", "interrupt")]),
            scroll,
        ],
    }
}

/// Main render function - entry point for all UI drawing.
/// Takes an immutable RenderState snapshot.
pub fn draw(frame: &mut Frame, state: &RenderState) {
    let area = frame.area();

    if area.height < 3 {
        frame.render_widget(Paragraph::new(render_input_line(state)), area);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_transcript(frame, state, chunks[0]);
    render_separator(frame, chunks[1]);
    frame.render_widget(Paragraph::new(render_input_line(state)), chunks[2]);
    frame.render_widget(Paragraph::new(render_keymap_line(state)), chunks[3]);
}

/// Render the transcript, bottom-aligned and offset by the scroll position.
fn render_transcript(frame: &mut Frame, state: &RenderState, area: Rect) {
    let lines = transcript_lines(&state.lines);

    let visible = area.height as usize;
    let end = lines.len().saturating_sub(state.scroll);
    let start = end.saturating_sub(visible);
    let lines: Vec<Line> = lines.into_iter().skip(start).take(end - start).collect();

    frame.render_widget(Paragraph::new(lines), area);
}

/// Styled terminal lines for the transcript. Raw lines keep their ANSI colors
/// and may span several terminal lines.
fn transcript_lines(lines: &[ShellLine]) -> Vec<Line<'static>> {
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        match line.kind {
            LineKind::Raw => match line.text.into_text() {
                Ok(text) => out.extend(text.lines),
                Err(_) => out.push(Line::raw(line.text.clone())),
            },
            LineKind::EchoedCommand => out.push(Line::from(vec![
                Span::styled("$ ", Style::default().fg(COLOR_TEXT_MUTED)),
                Span::styled(line.text.clone(), Style::default().fg(COLOR_COMMAND)),
            ])),
            LineKind::Answer => out.push(Line::from(vec![
                Span::styled("> ", Style::default().fg(COLOR_TEXT_MUTED)),
                Span::raw(line.text.clone()),
            ])),
            LineKind::Info => out.push(Line::styled(
                line.text.clone(),
                Style::default().fg(COLOR_TEXT_DIMMED),
            )),
            LineKind::Error => out.push(Line::styled(
                line.text.clone(),
                Style::default().fg(COLOR_ERROR),
            )),
            LineKind::Success => out.push(Line::styled(
                line.text.clone(),
                Style::default().fg(COLOR_SUCCESS),
            )),
        }
    }
    out
}

/// Render the separator - solid divider line between transcript and input.
fn render_separator(frame: &mut Frame, area: Rect) {
    let solid = "─".repeat(area.width as usize);
    let line = Line::from(Span::styled(solid, Style::default().fg(COLOR_SEPARATOR)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the input field with its label and cursor.
fn render_input_line(state: &RenderState) -> Line<'static> {
    let label_style = match state.mode {
        InputMode::Secret => Style::default().fg(COLOR_SECRET),
        InputMode::Busy => Style::default().fg(COLOR_TEXT_MUTED),
        _ => Style::default().fg(Color::Reset),
    };
    let input_style = Style::default().fg(Color::White);
    let cursor_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::SLOW_BLINK);

    let mut spans = vec![
        Span::styled(format!("{} ", state.prompt), label_style),
        Span::styled(state.input.clone(), input_style),
    ];
    if state.mode != InputMode::Busy {
        spans.push(Span::styled("_", cursor_style));
    }
    Line::from(spans)
}

/// Render keybindings legend for the bottom line.
fn render_keymap_line(state: &RenderState) -> Line<'static> {
    let ctx = KeymapContext::from_render_state(state);
    let groups = keybindings_for_context(ctx);

    let key_style = Style::default().fg(COLOR_TEXT_DIMMED);
    let desc_style = Style::default().fg(COLOR_TEXT_MUTED);
    let sep_style = Style::default().fg(COLOR_TEXT_MUTED);

    let mut spans: Vec<Span> = Vec::new();
    for group in groups.iter() {
        if group.0.is_empty() {
            continue;
        }
        if !spans.is_empty() {
            spans.push(Span::styled(" │ ", sep_style));
        }
        for (key_idx, keybinding) in group.0.iter().enumerate() {
            if key_idx > 0 {
                spans.push(Span::styled(" • ", sep_style));
            }
            spans.push(Span::styled(keybinding.0, key_style));
            spans.push(Span::styled(format!(" {}", keybinding.1), desc_style));
        }
    }

    if state.scroll > 0 {
        spans.push(Span::styled(format!("  [-{}]", state.scroll), desc_style));
    }

    Line::from(spans)
}

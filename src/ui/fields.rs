//! Field view layout.
//!
//! The projection is flattened into styled runs and soft-wrapped at the
//! pane width here, once, so rendering and mouse hit testing agree on where
//! every field landed.

use unicode_width::UnicodeWidthChar;

use crate::app::Model;
use crate::document::{HighlightId, Segment};

/// How a run of text is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Plain,
    /// A highlighted token that has not been turned into an input
    Token { id: HighlightId, focused: bool },
    /// The value of an inline input
    Input { id: HighlightId, focused: bool },
    /// The cell under the focused input's cursor
    Cursor { id: HighlightId },
}

impl RunKind {
    pub const fn field_id(self) -> Option<HighlightId> {
        match self {
            Self::Plain => None,
            Self::Token { id, .. } | Self::Input { id, .. } | Self::Cursor { id } => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub kind: RunKind,
}

/// One screen row of the field view.
pub type Row = Vec<Run>;

/// Lay out the field view for a pane `width` columns wide.
///
/// Always returns at least one row.
pub fn layout(model: &Model, width: usize) -> Vec<Row> {
    let mut wrap = Wrapper::new(width);

    let document = model.session.document();
    for segment in model.session.projection() {
        match segment {
            Segment::Plain(range) => {
                for ch in document.slice(range).chars() {
                    wrap.push(ch, RunKind::Plain);
                }
            }
            Segment::Field {
                id,
                range,
                editable: false,
            } => {
                let focused = model.active_field == Some(id);
                for ch in document.slice(range).chars() {
                    wrap.push(ch, RunKind::Token { id, focused });
                }
            }
            Segment::Field { id, .. } => {
                let focused = model.active_field == Some(id);
                let value = model.draft_value(id).unwrap_or_default();
                let len = value.chars().count();
                let cursor = focused.then(|| {
                    model
                        .drafts
                        .get(&id)
                        .map_or(len, |draft| draft.cursor.min(len))
                });
                for (idx, ch) in value.chars().enumerate() {
                    if cursor == Some(idx) {
                        wrap.push(ch, RunKind::Cursor { id });
                    } else {
                        wrap.push(ch, RunKind::Input { id, focused });
                    }
                }
                if cursor == Some(len) {
                    wrap.push(' ', RunKind::Cursor { id });
                } else if len == 0 {
                    // Keep empty inputs visible and clickable
                    wrap.push(' ', RunKind::Input { id, focused });
                }
            }
        }
    }
    wrap.finish()
}

struct Wrapper {
    rows: Vec<Row>,
    current: Row,
    used: usize,
    width: usize,
}

impl Wrapper {
    fn new(width: usize) -> Self {
        Self {
            rows: Vec::new(),
            current: Vec::new(),
            used: 0,
            width: width.max(1),
        }
    }

    fn break_row(&mut self) {
        self.rows.push(std::mem::take(&mut self.current));
        self.used = 0;
    }

    fn push(&mut self, ch: char, kind: RunKind) {
        if ch == '\n' {
            self.break_row();
            return;
        }
        let ch = if ch == '\t' { ' ' } else { ch };
        let ch_width = ch.width().unwrap_or(0);
        if self.used + ch_width > self.width && self.used > 0 {
            self.break_row();
        }
        self.used += ch_width;
        match self.current.last_mut() {
            Some(run) if run.kind == kind => run.text.push(ch),
            _ => self.current.push(Run {
                text: ch.to_string(),
                kind,
            }),
        }
    }

    fn finish(mut self) -> Vec<Row> {
        self.rows.push(self.current);
        self.rows
    }
}

/// The field drawn at `col` on `row`, if any.
pub fn field_at(rows: &[Row], row: usize, col: usize) -> Option<HighlightId> {
    let mut x = 0usize;
    for run in rows.get(row)? {
        let run_width: usize = run.text.chars().map(|ch| ch.width().unwrap_or(0)).sum();
        if col < x + run_width {
            return run.kind.field_id();
        }
        x += run_width;
    }
    None
}

/// First row on which `id` is drawn.
pub fn row_of_field(rows: &[Row], id: HighlightId) -> Option<usize> {
    rows.iter()
        .position(|row| row.iter().any(|run| run.kind.field_id() == Some(id)))
}

//! Core document types.

use std::fmt;
use std::ops::Range;

use ropey::Rope;

use super::edit::{EditReport, TextEdit};
use super::projection::{self, Segment};

/// Opaque identity of a highlighted field.
///
/// Ids are allocated by the owning [`Document`] and never reused within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HighlightId(u64);

impl HighlightId {
    /// Numeric value used when the id is persisted.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HighlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A field region: a half-open char range into the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// Identity of the field
    pub id: HighlightId,
    /// First char offset covered by the field
    pub start: usize,
    /// One past the last char offset covered by the field
    pub end: usize,
    /// Text snapshot taken when the field was created or last committed
    pub source_text: String,
    /// Whether the field renders as an inline input
    pub editable: bool,
}

impl Highlight {
    /// The `[start, end)` range covered by the field.
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of chars covered.
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false; highlights are never empty.
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether the field shares at least one char with `range`.
    ///
    /// Touching at a boundary is not an overlap.
    pub const fn overlaps(&self, range: &Range<usize>) -> bool {
        range.start < self.end && range.end > self.start
    }

    const fn shift(&mut self, delta: isize) {
        self.start = self.start.saturating_add_signed(delta);
        self.end = self.end.saturating_add_signed(delta);
    }
}

/// Why a selection could not become a field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionRejected {
    #[error("selection is empty")]
    Collapsed,
    #[error("selection contains only whitespace")]
    Blank,
    #[error("selection {start}..{end} is outside the text (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("selection overlaps field {0}")]
    Overlaps(HighlightId),
}

/// Errors raised by field-level operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("no field with id {0}")]
    Unknown(HighlightId),
    #[error("field range {start}..{end} is invalid for text of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },
    #[error("field range {start}..{end} overlaps another field")]
    Overlapping { start: usize, end: usize },
}

/// A field to install when replacing the whole document (template load).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSeed {
    pub start: usize,
    pub end: usize,
    /// Snapshot text; falls back to the covered slice when absent.
    pub source_text: Option<String>,
    pub editable: bool,
}

/// The text buffer plus its highlighted fields.
///
/// Highlights are kept sorted by `start`, pairwise non-overlapping, and
/// within `0..=len_chars()` after every operation.
#[derive(Debug, Clone)]
pub struct Document {
    text: Rope,
    highlights: Vec<Highlight>,
    next_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    /// Create an empty document.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// Create a document holding `text` and no fields.
    pub fn new(text: &str) -> Self {
        Self {
            text: Rope::from_str(text),
            highlights: Vec::new(),
            next_id: 1,
        }
    }

    /// The full text.
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// The underlying rope, for line-oriented rendering.
    pub const fn rope(&self) -> &Rope {
        &self.text
    }

    /// Length of the text in chars.
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    /// Text covered by a char range, clamped to the buffer.
    pub fn slice(&self, range: Range<usize>) -> String {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        self.text.slice(start..end).to_string()
    }

    /// All fields, sorted by start offset.
    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Look up a field by id.
    pub fn highlight(&self, id: HighlightId) -> Option<&Highlight> {
        self.highlights.iter().find(|h| h.id == id)
    }

    /// The field covering the char at `offset`, if any.
    pub fn highlight_covering(&self, offset: usize) -> Option<&Highlight> {
        self.highlights
            .iter()
            .find(|h| h.start <= offset && offset < h.end)
    }

    /// The field under a cursor at `offset`, if any.
    ///
    /// A field covering the char at `offset` wins; otherwise a field ending
    /// exactly at `offset` counts, so a cursor parked just after a field can
    /// still address it.
    pub fn highlight_at(&self, offset: usize) -> Option<&Highlight> {
        self.highlight_covering(offset)
            .or_else(|| self.highlights.iter().find(|h| h.end == offset))
    }

    /// Replace the whole text and drop every field (plain-text import).
    pub fn replace_text(&mut self, text: &str) {
        self.text = Rope::from_str(text);
        self.highlights.clear();
    }

    /// Replace the whole text and install a new field set (template load).
    ///
    /// The document is left untouched when any seed violates the
    /// in-bounds or non-overlap invariants.
    pub fn replace_with_fields(&mut self, text: &str, seeds: Vec<FieldSeed>) -> Result<(), FieldError> {
        let rope = Rope::from_str(text);
        let len = rope.len_chars();
        let mut seeds = seeds;
        seeds.sort_by_key(|seed| seed.start);

        let mut previous_end = 0;
        for seed in &seeds {
            if seed.start >= seed.end || seed.end > len {
                return Err(FieldError::InvalidRange {
                    start: seed.start,
                    end: seed.end,
                    len,
                });
            }
            if seed.start < previous_end {
                return Err(FieldError::Overlapping {
                    start: seed.start,
                    end: seed.end,
                });
            }
            previous_end = seed.end;
        }

        let mut next_id = self.next_id;
        let highlights = seeds
            .into_iter()
            .map(|seed| {
                let id = HighlightId(next_id);
                next_id += 1;
                Highlight {
                    id,
                    start: seed.start,
                    end: seed.end,
                    source_text: seed
                        .source_text
                        .unwrap_or_else(|| rope.slice(seed.start..seed.end).to_string()),
                    editable: seed.editable,
                }
            })
            .collect();

        self.text = rope;
        self.highlights = highlights;
        self.next_id = next_id;
        Ok(())
    }

    /// Turn a selected char range into a new non-editable field.
    ///
    /// # Errors
    ///
    /// Rejects empty, whitespace-only, out-of-bounds, and overlapping
    /// selections; the document is unchanged in every rejected case.
    pub fn select_range(&mut self, start: usize, end: usize) -> Result<&Highlight, SelectionRejected> {
        let len = self.len_chars();
        if start >= end {
            return Err(SelectionRejected::Collapsed);
        }
        if end > len {
            return Err(SelectionRejected::OutOfBounds { start, end, len });
        }
        let selected = self.text.slice(start..end).to_string();
        if selected.trim().is_empty() {
            return Err(SelectionRejected::Blank);
        }
        let range = start..end;
        if let Some(existing) = self.highlights.iter().find(|h| h.overlaps(&range)) {
            return Err(SelectionRejected::Overlaps(existing.id));
        }

        let highlight = Highlight {
            id: self.allocate_id(),
            start,
            end,
            source_text: selected,
            editable: false,
        };
        let idx = self.highlights.partition_point(|h| h.start < start);
        self.highlights.insert(idx, highlight);
        Ok(&self.highlights[idx])
    }

    /// Replace the text after direct typing and reconcile field offsets.
    ///
    /// `edit_position` is the char offset where the edit began. Fields at
    /// or after the edited region shift by the length difference, fields
    /// before it are unchanged, and a field the edit lands inside is
    /// deleted.
    pub fn edit_text(&mut self, new_text: &str, edit_position: usize) -> EditReport {
        let edit = TextEdit::locate(&self.text, new_text, edit_position);
        let delta = edit.length_diff();
        let mut removed = Vec::new();

        self.highlights.retain_mut(|h| {
            if h.start >= edit.removed_end() {
                h.shift(delta);
                true
            } else if h.end <= edit.start {
                true
            } else {
                removed.push(h.id);
                false
            }
        });

        self.text = Rope::from_str(new_text);
        EditReport { edit, removed }
    }

    /// Splice a field's committed value into the text.
    ///
    /// The field's end moves to fit the new value, its snapshot is
    /// replaced, and it stops being editable. Later fields shift by the
    /// length difference; earlier fields are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Unknown`] when no field has `id`.
    pub fn commit_field_edit(&mut self, id: HighlightId, value: &str) -> Result<isize, FieldError> {
        let idx = self.index_of(id)?;
        let (start, old_end) = {
            let h = &self.highlights[idx];
            (h.start, h.end)
        };
        let new_len = value.chars().count();
        #[allow(clippy::cast_possible_wrap)]
        // Text lengths are far below isize::MAX.
        let delta = new_len as isize - (old_end - start) as isize;

        self.text.remove(start..old_end);
        self.text.insert(start, value);

        for (i, h) in self.highlights.iter_mut().enumerate() {
            if i == idx {
                h.end = start + new_len;
                h.source_text = value.to_string();
                h.editable = false;
            } else if h.start >= old_end {
                h.shift(delta);
            }
        }

        // An empty value collapses the field; drop it rather than keep an
        // empty range around.
        if new_len == 0 {
            self.highlights.remove(idx);
        }
        Ok(delta)
    }

    /// Set one field's editable flag.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Unknown`] when no field has `id`.
    pub fn set_editable(&mut self, id: HighlightId, editable: bool) -> Result<(), FieldError> {
        let idx = self.index_of(id)?;
        self.highlights[idx].editable = editable;
        Ok(())
    }

    /// Set every field's editable flag.
    pub fn set_all_editable(&mut self, editable: bool) {
        for h in &mut self.highlights {
            h.editable = editable;
        }
    }

    /// Delete one field; other offsets are unaffected.
    pub fn remove(&mut self, id: HighlightId) -> Option<Highlight> {
        let idx = self.index_of(id).ok()?;
        Some(self.highlights.remove(idx))
    }

    /// Partition the text at field boundaries.
    pub fn segments(&self) -> Vec<Segment> {
        projection::partition(self.len_chars(), &self.highlights)
    }

    /// Check the sorted, non-overlapping, in-bounds invariant.
    pub fn is_consistent(&self) -> bool {
        let len = self.len_chars();
        let in_bounds = self.highlights.iter().all(|h| h.start < h.end && h.end <= len);
        let ordered = self.highlights.windows(2).all(|w| w[0].end <= w[1].start);
        in_bounds && ordered
    }

    fn index_of(&self, id: HighlightId) -> Result<usize, FieldError> {
        self.highlights
            .iter()
            .position(|h| h.id == id)
            .ok_or(FieldError::Unknown(id))
    }

    const fn allocate_id(&mut self) -> HighlightId {
        let id = HighlightId(self.next_id);
        self.next_id += 1;
        id
    }
}

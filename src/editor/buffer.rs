use std::ops::Range;

use ropey::Rope;

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column, in chars within the line.
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    /// Create a cursor at line 0, column 0.
    pub const fn new() -> Self {
        Self {
            line: 0,
            col: 0,
            col_memory: 0,
        }
    }

    /// Create a cursor at a specific position.
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    /// Update column and reset column memory to match.
    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A text buffer backed by a rope, with a cursor and an optional
/// selection anchor.
///
/// All positions are char offsets. Every mutation returns the offset where
/// the edit began so callers can reconcile anything anchored to the text.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    anchor: Option<usize>,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            anchor: None,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Replace the contents, keeping the cursor at the same char offset
    /// where possible and dropping any selection.
    pub fn set_text(&mut self, text: &str) {
        let offset = self.offset();
        self.rope = Rope::from_str(text);
        self.anchor = None;
        self.move_to_offset(offset);
    }

    /// The current cursor position.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// The cursor as a char offset into the whole buffer.
    pub fn offset(&self) -> usize {
        let line = self.cursor.line.min(self.rope.len_lines().saturating_sub(1));
        self.rope.line_to_char(line) + self.cursor.col
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Char offset of the first char on `line_idx`.
    pub fn line_start(&self, line_idx: usize) -> usize {
        self.rope
            .line_to_char(line_idx.min(self.rope.len_lines().saturating_sub(1)))
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in chars (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.chars().count())
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total length in chars.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    // --- Selection ---

    /// The selected char range, if the anchor and cursor differ.
    pub fn selection(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        let offset = self.offset();
        match anchor.cmp(&offset) {
            std::cmp::Ordering::Less => Some(anchor..offset),
            std::cmp::Ordering::Greater => Some(offset..anchor),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Drop the selection anchor.
    pub const fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Move the cursor while extending the selection (Shift+arrow).
    pub fn select(&mut self, direction: Direction) {
        if self.anchor.is_none() {
            self.anchor = Some(self.offset());
        }
        self.step(direction);
    }

    /// Extend the selection to the start or end of the line.
    pub fn select_to_line_edge(&mut self, end: bool) {
        if self.anchor.is_none() {
            self.anchor = Some(self.offset());
        }
        if end {
            let len = self.line_len(self.cursor.line);
            self.cursor.set_col(len);
        } else {
            self.cursor.set_col(0);
        }
    }

    /// Extend the selection to a line and column (mouse drag).
    pub fn select_to(&mut self, line: usize, col: usize) {
        if self.anchor.is_none() {
            self.anchor = Some(self.offset());
        }
        self.move_to(line, col);
    }

    // --- Mutation ---

    /// Insert a character at the cursor, replacing any selection.
    ///
    /// Returns the offset where the edit began.
    pub fn insert_char(&mut self, ch: char) -> usize {
        let start = self.take_selection().unwrap_or_else(|| self.offset());
        self.rope.insert_char(start, ch);
        self.move_to_offset(start + 1);
        start
    }

    /// Insert a string at the cursor, replacing any selection.
    ///
    /// Returns the offset where the edit began, or `None` if nothing
    /// changed.
    pub fn insert_str(&mut self, s: &str) -> Option<usize> {
        if s.is_empty() && self.selection().is_none() {
            return None;
        }
        let start = self.take_selection().unwrap_or_else(|| self.offset());
        self.rope.insert(start, s);
        self.move_to_offset(start + s.chars().count());
        Some(start)
    }

    /// Split the current line at the cursor (Enter key).
    pub fn split_line(&mut self) -> usize {
        self.insert_char('\n')
    }

    /// Delete the selection or the character before the cursor (Backspace).
    ///
    /// Returns the offset where the edit began, or `None` at the start of
    /// the buffer.
    pub fn delete_back(&mut self) -> Option<usize> {
        if let Some(start) = self.take_selection() {
            return Some(start);
        }
        let offset = self.offset();
        if offset == 0 {
            return None;
        }
        let start = if offset >= 2 && self.is_crlf_at(offset - 2) {
            offset - 2
        } else {
            offset - 1
        };
        self.rope.remove(start..offset);
        self.move_to_offset(start);
        Some(start)
    }

    /// Delete the selection or the character at the cursor (Delete key).
    ///
    /// Returns the offset where the edit began, or `None` at the end of the
    /// buffer.
    pub fn delete_forward(&mut self) -> Option<usize> {
        if let Some(start) = self.take_selection() {
            return Some(start);
        }
        let offset = self.offset();
        if offset >= self.rope.len_chars() {
            return None;
        }
        let end = if self.is_crlf_at(offset) {
            offset + 2
        } else {
            offset + 1
        };
        self.rope.remove(offset..end);
        Some(offset)
    }

    // --- Movement ---

    /// Move the cursor in the given direction, dropping any selection.
    pub fn move_cursor(&mut self, direction: Direction) {
        self.anchor = None;
        self.step(direction);
    }

    /// Move cursor to the beginning of the line (Home).
    pub const fn move_home(&mut self) {
        self.anchor = None;
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the line (End).
    pub fn move_end(&mut self) {
        self.anchor = None;
        let len = self.line_len(self.cursor.line);
        self.cursor.set_col(len);
    }

    /// Move cursor one word to the left (Ctrl+Left).
    pub fn move_word_left(&mut self) {
        self.anchor = None;
        if self.cursor.col == 0 {
            if self.cursor.line > 0 {
                self.cursor.line -= 1;
                self.cursor.set_col(self.line_len(self.cursor.line));
            }
            return;
        }

        let line: Vec<char> = self.line_at(self.cursor.line).unwrap_or_default().chars().collect();
        let mut pos = self.cursor.col.min(line.len());
        while pos > 0 && !is_word_char(line[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && is_word_char(line[pos - 1]) {
            pos -= 1;
        }
        self.cursor.set_col(pos);
    }

    /// Move cursor one word to the right (Ctrl+Right).
    pub fn move_word_right(&mut self) {
        self.anchor = None;
        let line_len = self.line_len(self.cursor.line);

        if self.cursor.col >= line_len {
            if self.cursor.line + 1 < self.line_count() {
                self.cursor.line += 1;
                self.cursor.set_col(0);
            }
            return;
        }

        let line: Vec<char> = self.line_at(self.cursor.line).unwrap_or_default().chars().collect();
        let mut pos = self.cursor.col;
        while pos < line.len() && is_word_char(line[pos]) {
            pos += 1;
        }
        while pos < line.len() && !is_word_char(line[pos]) {
            pos += 1;
        }
        self.cursor.set_col(pos);
    }

    /// Move cursor to a specific line and column.
    pub fn move_to(&mut self, line: usize, col: usize) {
        let max_line = self.line_count().saturating_sub(1);
        self.cursor.line = line.min(max_line);
        let max_col = self.line_len(self.cursor.line);
        self.cursor.set_col(col.min(max_col));
    }

    /// Move cursor to a char offset, clamped to the buffer.
    pub fn move_to_offset(&mut self, offset: usize) {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        let col = offset - self.rope.line_to_char(line);
        self.cursor.line = line;
        self.cursor.set_col(col.min(self.line_len(line)));
    }

    /// Move cursor to the start of the buffer (Ctrl+Home).
    pub const fn move_to_start(&mut self) {
        self.anchor = None;
        self.cursor.line = 0;
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the buffer (Ctrl+End).
    pub fn move_to_end(&mut self) {
        self.anchor = None;
        let last_line = self.line_count().saturating_sub(1);
        self.cursor.line = last_line;
        self.cursor.set_col(self.line_len(last_line));
    }

    // --- Private helpers ---

    /// Remove the selected text, leaving the cursor at its start.
    /// Whether a `\r\n` pair starts at `offset`; it is deleted as one break.
    fn is_crlf_at(&self, offset: usize) -> bool {
        offset + 1 < self.rope.len_chars()
            && self.rope.char(offset) == '\r'
            && self.rope.char(offset + 1) == '\n'
    }

    fn take_selection(&mut self) -> Option<usize> {
        let range = self.selection();
        self.anchor = None;
        let range = range?;
        self.rope.remove(range.clone());
        self.move_to_offset(range.start);
        Some(range.start)
    }

    fn step(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_up(),
            Direction::Down => self.move_down(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.set_col(self.cursor.col - 1);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn move_right(&mut self) {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col < line_len {
            self.cursor.set_col(self.cursor.col + 1);
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_up(&mut self) {
        if self.cursor.line > 0 {
            self.cursor.line -= 1;
            let max_col = self.line_len(self.cursor.line);
            self.cursor.col = self.cursor.col_memory.min(max_col);
        }
    }

    fn move_down(&mut self) {
        if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            let max_col = self.line_len(self.cursor.line);
            self.cursor.col = self.cursor.col_memory.min(max_col);
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("anchor", &self.anchor)
            .finish()
    }
}

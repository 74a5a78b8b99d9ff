//! Locating a single contiguous edit between two versions of the text.

use ropey::Rope;

use super::HighlightId;

/// One contiguous replacement: `removed` chars at `start` in the old text
/// became `inserted` chars at `start` in the new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub removed: usize,
    pub inserted: usize,
}

impl TextEdit {
    /// Find the edited region between `old` and `new`.
    ///
    /// The common prefix is capped at `hint` so an ambiguous edit (typing
    /// `l` into `Hello`) is placed where the cursor was. The common suffix
    /// never reaches back into the prefix.
    pub fn locate(old: &Rope, new: &str, hint: usize) -> Self {
        let old: Vec<char> = old.chars().collect();
        let new: Vec<char> = new.chars().collect();

        let prefix = old
            .iter()
            .zip(&new)
            .take_while(|(a, b)| a == b)
            .count()
            .min(hint);

        let max_suffix = (old.len() - prefix).min(new.len() - prefix);
        let suffix = old[prefix..]
            .iter()
            .rev()
            .zip(new[prefix..].iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();

        Self {
            start: prefix,
            removed: old.len() - prefix - suffix,
            inserted: new.len() - prefix - suffix,
        }
    }

    /// First offset after the removed region, in old-text coordinates.
    pub const fn removed_end(&self) -> usize {
        self.start + self.removed
    }

    /// New length minus old length.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn length_diff(&self) -> isize {
        self.inserted as isize - self.removed as isize
    }

    /// Whether the text actually changed.
    pub const fn is_noop(&self) -> bool {
        self.removed == 0 && self.inserted == 0
    }
}

/// Outcome of reconciling fields with a direct text edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditReport {
    /// The located edit
    pub edit: TextEdit,
    /// Fields deleted because the edit landed inside them
    pub removed: Vec<HighlightId>,
}

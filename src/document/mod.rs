//! The text buffer and its highlighted fields.
//!
//! This module handles:
//! - Creating fields from selections while keeping them disjoint
//! - Reconciling field offsets when the text is typed into directly
//! - Splicing committed field values back into the text
//! - Partitioning the text at field boundaries for rendering

mod edit;
mod projection;
mod types;

pub use edit::{EditReport, TextEdit};
pub use projection::{Segment, partition};
pub use types::{Document, FieldError, FieldSeed, Highlight, HighlightId, SelectionRejected};

/// Text shown in a fresh session.
pub const WELCOME_TEXT: &str =
    "Welcome to the text editor! Click and drag to select text portions for editing.";

//! Rope-backed text buffer with a char-offset cursor and selection.
//!
//! Stands in for a text area: the buffer knows the cursor and selection as
//! char offsets, so the session never inspects presentation state.

mod buffer;

pub use buffer::{Cursor, Direction, EditorBuffer};

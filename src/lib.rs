// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. session::SessionError)
    clippy::module_name_repetitions
)]

//! # Stencil
//!
//! A terminal template editor.
//!
//! An author marks regions of free text as fields and saves the text plus
//! field boundaries as a JSON template. A filler loads the template, types
//! values into the fields only, and exports the completed text.
//!
//! ## Architecture
//!
//! Stencil uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`document`]: Text plus highlighted fields, offset bookkeeping
//! - [`session`]: Roles, template lock, and the permission table
//! - [`template`]: Template JSON format
//! - [`files`]: Reading imports, writing saves
//! - [`editor`]: Text area buffer for the editable view
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`config`]: Saved default flags

pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod files;
pub mod session;
pub mod template;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::{Document, Highlight, HighlightId};
    pub use crate::session::{EditorSession, Lock, Role, View};
    pub use crate::template::Template;
}

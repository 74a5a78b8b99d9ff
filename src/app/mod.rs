//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! `update` never touches the filesystem. Reads and saves are queued as
//! [`Effect`]s and carried out by the loop, which feeds the outcome back in
//! as another message.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Effect, FieldDraft, Focus, Model, Prompt, PromptKind, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::session::Role;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    role: Role,
    initial_file: Option<PathBuf>,
    export_dir: PathBuf,
    use_picker: bool,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create a new application with an Author session on the welcome text.
    pub fn new() -> Self {
        Self {
            role: Role::Author,
            initial_file: None,
            export_dir: PathBuf::from("."),
            use_picker: true,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Start in the given role.
    pub const fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Load a file on startup: `.json` as a template, anything else as text.
    pub fn with_initial_file(mut self, path: Option<PathBuf>) -> Self {
        self.initial_file = path;
        self
    }

    /// Directory for automatic downloads and suggested save paths.
    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    /// Ask for a save path (`true`) or download straight into the export
    /// directory (`false`).
    pub const fn with_picker(mut self, enabled: bool) -> Self {
        self.use_picker = enabled;
        self
    }

    /// Set config paths to show in help.
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}

#[cfg(test)]
mod tests;

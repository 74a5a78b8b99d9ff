//! Editing session: who is editing, whether the template is locked, and
//! which operations that combination allows.
//!
//! The Role x Lock table in [`permits`] is the single place that decides
//! whether a mutating operation may run. [`EditorSession`] consults it
//! before touching the document.

mod controller;

pub use controller::{EditorSession, PendingSave, SaveKind, SessionError};

use std::fmt;

/// Which kind of user is driving the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Role {
    /// Defines templates: text plus field boundaries
    #[default]
    Author,
    /// Supplies values for already-defined fields
    Filler,
}

impl Role {
    /// Parse a config-file or CLI token.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "author" => Some(Self::Author),
            "filler" => Some(Self::Filler),
            _ => None,
        }
    }

    /// The token used on the command line and in config files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Filler => "filler",
        }
    }

    /// The other role.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Author => Self::Filler,
            Self::Filler => Self::Author,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Author => "Author",
            Self::Filler => "Filler",
        })
    }
}

/// Template lock. Only meaningful for the Author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lock {
    #[default]
    Unlocked,
    Locked,
}

/// Which render projection the session currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Free-form text editing with highlights overlaid
    Editable,
    /// Text partitioned into plain spans and field tokens
    Fields,
}

/// Every operation that can mutate the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    TypeText,
    SelectRange,
    RemoveField,
    SetFieldEditable,
    CommitFieldEdit,
    ConvertAllToInputs,
    SaveTemplate,
    EditTemplate,
    LoadTemplate,
    LoadTextFile,
    ExportText,
    EditTemplateMeta,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TypeText => "Typing",
            Self::SelectRange => "Marking fields",
            Self::RemoveField => "Removing fields",
            Self::SetFieldEditable => "Editing fields",
            Self::CommitFieldEdit => "Filling fields",
            Self::ConvertAllToInputs => "Converting highlights",
            Self::SaveTemplate => "Saving the template",
            Self::EditTemplate => "Editing the template",
            Self::LoadTemplate => "Loading a template",
            Self::LoadTextFile => "Loading a text file",
            Self::ExportText => "Exporting",
            Self::EditTemplateMeta => "Editing the template name",
        })
    }
}

/// Whether `op` is allowed for `role` under `lock`.
///
/// The Filler ignores the lock and always works in the field view.
pub const fn permits(role: Role, lock: Lock, op: Operation) -> bool {
    use Operation as Op;
    match (role, lock) {
        (Role::Author, Lock::Unlocked) => matches!(
            op,
            Op::TypeText
                | Op::SelectRange
                | Op::RemoveField
                | Op::SetFieldEditable
                | Op::ConvertAllToInputs
                | Op::SaveTemplate
                | Op::LoadTemplate
                | Op::LoadTextFile
                | Op::ExportText
                | Op::EditTemplateMeta
        ),
        (Role::Author, Lock::Locked) => matches!(
            op,
            Op::SetFieldEditable
                | Op::CommitFieldEdit
                | Op::EditTemplate
                | Op::LoadTemplate
                | Op::ExportText
        ),
        (Role::Filler, _) => matches!(
            op,
            Op::SetFieldEditable | Op::CommitFieldEdit | Op::LoadTemplate | Op::ExportText
        ),
    }
}

/// Role, lock, and template metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub role: Role,
    pub lock: Lock,
    pub template_name: String,
    pub template_description: String,
}

impl SessionState {
    /// The projection to render.
    pub const fn view(&self) -> View {
        match (self.role, self.lock) {
            (Role::Author, Lock::Unlocked) => View::Editable,
            _ => View::Fields,
        }
    }

    /// Whether `op` is allowed right now.
    pub const fn permits(&self, op: Operation) -> bool {
        permits(self.role, self.lock, op)
    }

    /// Whether a template has been named or loaded.
    pub fn has_template(&self) -> bool {
        !self.template_name.is_empty()
    }

    /// `Template: <name> (Locked - Use Mode)` and friends, when named.
    pub fn status_line(&self) -> Option<String> {
        if !self.has_template() {
            return None;
        }
        let suffix = match (self.role, self.lock) {
            (Role::Filler, _) => return Some(format!("Template: {}", self.template_name)),
            (Role::Author, Lock::Locked) => "(Locked - Use Mode)",
            (Role::Author, Lock::Unlocked) => "(Unlocked - Edit Mode)",
        };
        Some(format!("Template: {} {suffix}", self.template_name))
    }
}

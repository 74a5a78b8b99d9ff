use tracing::{debug, info, warn};

use super::{Lock, Operation, Role, SessionState, View};
use crate::document::{
    Document, EditReport, FieldError, Highlight, HighlightId, Segment, SelectionRejected,
    WELCOME_TEXT,
};
use crate::files::{self, SaveOutcome};
use crate::template::{Template, TemplateError};

/// Errors raised by session operations. The session is unchanged whenever
/// one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{op} is not available as {role} ({lock:?})")]
    NotPermitted { op: Operation, role: Role, lock: Lock },
    #[error(transparent)]
    Selection(#[from] SelectionRejected),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Highlight some text before converting")]
    NoHighlights,
    #[error("Please enter a template name")]
    MissingTemplateName,
    #[error("Load a template before saving the form")]
    NoTemplateLoaded,
}

/// What a pending save will produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Template,
    Export,
}

/// Bytes captured when a save begins. Later edits cannot change them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    pub kind: SaveKind,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The document plus session state, mutated only through checked
/// operations.
#[derive(Debug, Clone)]
pub struct EditorSession {
    document: Document,
    state: SessionState,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// A fresh Author session holding the welcome text.
    pub fn new() -> Self {
        Self::with_text(WELCOME_TEXT)
    }

    /// A fresh Author session holding `text`.
    pub fn with_text(text: &str) -> Self {
        Self {
            document: Document::new(text),
            state: SessionState::default(),
        }
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    pub const fn view(&self) -> View {
        self.state.view()
    }

    /// The field-view partition of the current text.
    pub fn projection(&self) -> Vec<Segment> {
        self.document.segments()
    }

    /// The first field currently rendered as an input.
    pub fn first_editable(&self) -> Option<HighlightId> {
        self.document
            .highlights()
            .iter()
            .find(|h| h.editable)
            .map(|h| h.id)
    }

    fn check(&self, op: Operation) -> Result<(), SessionError> {
        if self.state.permits(op) {
            Ok(())
        } else {
            debug!(?op, role = ?self.state.role, lock = ?self.state.lock, "operation refused");
            Err(SessionError::NotPermitted {
                op,
                role: self.state.role,
                lock: self.state.lock,
            })
        }
    }

    /// Switch role. Text, fields, and lock are left alone.
    pub fn set_role(&mut self, role: Role) {
        if self.state.role != role {
            info!(from = ?self.state.role, to = ?role, "role changed");
            self.state.role = role;
        }
    }

    /// Set the template name.
    ///
    /// # Errors
    ///
    /// Refused unless the Author is unlocked.
    pub fn set_template_name(&mut self, name: &str) -> Result<(), SessionError> {
        self.check(Operation::EditTemplateMeta)?;
        self.state.template_name = name.to_string();
        Ok(())
    }

    /// Set the template description.
    ///
    /// # Errors
    ///
    /// Refused unless the Author is unlocked.
    pub fn set_template_description(&mut self, description: &str) -> Result<(), SessionError> {
        self.check(Operation::EditTemplateMeta)?;
        self.state.template_description = description.to_string();
        Ok(())
    }

    /// Replace the text after direct typing at `edit_position`.
    ///
    /// # Errors
    ///
    /// Refused unless the Author is unlocked.
    pub fn type_text(&mut self, new_text: &str, edit_position: usize) -> Result<EditReport, SessionError> {
        self.check(Operation::TypeText)?;
        let report = self.document.edit_text(new_text, edit_position);
        for id in &report.removed {
            debug!(%id, at = report.edit.start, "field removed by edit");
        }
        Ok(report)
    }

    /// Mark `[start, end)` as a new field.
    ///
    /// # Errors
    ///
    /// Refused unless the Author is unlocked, or when the selection is
    /// rejected by the document.
    pub fn select_range(&mut self, start: usize, end: usize) -> Result<HighlightId, SessionError> {
        self.check(Operation::SelectRange)?;
        match self.document.select_range(start, end) {
            Ok(h) => {
                info!(id = %h.id, start, end, "field created");
                Ok(h.id)
            }
            Err(err) => {
                debug!(start, end, %err, "selection rejected");
                Err(err.into())
            }
        }
    }

    /// Delete a field.
    ///
    /// # Errors
    ///
    /// Refused unless the Author is unlocked, or when `id` is unknown.
    pub fn remove_highlight(&mut self, id: HighlightId) -> Result<Highlight, SessionError> {
        self.check(Operation::RemoveField)?;
        let removed = self.document.remove(id).ok_or(FieldError::Unknown(id))?;
        info!(%id, "field removed");
        Ok(removed)
    }

    /// Turn one field into an inline input.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Unknown`] when `id` is unknown.
    pub fn make_editable(&mut self, id: HighlightId) -> Result<(), SessionError> {
        self.check(Operation::SetFieldEditable)?;
        self.document.set_editable(id, true)?;
        debug!(%id, "field made editable");
        Ok(())
    }

    /// Splice a field's finished value into the text.
    ///
    /// # Errors
    ///
    /// Refused in the editable view, or when `id` is unknown.
    pub fn commit_field_edit(&mut self, id: HighlightId, value: &str) -> Result<isize, SessionError> {
        self.check(Operation::CommitFieldEdit)?;
        let delta = self.document.commit_field_edit(id, value)?;
        info!(%id, delta, "field committed");
        Ok(delta)
    }

    /// Make every field an input and lock the template for preview.
    ///
    /// # Errors
    ///
    /// Refused unless the Author is unlocked; fails with
    /// [`SessionError::NoHighlights`] when there is nothing to convert.
    pub fn convert_all_to_inputs(&mut self) -> Result<(), SessionError> {
        self.check(Operation::ConvertAllToInputs)?;
        if self.document.highlights().is_empty() {
            return Err(SessionError::NoHighlights);
        }
        self.document.set_all_editable(true);
        self.state.lock = Lock::Locked;
        info!(fields = self.document.highlights().len(), "converted fields to inputs");
        Ok(())
    }

    /// Unlock the template for further authoring.
    ///
    /// # Errors
    ///
    /// Refused unless the Author is locked.
    pub fn edit_template(&mut self) -> Result<(), SessionError> {
        self.check(Operation::EditTemplate)?;
        self.state.lock = Lock::Unlocked;
        info!("template unlocked");
        Ok(())
    }

    /// Snapshot the template for saving.
    ///
    /// # Errors
    ///
    /// Refused unless the Author is unlocked; fails with
    /// [`SessionError::MissingTemplateName`] on a blank name.
    pub fn prepare_template_save(&self) -> Result<PendingSave, SessionError> {
        self.check(Operation::SaveTemplate)?;
        if self.state.template_name.trim().is_empty() {
            return Err(SessionError::MissingTemplateName);
        }
        let template = Template::capture(
            &self.document,
            &self.state.template_name,
            &self.state.template_description,
        );
        Ok(PendingSave {
            kind: SaveKind::Template,
            file_name: template.file_name(),
            bytes: template.to_json()?.into_bytes(),
        })
    }

    /// Snapshot the text for export.
    ///
    /// # Errors
    ///
    /// Fails with [`SessionError::NoTemplateLoaded`] when the Filler has
    /// not loaded a template yet.
    pub fn prepare_export(&self) -> Result<PendingSave, SessionError> {
        self.check(Operation::ExportText)?;
        if self.state.role == Role::Filler && !self.state.has_template() {
            return Err(SessionError::NoTemplateLoaded);
        }
        Ok(PendingSave {
            kind: SaveKind::Export,
            file_name: files::export_file_name(self.state.role).to_string(),
            bytes: self.document.text().into_bytes(),
        })
    }

    /// Apply the result of a finished save. A saved template locks the
    /// session; cancellation and exports change nothing.
    pub fn complete_save(&mut self, pending: &PendingSave, outcome: &SaveOutcome) {
        match (pending.kind, outcome) {
            (SaveKind::Template, SaveOutcome::Saved(path)) => {
                self.state.lock = Lock::Locked;
                info!(path = %path.display(), "template saved and locked");
            }
            (SaveKind::Export, SaveOutcome::Saved(path)) => {
                info!(path = %path.display(), "text exported");
            }
            (_, SaveOutcome::Cancelled) => debug!(kind = ?pending.kind, "save cancelled"),
        }
    }

    /// Parse and install a template.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON or shape; the session is unchanged.
    pub fn load_template_json(&mut self, raw: &str) -> Result<(), SessionError> {
        self.check(Operation::LoadTemplate)?;
        let template = Template::from_json(raw).inspect_err(|err| warn!(%err, "template rejected"))?;
        self.load_template(&template)
    }

    /// Install a template. The Filler gets every field as an input; the
    /// Author gets the fields as stored and a locked session.
    ///
    /// # Errors
    ///
    /// Fails with a format error when the field ranges do not fit the text.
    pub fn load_template(&mut self, template: &Template) -> Result<(), SessionError> {
        self.check(Operation::LoadTemplate)?;
        let mut seeds = template.field_seeds();
        if self.state.role == Role::Filler {
            for seed in &mut seeds {
                seed.editable = true;
            }
        }
        self.document
            .replace_with_fields(&template.text, seeds)
            .map_err(|err| TemplateError::InvalidFormat(err.to_string()))?;

        self.state.template_name.clone_from(&template.name);
        self.state
            .template_description
            .clone_from(&template.description);
        if self.state.role == Role::Author {
            self.state.lock = Lock::Locked;
        }
        info!(
            name = %template.name,
            fields = self.document.highlights().len(),
            role = ?self.state.role,
            "template loaded"
        );
        Ok(())
    }

    /// Replace the text with an imported file and drop every field.
    ///
    /// # Errors
    ///
    /// Refused unless the Author is unlocked.
    pub fn load_text_file(&mut self, raw: &str) -> Result<(), SessionError> {
        self.check(Operation::LoadTextFile)?;
        self.document.replace_text(raw);
        info!(chars = self.document.len_chars(), "text file loaded");
        Ok(())
    }
}

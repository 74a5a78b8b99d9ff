use std::path::PathBuf;

use tracing::debug;

use crate::app::{Effect, FieldDraft, Focus, Model, Prompt, PromptKind, ToastLevel};
use crate::document::HighlightId;
use crate::editor::{Direction, EditorBuffer};
use crate::files::{SaveOutcome, SaveTarget};
use crate::session::{Lock, Operation, PendingSave, SaveKind, SessionError, View};

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editable view
    /// Insert a character at the cursor
    EditorInsertChar(char),
    /// Insert a newline at the cursor (Enter)
    EditorSplitLine,
    /// Delete selection or character before cursor (Backspace)
    EditorDeleteBack,
    /// Delete selection or character at cursor (Delete)
    EditorDeleteForward,
    /// Move cursor in a direction
    EditorMoveCursor(Direction),
    /// Extend the selection in a direction (Shift+arrow)
    EditorSelect(Direction),
    /// Move cursor to beginning of line (Home)
    EditorMoveHome,
    /// Move cursor to end of line (End)
    EditorMoveEnd,
    /// Extend the selection to the line start or end (Shift+Home/End)
    EditorSelectLineEdge(bool),
    /// Move cursor one word left (Ctrl+Left)
    EditorMoveWordLeft,
    /// Move cursor one word right (Ctrl+Right)
    EditorMoveWordRight,
    /// Move cursor to start of buffer (Ctrl+Home)
    EditorMoveToStart,
    /// Move cursor to end of buffer (Ctrl+End)
    EditorMoveToEnd,
    /// Move cursor to absolute position (line, col), e.g. from a mouse click
    EditorMoveTo(usize, usize),
    /// Extend the selection to (line, col), e.g. from a mouse drag
    EditorSelectTo(usize, usize),
    /// Bracketed paste into the editor, an input, or the prompt
    Paste(String),
    /// Turn the current selection into a field
    MarkSelection,
    /// Remove the field under the cursor
    RemoveFieldAtCursor,

    // Field view
    /// Focus the next field
    NextField,
    /// Focus the previous field
    PrevField,
    /// Make the focused field an inline input
    ActivateField,
    /// Focus a field and make it an input, e.g. from a mouse click
    FocusField(HighlightId),
    /// Type into the focused input
    FieldInsertChar(char),
    /// Backspace in the focused input
    FieldDeleteBack,
    /// Delete in the focused input
    FieldDeleteForward,
    /// Move the input cursor left or right
    FieldMoveCursor(Direction),
    /// Move the input cursor to the start or end
    FieldMoveEdge(bool),
    /// Commit the focused input (Enter)
    CommitField,
    /// Throw away the focused input's draft (Esc)
    DiscardDraft,

    // Field list panel
    /// Move focus between document and field list
    ToggleFocus,
    PanelUp,
    PanelDown,
    /// Select a row of the field list
    PanelSelect(usize),
    /// Make the selected field editable
    PanelEditField,
    /// Remove the selected field
    PanelRemoveField,

    // Session
    ToggleRole,
    ConvertToInputs,
    SaveTemplate,
    EditTemplate,
    Export,
    PromptTemplateName,
    PromptTemplateDescription,
    PromptOpenTextFile,
    PromptOpenTemplate,

    // Prompt
    PromptInput(char),
    PromptBackspace,
    PromptSubmit,
    PromptCancel,

    // I/O results
    /// A text file was read for import
    TextFileRead(String),
    /// A template file was read
    TemplateRead(String),
    /// A pending save landed at a path
    SaveFinished { pending: PendingSave, path: PathBuf },
    /// An I/O effect failed
    IoFailed(String),

    // Scrolling
    ScrollUp(usize),
    ScrollDown(usize),

    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,

    // Window
    /// Terminal resized
    Resize(u16, u16),
    /// Redraw screen
    Redraw,

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here. I/O is
/// queued as [`Effect`]s on the model and carried out by the event loop.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        // Editable view
        Message::EditorInsertChar(ch) => {
            let start = model.editor.insert_char(ch);
            apply_typing(&mut model, start);
        }
        Message::EditorSplitLine => {
            let start = model.editor.split_line();
            apply_typing(&mut model, start);
        }
        Message::EditorDeleteBack => {
            if let Some(start) = model.editor.delete_back() {
                apply_typing(&mut model, start);
            }
        }
        Message::EditorDeleteForward => {
            if let Some(start) = model.editor.delete_forward() {
                apply_typing(&mut model, start);
            }
        }
        Message::EditorMoveCursor(dir) => {
            model.editor.move_cursor(dir);
            editor_ensure_cursor_visible(&mut model);
        }
        Message::EditorSelect(dir) => {
            model.editor.select(dir);
            editor_ensure_cursor_visible(&mut model);
        }
        Message::EditorMoveHome => model.editor.move_home(),
        Message::EditorMoveEnd => model.editor.move_end(),
        Message::EditorSelectLineEdge(end) => model.editor.select_to_line_edge(end),
        Message::EditorMoveWordLeft => {
            model.editor.move_word_left();
            editor_ensure_cursor_visible(&mut model);
        }
        Message::EditorMoveWordRight => {
            model.editor.move_word_right();
            editor_ensure_cursor_visible(&mut model);
        }
        Message::EditorMoveToStart => {
            model.editor.move_to_start();
            editor_ensure_cursor_visible(&mut model);
        }
        Message::EditorMoveToEnd => {
            model.editor.move_to_end();
            editor_ensure_cursor_visible(&mut model);
        }
        Message::EditorMoveTo(line, col) => {
            model.focus = Focus::Document;
            model.editor.clear_selection();
            model.editor.move_to(line, col);
        }
        Message::EditorSelectTo(line, col) => {
            model.editor.select_to(line, col);
            editor_ensure_cursor_visible(&mut model);
        }
        Message::Paste(text) => paste(&mut model, &text),
        Message::MarkSelection => mark_selection(&mut model),
        Message::RemoveFieldAtCursor => {
            let offset = model.editor.offset();
            let id = model
                .session
                .document()
                .highlight_at(offset)
                .map(|h| h.id);
            match id {
                Some(id) => remove_field(&mut model, id),
                None => model.show_toast(ToastLevel::Info, "No field at cursor"),
            }
        }

        // Field view
        Message::NextField => cycle_field(&mut model, true),
        Message::PrevField => cycle_field(&mut model, false),
        Message::ActivateField => {
            if let Some(id) = model.active_field {
                make_editable(&mut model, id);
            }
        }
        Message::FocusField(id) => {
            if let Some(current) = model.active_field
                && current != id
            {
                commit_field(&mut model, current);
            }
            if model.session.document().highlight(id).is_some() {
                model.focus = Focus::Document;
                model.active_field = Some(id);
                make_editable(&mut model, id);
            }
        }
        Message::FieldInsertChar(ch) => with_active_draft(&mut model, |d| d.insert(ch)),
        Message::FieldDeleteBack => with_active_draft(&mut model, FieldDraft::backspace),
        Message::FieldDeleteForward => with_active_draft(&mut model, FieldDraft::delete),
        Message::FieldMoveCursor(dir) => with_active_draft(&mut model, |d| match dir {
            Direction::Left => d.left(),
            Direction::Right => d.right(),
            Direction::Up | Direction::Down => {}
        }),
        Message::FieldMoveEdge(end) => {
            with_active_draft(&mut model, |d| if end { d.end() } else { d.home() });
        }
        Message::CommitField => {
            if let Some(id) = model.active_field {
                commit_field(&mut model, id);
            }
        }
        Message::DiscardDraft => {
            if let Some(id) = model.active_field {
                model.drafts.remove(&id);
            }
        }

        // Field list panel
        Message::ToggleFocus => {
            let wants_panel = model.focus == Focus::Document
                && model.role() == crate::session::Role::Author
                && !model.session.document().highlights().is_empty();
            model.focus = if wants_panel && panel_unlocked(&mut model) {
                Focus::Panel
            } else {
                Focus::Document
            };
        }
        Message::PanelUp => {
            model.panel_selected = model.panel_selected.saturating_sub(1);
        }
        Message::PanelDown => {
            let max = model.session.document().highlights().len().saturating_sub(1);
            model.panel_selected = (model.panel_selected + 1).min(max);
        }
        Message::PanelSelect(idx) => {
            if idx < model.session.document().highlights().len() && panel_unlocked(&mut model) {
                model.focus = Focus::Panel;
                model.panel_selected = idx;
            }
        }
        Message::PanelEditField => {
            if let Some(id) = selected_panel_field(&model)
                && panel_unlocked(&mut model)
            {
                make_editable(&mut model, id);
            }
        }
        Message::PanelRemoveField => {
            if let Some(id) = selected_panel_field(&model)
                && panel_unlocked(&mut model)
            {
                remove_field(&mut model, id);
            }
        }

        // Session
        Message::ToggleRole => {
            let role = model.role().toggled();
            model.session.set_role(role);
            model.resync();
            if model.view() == View::Fields && model.active_field.is_none() {
                model.autofocus_first_editable();
            }
            model.show_toast(ToastLevel::Info, format!("Role: {role}"));
        }
        Message::ConvertToInputs => match model.session.convert_all_to_inputs() {
            Ok(()) => {
                model.resync();
                model.autofocus_first_editable();
                model.show_toast(ToastLevel::Info, "Previewing template with inputs");
            }
            Err(err) => report(&mut model, &err),
        },
        Message::SaveTemplate => match model.session.prepare_template_save() {
            Ok(pending) => begin_save(&mut model, pending),
            Err(err) => report(&mut model, &err),
        },
        Message::EditTemplate => match model.session.edit_template() {
            Ok(()) => {
                model.resync();
                model.active_field = None;
                model.show_toast(ToastLevel::Info, "Template unlocked for editing");
            }
            Err(err) => report(&mut model, &err),
        },
        Message::Export => match model.session.prepare_export() {
            Ok(pending) => begin_save(&mut model, pending),
            Err(err) => report(&mut model, &err),
        },
        Message::PromptTemplateName => {
            if guard(&mut model, Operation::EditTemplateMeta) {
                let current = model.session.state().template_name.clone();
                model.prompt = Some(Prompt::new(PromptKind::TemplateName, current));
            }
        }
        Message::PromptTemplateDescription => {
            if guard(&mut model, Operation::EditTemplateMeta) {
                let current = model.session.state().template_description.clone();
                model.prompt = Some(Prompt::new(PromptKind::TemplateDescription, current));
            }
        }
        Message::PromptOpenTextFile => {
            if guard(&mut model, Operation::LoadTextFile) {
                model.prompt = Some(Prompt::new(PromptKind::OpenTextFile, String::new()));
            }
        }
        Message::PromptOpenTemplate => {
            if guard(&mut model, Operation::LoadTemplate) {
                model.prompt = Some(Prompt::new(PromptKind::OpenTemplate, String::new()));
            }
        }

        // Prompt
        Message::PromptInput(ch) => {
            if let Some(prompt) = &mut model.prompt {
                prompt.input.push(ch);
            }
        }
        Message::PromptBackspace => {
            if let Some(prompt) = &mut model.prompt {
                prompt.input.pop();
            }
        }
        Message::PromptSubmit => {
            if let Some(prompt) = model.prompt.take() {
                submit_prompt(&mut model, prompt);
            }
        }
        Message::PromptCancel => {
            if let Some(Prompt {
                kind: PromptKind::SaveAs(pending),
                ..
            }) = model.prompt.take()
            {
                model.session.complete_save(&pending, &SaveOutcome::Cancelled);
            }
        }

        // I/O results
        Message::TextFileRead(raw) => match model.session.load_text_file(&raw) {
            Ok(()) => {
                model.drafts.clear();
                model.editor = EditorBuffer::from_text(&model.session.document().text());
                model.editor_scroll_offset = 0;
                model.resync();
                model.show_toast(ToastLevel::Info, "Text file loaded");
            }
            Err(err) => report(&mut model, &err),
        },
        Message::TemplateRead(raw) => match model.session.load_template_json(&raw) {
            Ok(()) => {
                model.drafts.clear();
                model.editor_scroll_offset = 0;
                model.fields_scroll_offset = 0;
                model.resync();
                model.autofocus_first_editable();
                let name = model.session.state().template_name.clone();
                model.show_toast(ToastLevel::Info, format!("Loaded template: {name}"));
            }
            Err(err) => report(&mut model, &err),
        },
        Message::SaveFinished { pending, path } => {
            let label = match pending.kind {
                SaveKind::Template => "Template saved",
                SaveKind::Export => "Text exported",
            };
            model
                .session
                .complete_save(&pending, &SaveOutcome::Saved(path.clone()));
            model.resync();
            if pending.kind == SaveKind::Template {
                model.focus = Focus::Document;
            }
            model.show_toast(ToastLevel::Info, format!("{label}: {}", path.display()));
        }
        Message::IoFailed(err) => model.show_toast(ToastLevel::Error, err),

        // Scrolling
        Message::ScrollUp(n) => match model.view() {
            View::Editable => {
                model.editor_scroll_offset = model.editor_scroll_offset.saturating_sub(n);
            }
            View::Fields => {
                model.fields_scroll_offset = model.fields_scroll_offset.saturating_sub(n);
            }
        },
        Message::ScrollDown(n) => match model.view() {
            View::Editable => {
                let max = model.editor.line_count().saturating_sub(1);
                model.editor_scroll_offset = (model.editor_scroll_offset + n).min(max);
            }
            View::Fields => {
                let width = crate::ui::document_area(model.width, model.height).width;
                let rows = crate::ui::fields::layout(&model, width as usize).len();
                let max = rows.saturating_sub(1);
                model.fields_scroll_offset = (model.fields_scroll_offset + n).min(max);
            }
        },

        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }

        // Window
        Message::Resize(width, height) => {
            model.width = width;
            model.height = height;
            editor_ensure_cursor_visible(&mut model);
        }
        Message::Redraw => {}

        // Application
        Message::Quit => {
            model.should_quit = true;
        }
    }
    model
}

/// Feed the editor buffer's new text to the session.
fn apply_typing(model: &mut Model, edit_start: usize) {
    let text = model.editor.text();
    match model.session.type_text(&text, edit_start) {
        Ok(report) => {
            if !report.removed.is_empty() {
                model.show_toast(
                    ToastLevel::Info,
                    format!("Removed {} field(s) edited inside", report.removed.len()),
                );
            }
            model.resync();
        }
        Err(err) => {
            report(model, &err);
            let text = model.session.document().text();
            model.editor.set_text(&text);
        }
    }
    editor_ensure_cursor_visible(model);
}

fn paste(model: &mut Model, text: &str) {
    let first_line = text.lines().next().unwrap_or_default();
    if let Some(prompt) = &mut model.prompt {
        prompt.input.push_str(first_line);
        return;
    }
    match model.view() {
        View::Editable => {
            let text = text.replace("\r\n", "\n");
            if let Some(start) = model.editor.insert_str(&text) {
                apply_typing(model, start);
            }
        }
        View::Fields => with_active_draft(model, |draft| {
            for ch in first_line.chars() {
                draft.insert(ch);
            }
        }),
    }
}

fn mark_selection(model: &mut Model) {
    let Some(range) = model.editor.selection() else {
        model.show_toast(ToastLevel::Info, "Select text first (Shift+arrows or drag)");
        return;
    };
    match model.session.select_range(range.start, range.end) {
        Ok(id) => {
            model.editor.clear_selection();
            model.editor.move_to_offset(range.start);
            if let Some(idx) = model
                .session
                .document()
                .highlights()
                .iter()
                .position(|h| h.id == id)
            {
                model.panel_selected = idx;
            }
            let count = model.session.document().highlights().len();
            model.show_toast(ToastLevel::Info, format!("Field added ({count} total)"));
        }
        Err(err) => {
            model.editor.clear_selection();
            report(model, &err);
        }
    }
}

fn remove_field(model: &mut Model, id: HighlightId) {
    match model.session.remove_highlight(id) {
        Ok(h) => {
            model.resync();
            model.show_toast(ToastLevel::Info, format!("Removed field \"{}\"", h.source_text));
        }
        Err(err) => report(model, &err),
    }
}

fn make_editable(model: &mut Model, id: HighlightId) {
    let already = model
        .session
        .document()
        .highlight(id)
        .is_some_and(|h| h.editable);
    if already {
        model.active_field = Some(id);
        return;
    }
    match model.session.make_editable(id) {
        Ok(()) => {
            if model.view() == View::Fields {
                model.active_field = Some(id);
            }
        }
        Err(err) => report(model, &err),
    }
}

fn commit_field(model: &mut Model, id: HighlightId) {
    let editable = model
        .session
        .document()
        .highlight(id)
        .is_some_and(|h| h.editable);
    if !editable {
        return;
    }
    let value = model.draft_value(id).unwrap_or_default();
    match model.session.commit_field_edit(id, &value) {
        Ok(_) => {
            model.drafts.remove(&id);
            model.resync();
        }
        Err(err) => report(model, &err),
    }
}

/// Move field focus, committing the field being left.
fn cycle_field(model: &mut Model, forward: bool) {
    if let Some(current) = model.active_field {
        commit_field(model, current);
    }
    let ids: Vec<HighlightId> = model
        .session
        .document()
        .highlights()
        .iter()
        .map(|h| h.id)
        .collect();
    if ids.is_empty() {
        model.active_field = None;
        return;
    }
    let current = model
        .active_field
        .and_then(|id| ids.iter().position(|other| *other == id));
    let next = match (current, forward) {
        (None, true) => 0,
        (None, false) => ids.len() - 1,
        (Some(idx), true) => (idx + 1) % ids.len(),
        (Some(idx), false) => (idx + ids.len() - 1) % ids.len(),
    };
    model.active_field = Some(ids[next]);
    fields_ensure_active_visible(model);
}

fn with_active_draft(model: &mut Model, edit: impl FnOnce(&mut FieldDraft)) {
    let Some(id) = model.active_field else {
        return;
    };
    let Some(h) = model.session.document().highlight(id) else {
        return;
    };
    if !h.editable {
        return;
    }
    let source = h.source_text.clone();
    let draft = model
        .drafts
        .entry(id)
        .or_insert_with(|| FieldDraft::new(&source));
    edit(draft);
}

fn selected_panel_field(model: &Model) -> Option<HighlightId> {
    model
        .session
        .document()
        .highlights()
        .get(model.panel_selected)
        .map(|h| h.id)
}

fn begin_save(model: &mut Model, pending: PendingSave) {
    if model.use_picker {
        let suggested = model.export_dir.join(&pending.file_name);
        model.prompt = Some(Prompt::new(
            PromptKind::SaveAs(pending),
            suggested.display().to_string(),
        ));
    } else {
        let target = SaveTarget::Download {
            dir: model.export_dir.clone(),
            file_name: pending.file_name.clone(),
        };
        model.effects.push(Effect::Save { pending, target });
    }
}

fn submit_prompt(model: &mut Model, prompt: Prompt) {
    let input = prompt.input.trim().to_string();
    match prompt.kind {
        PromptKind::TemplateName => {
            if let Err(err) = model.session.set_template_name(&prompt.input) {
                report(model, &err);
            }
        }
        PromptKind::TemplateDescription => {
            if let Err(err) = model.session.set_template_description(&prompt.input) {
                report(model, &err);
            }
        }
        PromptKind::OpenTextFile if !input.is_empty() => {
            model.effects.push(Effect::ReadTextFile(PathBuf::from(input)));
        }
        PromptKind::OpenTemplate if !input.is_empty() => {
            model.effects.push(Effect::ReadTemplate(PathBuf::from(input)));
        }
        PromptKind::SaveAs(pending) => {
            if input.is_empty() {
                model.session.complete_save(&pending, &SaveOutcome::Cancelled);
            } else {
                let target = SaveTarget::Path(PathBuf::from(input));
                model.effects.push(Effect::Save { pending, target });
            }
        }
        PromptKind::OpenTextFile | PromptKind::OpenTemplate => {}
    }
}

/// Refuse and explain when the current role and lock do not allow `op`.
fn guard(model: &mut Model, op: Operation) -> bool {
    if model.session.state().permits(op) {
        return true;
    }
    debug!(?op, "operation not available");
    model.show_toast(ToastLevel::Warning, format!("{op} is not available in this mode"));
    false
}

/// The field list is read-only while the template is locked; field tokens
/// in the field view stay clickable.
fn panel_unlocked(model: &mut Model) -> bool {
    if model.session.state().lock == Lock::Unlocked {
        return true;
    }
    model.focus = Focus::Document;
    model.show_toast(ToastLevel::Warning, "Field list is locked: Ctrl+E to edit");
    false
}

fn report(model: &mut Model, err: &SessionError) {
    let level = match err {
        SessionError::Selection(_) => ToastLevel::Info,
        SessionError::NotPermitted { .. }
        | SessionError::NoHighlights
        | SessionError::MissingTemplateName
        | SessionError::NoTemplateLoaded => ToastLevel::Warning,
        SessionError::Field(_) | SessionError::Template(_) => ToastLevel::Error,
    };
    let message = match err {
        SessionError::NotPermitted { op, .. } => format!("{op} is not available in this mode"),
        other => other.to_string(),
    };
    model.show_toast(level, message);
}

/// Ensure the editor cursor line is visible in the viewport.
fn editor_ensure_cursor_visible(model: &mut Model) {
    let cursor_line = model.editor.cursor().line;
    let visible_height = model.document_rows();
    if visible_height == 0 {
        model.editor_scroll_offset = cursor_line;
        return;
    }

    if cursor_line < model.editor_scroll_offset {
        model.editor_scroll_offset = cursor_line;
    } else if cursor_line >= model.editor_scroll_offset + visible_height {
        model.editor_scroll_offset = cursor_line + 1 - visible_height;
    }
}

/// Ensure the focused field's first row is visible in the field view.
fn fields_ensure_active_visible(model: &mut Model) {
    let Some(id) = model.active_field else {
        return;
    };
    let area = crate::ui::document_area(model.width, model.height);
    let rows = crate::ui::fields::layout(model, area.width as usize);
    let Some(row) = crate::ui::fields::row_of_field(&rows, id) else {
        return;
    };
    let visible_height = (area.height as usize).max(1);
    if row < model.fields_scroll_offset {
        model.fields_scroll_offset = row;
    } else if row >= model.fields_scroll_offset + visible_height {
        model.fields_scroll_offset = row + 1 - visible_height;
    }
}

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tempfile::tempdir;

use crate::document::HighlightId;
use crate::files::SaveTarget;
use crate::session::{EditorSession, Lock, Role, View};

use super::event_loop::ResizeDebouncer;
use super::{App, Effect, Focus, Message, Model, PromptKind, ToastLevel, update};

fn create_test_model(text: &str) -> Model {
    Model::new(EditorSession::with_text(text), (80, 24))
}

fn model_with_fields(text: &str, fields: &[(usize, usize)]) -> Model {
    let mut session = EditorSession::with_text(text);
    for (start, end) in fields {
        session.select_range(*start, *end).unwrap();
    }
    Model::new(session, (80, 24))
}

fn run(model: Model, msgs: impl IntoIterator<Item = Message>) -> Model {
    msgs.into_iter().fold(model, update)
}

fn press(model: Model, key: KeyEvent) -> Model {
    match App::handle_key(key, &model) {
        Some(msg) => update(model, msg),
        None => model,
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn ranges(model: &Model) -> Vec<(usize, usize)> {
    model
        .session
        .document()
        .highlights()
        .iter()
        .map(|h| (h.start, h.end))
        .collect()
}

fn field_ids(model: &Model) -> Vec<HighlightId> {
    model
        .session
        .document()
        .highlights()
        .iter()
        .map(|h| h.id)
        .collect()
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

fn template_json(name: &str, text: &str, fields: &[(usize, usize)]) -> String {
    let mut session = EditorSession::with_text(text);
    session.set_template_name(name).unwrap();
    for (start, end) in fields {
        session.select_range(*start, *end).unwrap();
    }
    let pending = session.prepare_template_save().unwrap();
    String::from_utf8(pending.bytes).unwrap()
}

// --- Editable view ---

#[test]
fn test_typing_before_field_shifts_it() {
    let model = model_with_fields("Dear NAME", &[(5, 9)]);
    let model = update(model, Message::EditorInsertChar('X'));
    assert_eq!(model.session.document().text(), "XDear NAME");
    assert_eq!(model.editor.text(), "XDear NAME");
    assert_eq!(ranges(&model), vec![(6, 10)]);
}

#[test]
fn test_typing_inside_field_removes_it() {
    let model = model_with_fields("Dear NAME", &[(5, 9)]);
    let model = run(
        model,
        [Message::EditorMoveTo(0, 6), Message::EditorInsertChar('x')],
    );
    assert_eq!(model.session.document().text(), "Dear NxAME");
    assert!(ranges(&model).is_empty());
    let (msg, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Info);
    assert!(msg.contains("Removed 1 field"));
}

#[test]
fn test_backspace_after_field_keeps_it() {
    let model = model_with_fields("Dear NAME!", &[(5, 9)]);
    let model = run(
        model,
        [Message::EditorMoveTo(0, 10), Message::EditorDeleteBack],
    );
    assert_eq!(model.session.document().text(), "Dear NAME");
    assert_eq!(ranges(&model), vec![(5, 9)]);
}

#[test]
fn test_shift_arrows_then_ctrl_k_marks_field() {
    let mut model = update(create_test_model("Dear NAME"), Message::EditorMoveTo(0, 5));
    for _ in 0..4 {
        model = press(model, KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT));
    }
    let model = press(model, ctrl('k'));

    let highlights = model.session.document().highlights();
    assert_eq!(highlights.len(), 1);
    assert_eq!(highlights[0].source_text, "NAME");
    assert!(!highlights[0].editable);
    assert_eq!(model.editor.selection(), None);
    assert_eq!(model.active_toast().unwrap().0, "Field added (1 total)");
}

#[test]
fn test_overlapping_selection_is_rejected_with_info_toast() {
    let model = model_with_fields("Dear NAME", &[(5, 9)]);
    let mut model = update(model, Message::EditorMoveTo(0, 3));
    for _ in 0..4 {
        model = update(model, Message::EditorSelect(crate::editor::Direction::Right));
    }
    let model = update(model, Message::MarkSelection);
    assert_eq!(ranges(&model), vec![(5, 9)]);
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Info);
}

#[test]
fn test_mark_without_selection_explains() {
    let model = update(create_test_model("Hello"), Message::MarkSelection);
    assert!(ranges(&model).is_empty());
    assert!(model.active_toast().unwrap().0.starts_with("Select text first"));
}

#[test]
fn test_ctrl_w_removes_field_at_cursor() {
    let model = model_with_fields("Dear NAME", &[(5, 9)]);
    let model = update(model, Message::EditorMoveTo(0, 6));
    let model = press(model, ctrl('w'));
    assert!(ranges(&model).is_empty());
    assert_eq!(model.session.document().text(), "Dear NAME");
}

#[test]
fn test_ctrl_w_between_touching_fields_removes_the_one_after_cursor() {
    let model = model_with_fields("NAMECITY", &[(0, 4), (4, 8)]);
    let model = update(model, Message::EditorMoveTo(0, 4));
    let model = press(model, ctrl('w'));
    assert_eq!(ranges(&model), vec![(0, 4)]);
    assert_eq!(model.active_toast().unwrap().0, "Removed field \"CITY\"");
}

#[test]
fn test_ctrl_w_just_after_field_still_removes_it() {
    let model = model_with_fields("Dear NAME!", &[(5, 9)]);
    let model = update(model, Message::EditorMoveTo(0, 9));
    let model = press(model, ctrl('w'));
    assert!(ranges(&model).is_empty());
}

#[test]
fn test_locked_author_cannot_type_through_editor() {
    let model = model_with_fields("Dear NAME", &[(5, 9)]);
    let model = run(model, [Message::ConvertToInputs, Message::EditorInsertChar('x')]);
    assert_eq!(model.session.document().text(), "Dear NAME");
    assert_eq!(model.editor.text(), "Dear NAME");
    let (msg, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Warning);
    assert_eq!(msg, "Typing is not available in this mode");
}

#[test]
fn test_paste_inserts_whole_text() {
    let model = model_with_fields("Dear NAME", &[(5, 9)]);
    let model = update(model, Message::Paste("Hi, ".to_string()));
    assert_eq!(model.session.document().text(), "Hi, Dear NAME");
    assert_eq!(ranges(&model), vec![(9, 13)]);
}

// --- Field view ---

#[test]
fn test_convert_to_inputs_locks_and_focuses_first_field() {
    let model = model_with_fields("Dear NAME and CITY", &[(5, 9), (14, 18)]);
    let ids = field_ids(&model);
    let model = press(model, ctrl('p'));
    assert_eq!(model.view(), View::Fields);
    assert_eq!(model.session.state().lock, Lock::Locked);
    assert_eq!(model.active_field, Some(ids[0]));
    assert!(model.session.document().highlights().iter().all(|h| h.editable));
}

#[test]
fn test_fill_and_commit_field_shifts_later_fields() {
    let model = model_with_fields("Dear NAME and CITY", &[(5, 9), (14, 18)]);
    let mut model = update(model, Message::ConvertToInputs);
    for _ in 0..4 {
        model = press(model, key(KeyCode::Backspace));
    }
    for c in "Bob".chars() {
        model = press(model, key(KeyCode::Char(c)));
    }
    assert_eq!(model.session.document().text(), "Dear NAME and CITY");

    let model = press(model, key(KeyCode::Enter));
    assert_eq!(model.session.document().text(), "Dear Bob and CITY");
    assert_eq!(ranges(&model), vec![(5, 8), (13, 17)]);
    assert!(model.drafts.is_empty());
}

#[test]
fn test_tab_away_commits_draft() {
    let model = model_with_fields("Dear NAME and CITY", &[(5, 9), (14, 18)]);
    let ids = field_ids(&model);
    let model = run(
        model,
        [
            Message::ConvertToInputs,
            Message::FieldInsertChar('S'),
        ],
    );
    let model = press(model, key(KeyCode::Tab));
    assert_eq!(model.session.document().text(), "Dear NAMES and CITY");
    assert_eq!(model.active_field, Some(ids[1]));
}

#[test]
fn test_esc_discards_draft() {
    let model = model_with_fields("Dear NAME", &[(5, 9)]);
    let model = run(
        model,
        [Message::ConvertToInputs, Message::FieldInsertChar('!')],
    );
    let id = model.active_field.unwrap();
    assert_eq!(model.draft_value(id).as_deref(), Some("NAME!"));

    let model = press(model, key(KeyCode::Esc));
    assert_eq!(model.draft_value(id).as_deref(), Some("NAME"));
    let model = update(model, Message::CommitField);
    assert_eq!(model.session.document().text(), "Dear NAME");
}

#[test]
fn test_clearing_input_and_committing_drops_field() {
    let model = model_with_fields("Dear NAME!", &[(5, 9)]);
    let mut model = update(model, Message::ConvertToInputs);
    for _ in 0..4 {
        model = update(model, Message::FieldDeleteBack);
    }
    let model = update(model, Message::CommitField);
    assert_eq!(model.session.document().text(), "Dear !");
    assert!(ranges(&model).is_empty());
    assert_eq!(model.active_field, None);
}

#[test]
fn test_activating_token_makes_it_editable() {
    let mut session = EditorSession::with_text("Dear NAME");
    session.select_range(5, 9).unwrap();
    let id = session.document().highlights()[0].id;
    session.set_role(Role::Filler);
    let model = Model::new(session, (80, 24));
    assert!(!model.session.document().highlights()[0].editable);

    let model = update(model, Message::FocusField(id));
    assert!(model.session.document().highlights()[0].editable);
    assert_eq!(model.active_field, Some(id));
}

#[test]
fn test_edit_template_returns_to_editable_view() {
    let model = model_with_fields("Dear NAME", &[(5, 9)]);
    let model = run(model, [Message::ConvertToInputs, Message::EditTemplate]);
    assert_eq!(model.view(), View::Editable);
    assert_eq!(model.session.state().lock, Lock::Unlocked);
    assert_eq!(model.active_field, None);
}

// --- Field list panel ---

#[test]
fn test_panel_remove_selected_field() {
    let model = model_with_fields("Dear NAME and CITY", &[(5, 9), (14, 18)]);
    let model = press(model, key(KeyCode::F(2)));
    assert_eq!(model.focus, Focus::Panel);
    let model = press(model, key(KeyCode::Down));
    let model = press(model, key(KeyCode::Char('d')));
    assert_eq!(ranges(&model), vec![(5, 9)]);
    assert_eq!(model.active_toast().unwrap().0, "Removed field \"CITY\"");
    assert_eq!(model.panel_selected, 0);
}

#[test]
fn test_panel_edit_marks_field_editable() {
    let model = model_with_fields("Dear NAME", &[(5, 9)]);
    let model = run(model, [Message::ToggleFocus, Message::PanelEditField]);
    assert!(model.session.document().highlights()[0].editable);
    assert_eq!(model.view(), View::Editable);
}

fn locked_author_model(text: &str, fields: &[(usize, usize)]) -> Model {
    let mut session = EditorSession::with_text("");
    session
        .load_template_json(&template_json("Form", text, fields))
        .unwrap();
    assert_eq!(session.state().lock, Lock::Locked);
    Model::new(session, (80, 24))
}

#[test]
fn test_locked_author_cannot_focus_panel_or_edit_from_it() {
    let model = locked_author_model("Dear NAME and CITY", &[(5, 9), (14, 18)]);
    let model = press(model, key(KeyCode::F(2)));
    assert_eq!(model.focus, Focus::Document);
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);

    let model = run(model, [Message::PanelSelect(0), Message::PanelEditField]);
    assert_eq!(model.focus, Focus::Document);
    assert!(model.session.document().highlights().iter().all(|h| !h.editable));
}

#[test]
fn test_locked_author_cannot_remove_field_from_panel() {
    let mut model = locked_author_model("Dear NAME", &[(5, 9)]);
    model.focus = Focus::Panel;
    let model = update(model, Message::PanelRemoveField);
    assert_eq!(ranges(&model), vec![(5, 9)]);
    assert_eq!(model.focus, Focus::Document);
}

#[test]
fn test_locked_author_can_still_activate_field_token() {
    let model = locked_author_model("Dear NAME", &[(5, 9)]);
    let id = field_ids(&model)[0];
    let model = update(model, Message::FocusField(id));
    assert!(model.session.document().highlights()[0].editable);
}

#[test]
fn test_filler_cannot_focus_panel() {
    let mut model = model_with_fields("Dear NAME", &[(5, 9)]);
    model.session.set_role(Role::Filler);
    let model = update(model, Message::ToggleFocus);
    assert_eq!(model.focus, Focus::Document);
}

// --- Session commands ---

#[test]
fn test_toggle_role_switches_to_field_view() {
    let model = update(create_test_model("Hello"), Message::ToggleRole);
    assert_eq!(model.role(), Role::Filler);
    assert_eq!(model.view(), View::Fields);
    assert_eq!(model.active_toast().unwrap().0, "Role: Filler");
}

#[test]
fn test_template_name_prompt_sets_name() {
    let mut model = press(create_test_model("Hello"), ctrl('n'));
    assert!(matches!(
        model.prompt.as_ref().map(|p| &p.kind),
        Some(PromptKind::TemplateName)
    ));
    for c in "Inv".chars() {
        model = press(model, key(KeyCode::Char(c)));
    }
    let model = press(model, key(KeyCode::Enter));
    assert!(model.prompt.is_none());
    assert_eq!(model.session.state().template_name, "Inv");
}

#[test]
fn test_template_name_prompt_refused_while_locked() {
    let model = model_with_fields("Dear NAME", &[(5, 9)]);
    let model = run(model, [Message::ConvertToInputs, Message::PromptTemplateName]);
    assert!(model.prompt.is_none());
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);
}

#[test]
fn test_save_without_name_warns() {
    let model = update(create_test_model("Hello"), Message::SaveTemplate);
    assert!(model.prompt.is_none());
    assert!(model.effects.is_empty());
    assert_eq!(
        model.active_toast(),
        Some(("Please enter a template name", ToastLevel::Warning))
    );
}

#[test]
fn test_save_template_through_prompt_locks_after_write() {
    let dir = tempdir().unwrap();
    let mut model = model_with_fields("Dear NAME", &[(5, 9)]).with_export_dir(dir.path().into());
    model.session.set_template_name("Invoice Form").unwrap();

    let model = update(model, Message::SaveTemplate);
    let expected = dir.path().join("template-invoice-form.json");
    let prompt = model.prompt.as_ref().unwrap();
    assert!(matches!(prompt.kind, PromptKind::SaveAs(_)));
    assert_eq!(prompt.input, expected.display().to_string());
    assert_eq!(model.session.state().lock, Lock::Unlocked);

    let mut model = update(model, Message::PromptSubmit);
    assert_eq!(model.effects.len(), 1);
    assert!(App::drain_effects(&mut model));

    assert!(expected.exists());
    assert_eq!(model.session.state().lock, Lock::Locked);
    assert_eq!(model.view(), View::Fields);
    assert!(model.active_toast().unwrap().0.starts_with("Template saved"));
}

#[test]
fn test_cancelled_save_changes_nothing() {
    let mut model = model_with_fields("Dear NAME", &[(5, 9)]);
    model.session.set_template_name("Letter").unwrap();
    let model = run(model, [Message::SaveTemplate, Message::PromptCancel]);
    assert!(model.prompt.is_none());
    assert!(model.effects.is_empty());
    assert_eq!(model.session.state().lock, Lock::Unlocked);
}

#[test]
fn test_save_snapshot_ignores_later_edits() {
    let mut model = model_with_fields("Dear NAME", &[(5, 9)]);
    model.session.set_template_name("Letter").unwrap();
    let model = run(
        model,
        [
            Message::SaveTemplate,
            Message::EditorInsertChar('Z'),
            Message::PromptSubmit,
        ],
    );
    assert_eq!(model.session.document().text(), "ZDear NAME");
    let Some(Effect::Save { pending, .. }) = model.effects.first() else {
        panic!("expected a queued save");
    };
    let saved = String::from_utf8(pending.bytes.clone()).unwrap();
    assert!(saved.contains("\"text\": \"Dear NAME\""));
}

#[test]
fn test_export_without_picker_downloads_into_export_dir() {
    let dir = tempdir().unwrap();
    let model = create_test_model("Hello")
        .with_export_dir(dir.path().into())
        .with_picker(false);
    let mut model = update(model, Message::Export);
    assert!(model.prompt.is_none());
    assert_eq!(
        model.effects.first().map(|effect| match effect {
            Effect::Save { target, .. } => target.clone(),
            other => panic!("unexpected effect {other:?}"),
        }),
        Some(SaveTarget::Download {
            dir: dir.path().into(),
            file_name: "edited-text.txt".to_string(),
        })
    );

    App::drain_effects(&mut model);
    let written = std::fs::read_to_string(dir.path().join("edited-text.txt")).unwrap();
    assert_eq!(written, "Hello");
    assert!(model.effects.is_empty());
}

#[test]
fn test_filler_export_requires_template() {
    let mut model = create_test_model("Hello");
    model.session.set_role(Role::Filler);
    let model = update(model, Message::Export);
    assert!(model.prompt.is_none());
    assert!(model.effects.is_empty());
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);
}

#[test]
fn test_filler_loads_template_and_focuses_first_input() {
    let json = template_json("Letter", "Dear NAME from CITY", &[(5, 9), (15, 19)]);
    let mut model = create_test_model("scratch");
    model.session.set_role(Role::Filler);

    let model = update(model, Message::TemplateRead(json));
    assert_eq!(model.session.document().text(), "Dear NAME from CITY");
    assert_eq!(model.session.state().template_name, "Letter");
    assert!(model.session.document().highlights().iter().all(|h| h.editable));
    assert_eq!(model.active_field, Some(field_ids(&model)[0]));
    assert_eq!(model.active_toast().unwrap().0, "Loaded template: Letter");
}

#[test]
fn test_invalid_template_leaves_session_alone() {
    let model = model_with_fields("Dear NAME", &[(5, 9)]);
    let model = update(model, Message::TemplateRead("{not json".to_string()));
    assert_eq!(model.session.document().text(), "Dear NAME");
    assert_eq!(ranges(&model), vec![(5, 9)]);
    assert_eq!(
        model.active_toast(),
        Some(("Invalid JSON file", ToastLevel::Error))
    );
}

#[test]
fn test_text_file_replaces_text_and_fields() {
    let model = model_with_fields("Dear NAME", &[(5, 9)]);
    let model = update(model, Message::TextFileRead("Hello\nWorld".to_string()));
    assert_eq!(model.session.document().text(), "Hello\nWorld");
    assert_eq!(model.editor.text(), "Hello\nWorld");
    assert!(ranges(&model).is_empty());
}

#[test]
fn test_open_template_prompt_queues_read() {
    let model = run(
        create_test_model("Hello"),
        [
            Message::PromptOpenTemplate,
            Message::PromptInput('t'),
            Message::PromptInput('.'),
            Message::PromptInput('j'),
            Message::PromptInput('s'),
            Message::PromptInput('o'),
            Message::PromptInput('n'),
            Message::PromptSubmit,
        ],
    );
    assert_eq!(
        model.effects,
        vec![Effect::ReadTemplate(std::path::PathBuf::from("t.json"))]
    );
}

#[test]
fn test_io_failure_shows_error_toast() {
    let model = update(
        create_test_model("Hello"),
        Message::IoFailed("Please select a .txt file".to_string()),
    );
    assert_eq!(
        model.active_toast(),
        Some(("Please select a .txt file", ToastLevel::Error))
    );
}

#[test]
fn test_initial_json_file_loads_as_template() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("letter.json");
    std::fs::write(&path, template_json("Letter", "Dear NAME", &[(5, 9)])).unwrap();

    let app = App::new()
        .with_role(Role::Filler)
        .with_initial_file(Some(path));
    let mut model = app.initial_model((80, 24));
    assert_eq!(model.effects.len(), 1);
    App::drain_effects(&mut model);

    assert_eq!(model.role(), Role::Filler);
    assert_eq!(model.session.state().template_name, "Letter");
    assert_eq!(ranges(&model), vec![(5, 9)]);
}

#[test]
fn test_initial_text_file_is_imported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "Plain notes").unwrap();

    let mut model = App::new().with_initial_file(Some(path)).initial_model((80, 24));
    App::drain_effects(&mut model);
    assert_eq!(model.session.document().text(), "Plain notes");
}

// --- Key and mouse mapping ---

#[test]
fn test_any_key_closes_help() {
    let mut model = create_test_model("Hello");
    model.help_visible = true;
    assert_eq!(
        App::handle_key(key(KeyCode::Char('x')), &model),
        Some(Message::HideHelp)
    );
}

#[test]
fn test_global_keys() {
    let model = create_test_model("Hello");
    assert_eq!(App::handle_key(ctrl('q'), &model), Some(Message::Quit));
    assert_eq!(
        App::handle_key(key(KeyCode::F(1)), &model),
        Some(Message::ToggleHelp)
    );
    assert_eq!(App::handle_key(ctrl('r'), &model), Some(Message::ToggleRole));
}

#[test]
fn test_prompt_captures_typing() {
    let model = update(create_test_model("Hello"), Message::PromptTemplateName);
    assert_eq!(
        App::handle_key(key(KeyCode::Char('q')), &model),
        Some(Message::PromptInput('q'))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Esc), &model),
        Some(Message::PromptCancel)
    );
}

#[test]
fn test_field_view_keys_depend_on_focused_field() {
    let model = model_with_fields("Dear NAME", &[(5, 9)]);
    let model = update(model, Message::ConvertToInputs);
    assert_eq!(
        App::handle_key(key(KeyCode::Enter), &model),
        Some(Message::CommitField)
    );
    assert_eq!(
        App::handle_key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT), &model),
        Some(Message::PrevField)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('a')), &model),
        Some(Message::FieldInsertChar('a'))
    );
}

#[test]
fn test_mouse_drag_marks_field() {
    let model = create_test_model("Dear NAME");
    let area = crate::ui::document_area(model.width, model.height);
    let text_x = area.x + crate::ui::editor_gutter_width(1);

    let down = mouse(MouseEventKind::Down(MouseButton::Left), text_x + 5, area.y);
    let msg = App::handle_mouse(down, &model).unwrap();
    assert_eq!(msg, Message::EditorMoveTo(0, 5));
    let model = update(model, msg);

    let drag = mouse(MouseEventKind::Drag(MouseButton::Left), text_x + 9, area.y);
    let msg = App::handle_mouse(drag, &model).unwrap();
    assert_eq!(msg, Message::EditorSelectTo(0, 9));
    let model = update(model, msg);

    let up = mouse(MouseEventKind::Up(MouseButton::Left), text_x + 9, area.y);
    let msg = App::handle_mouse(up, &model).unwrap();
    assert_eq!(msg, Message::MarkSelection);
    let model = update(model, msg);
    assert_eq!(ranges(&model), vec![(5, 9)]);
}

#[test]
fn test_plain_click_does_not_mark() {
    let model = create_test_model("Dear NAME");
    let area = crate::ui::document_area(model.width, model.height);
    let up = mouse(MouseEventKind::Up(MouseButton::Left), area.x + 4, area.y);
    assert_eq!(App::handle_mouse(up, &model), None);
}

#[test]
fn test_click_on_field_in_field_view_focuses_it() {
    let model = model_with_fields("Dear NAME and CITY", &[(5, 9), (14, 18)]);
    let ids = field_ids(&model);
    let model = update(model, Message::ConvertToInputs);
    let area = crate::ui::document_area(model.width, model.height);

    let click = mouse(MouseEventKind::Down(MouseButton::Left), area.x + 15, area.y);
    assert_eq!(
        App::handle_mouse(click, &model),
        Some(Message::FocusField(ids[1]))
    );
    let click = mouse(MouseEventKind::Down(MouseButton::Left), area.x + 1, area.y);
    assert_eq!(App::handle_mouse(click, &model), None);
}

#[test]
fn test_click_in_panel_selects_field() {
    let model = model_with_fields("Dear NAME and CITY", &[(5, 9), (14, 18)]);
    let panel = crate::ui::panel_area(model.width, model.height);
    // Role, template status, blank, "Fields (2)", then the list
    let click = mouse(MouseEventKind::Down(MouseButton::Left), panel.x + 2, panel.y + 5);
    let msg = App::handle_mouse(click, &model).unwrap();
    assert_eq!(msg, Message::PanelSelect(1));
    let model = update(model, msg);
    assert_eq!(model.focus, Focus::Panel);
    assert_eq!(model.panel_selected, 1);
}

// --- Loop plumbing ---

#[test]
fn test_toast_lifecycle() {
    let mut model = create_test_model("Hello");
    model.show_toast(ToastLevel::Warning, "save failed");
    let (msg, level) = model.active_toast().expect("toast should be set");
    assert_eq!(msg, "save failed");
    assert_eq!(level, ToastLevel::Warning);
    assert!(!model.expire_toast(Instant::now()));
    assert!(model.expire_toast(Instant::now() + Duration::from_secs(5)));
    assert!(model.active_toast().is_none());
}

#[test]
fn test_resize_updates_dimensions() {
    let model = update(create_test_model("Hello"), Message::Resize(120, 40));
    assert_eq!(model.width, 120);
    assert_eq!(model.height, 40);
    assert_eq!(model.document_rows(), 36);
}

#[test]
fn test_scroll_is_clamped_to_document() {
    let text = (1..=50).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
    let model = update(create_test_model(&text), Message::ScrollDown(100));
    assert_eq!(model.editor_scroll_offset, 49);
    let model = update(model, Message::ScrollUp(10));
    assert_eq!(model.editor_scroll_offset, 39);
}

#[test]
fn test_cursor_movement_scrolls_editor() {
    let text = (1..=50).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
    let model = update(create_test_model(&text), Message::EditorMoveToEnd);
    let rows = model.document_rows();
    assert_eq!(model.editor_scroll_offset, 50 - rows);
}

#[test]
fn test_drain_effects_reports_idle_queue() {
    let mut model = create_test_model("Hello");
    assert!(!App::drain_effects(&mut model));
}

#[test]
fn test_resize_debouncer_waits_for_quiet_period() {
    let mut debouncer = ResizeDebouncer::new(100);
    debouncer.queue(120, 40, 0);

    assert!(debouncer.take_ready(50).is_none());
    assert_eq!(debouncer.take_ready(100), Some((120, 40)));
}

#[test]
fn test_resize_debouncer_uses_latest_size() {
    let mut debouncer = ResizeDebouncer::new(100);
    debouncer.queue(120, 40, 0);
    debouncer.queue(140, 50, 20);

    assert!(debouncer.take_ready(80).is_none());
    assert_eq!(debouncer.take_ready(120), Some((140, 50)));
}

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::{App, Focus, Message, Model};
use crate::editor::Direction;
use crate::session::View;
use crate::ui;

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Paste(text) if model.prompt.is_some() || model.focus == Focus::Document => {
                Some(Message::Paste(text.clone()))
            }
            Event::Resize(w, h) => {
                tracing::trace!(width = w, height = h, "resize queued");
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible || model.prompt.is_some() {
            return None;
        }

        match mouse.kind {
            MouseEventKind::ScrollDown => return Some(Message::ScrollDown(3)),
            MouseEventKind::ScrollUp => return Some(Message::ScrollUp(3)),
            _ => {}
        }

        let doc_area = ui::document_area(model.width, model.height);
        let in_doc = ui::point_in_rect(mouse.column, mouse.row, doc_area);
        let panel = ui::panel_area(model.width, model.height);

        if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left))
            && ui::point_in_rect(mouse.column, mouse.row, panel)
        {
            return ui::panel_field_at_row(model, mouse.row).map(Message::PanelSelect);
        }

        match model.view() {
            View::Editable => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) if in_doc => {
                    let (line, col) = editor_position(model, doc_area, mouse.column, mouse.row);
                    Some(Message::EditorMoveTo(line, col))
                }
                MouseEventKind::Drag(MouseButton::Left) => {
                    let (line, col) = editor_position(model, doc_area, mouse.column, mouse.row);
                    Some(Message::EditorSelectTo(line, col))
                }
                MouseEventKind::Up(MouseButton::Left) if model.editor.selection().is_some() => {
                    Some(Message::MarkSelection)
                }
                _ => None,
            },
            View::Fields => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) if in_doc => {
                    let rows = ui::fields::layout(model, doc_area.width as usize);
                    let row = model.fields_scroll_offset + (mouse.row - doc_area.y) as usize;
                    let col = (mouse.column - doc_area.x) as usize;
                    ui::fields::field_at(&rows, row, col).map(Message::FocusField)
                }
                _ => None,
            },
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return Some(Message::HideHelp);
        }

        if model.prompt.is_some() {
            return match key.code {
                KeyCode::Enter => Some(Message::PromptSubmit),
                KeyCode::Esc => Some(Message::PromptCancel),
                KeyCode::Backspace => Some(Message::PromptBackspace),
                KeyCode::Char(c) if !has_command_modifier(key) => Some(Message::PromptInput(c)),
                _ => None,
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        // Commands available everywhere
        if ctrl && let KeyCode::Char(c) = key.code {
            let msg = match c.to_ascii_lowercase() {
                'q' | 'c' => Some(Message::Quit),
                'r' => Some(Message::ToggleRole),
                'n' => Some(Message::PromptTemplateName),
                'd' => Some(Message::PromptTemplateDescription),
                'o' => Some(Message::PromptOpenTextFile),
                't' => Some(Message::PromptOpenTemplate),
                's' => Some(Message::SaveTemplate),
                'p' => Some(Message::ConvertToInputs),
                'e' => Some(Message::EditTemplate),
                'x' => Some(Message::Export),
                'k' if model.view() == View::Editable => Some(Message::MarkSelection),
                'w' if model.view() == View::Editable => Some(Message::RemoveFieldAtCursor),
                'l' => Some(Message::Redraw),
                _ => None,
            };
            if msg.is_some() {
                return msg;
            }
        }
        match key.code {
            KeyCode::F(1) => return Some(Message::ToggleHelp),
            KeyCode::F(2) => return Some(Message::ToggleFocus),
            KeyCode::PageDown => return Some(Message::ScrollDown(model.document_rows().max(1))),
            KeyCode::PageUp => return Some(Message::ScrollUp(model.document_rows().max(1))),
            _ => {}
        }

        if model.focus == Focus::Panel {
            return match key.code {
                KeyCode::Char('j') | KeyCode::Down => Some(Message::PanelDown),
                KeyCode::Char('k') | KeyCode::Up => Some(Message::PanelUp),
                KeyCode::Char('e') | KeyCode::Enter => Some(Message::PanelEditField),
                KeyCode::Char('d') | KeyCode::Delete => Some(Message::PanelRemoveField),
                KeyCode::Esc | KeyCode::Tab => Some(Message::ToggleFocus),
                _ => None,
            };
        }

        match model.view() {
            View::Editable => Self::handle_editor_key(key, ctrl, shift),
            View::Fields => Self::handle_field_key(key, model),
        }
    }

    fn handle_editor_key(key: KeyEvent, ctrl: bool, shift: bool) -> Option<Message> {
        match key.code {
            KeyCode::Left if ctrl => Some(Message::EditorMoveWordLeft),
            KeyCode::Right if ctrl => Some(Message::EditorMoveWordRight),
            KeyCode::Home if ctrl => Some(Message::EditorMoveToStart),
            KeyCode::End if ctrl => Some(Message::EditorMoveToEnd),
            KeyCode::Up if shift => Some(Message::EditorSelect(Direction::Up)),
            KeyCode::Down if shift => Some(Message::EditorSelect(Direction::Down)),
            KeyCode::Left if shift => Some(Message::EditorSelect(Direction::Left)),
            KeyCode::Right if shift => Some(Message::EditorSelect(Direction::Right)),
            KeyCode::Home if shift => Some(Message::EditorSelectLineEdge(false)),
            KeyCode::End if shift => Some(Message::EditorSelectLineEdge(true)),
            KeyCode::Up => Some(Message::EditorMoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::EditorMoveCursor(Direction::Down)),
            KeyCode::Left => Some(Message::EditorMoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::EditorMoveCursor(Direction::Right)),
            KeyCode::Home => Some(Message::EditorMoveHome),
            KeyCode::End => Some(Message::EditorMoveEnd),
            KeyCode::Enter => Some(Message::EditorSplitLine),
            KeyCode::Backspace => Some(Message::EditorDeleteBack),
            KeyCode::Delete => Some(Message::EditorDeleteForward),
            KeyCode::Tab => Some(Message::EditorInsertChar('\t')),
            KeyCode::Char(c) if !has_command_modifier(key) => Some(Message::EditorInsertChar(c)),
            _ => None,
        }
    }

    fn handle_field_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let active_editable = model
            .active_field
            .and_then(|id| model.session.document().highlight(id))
            .is_some_and(|h| h.editable);
        match key.code {
            KeyCode::Tab | KeyCode::Down => Some(Message::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(Message::PrevField),
            KeyCode::Enter if active_editable => Some(Message::CommitField),
            KeyCode::Enter => Some(Message::ActivateField),
            KeyCode::Esc => Some(Message::DiscardDraft),
            _ if !active_editable => None,
            KeyCode::Backspace => Some(Message::FieldDeleteBack),
            KeyCode::Delete => Some(Message::FieldDeleteForward),
            KeyCode::Left => Some(Message::FieldMoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::FieldMoveCursor(Direction::Right)),
            KeyCode::Home => Some(Message::FieldMoveEdge(false)),
            KeyCode::End => Some(Message::FieldMoveEdge(true)),
            KeyCode::Char(c) if !has_command_modifier(key) => Some(Message::FieldInsertChar(c)),
            _ => None,
        }
    }

    pub(super) fn view(model: &Model, frame: &mut Frame) {
        ui::render(model, frame);
    }
}

fn has_command_modifier(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT)
}

/// Buffer line and column under a screen cell of the editable view, clamped
/// into the pane.
fn editor_position(model: &Model, doc_area: Rect, column: u16, row: u16) -> (usize, usize) {
    let max_row = doc_area.y + doc_area.height.saturating_sub(1);
    let row = row.clamp(doc_area.y, max_row);
    let line = model.editor_scroll_offset + (row - doc_area.y) as usize;

    let gutter = ui::editor_gutter_width(model.editor.line_count());
    let text_width = doc_area.width.saturating_sub(gutter) as usize;
    let hscroll = ui::editor_horizontal_offset(model.editor.cursor().col, text_width);
    let col = column.saturating_sub(doc_area.x + gutter) as usize;
    (line, hscroll + col)
}

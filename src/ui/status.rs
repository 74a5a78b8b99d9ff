use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::session::{Lock, Role, View};

/// The row above the status bar: an open prompt, else a toast, else a hint.
pub fn render_message_bar(model: &Model, frame: &mut Frame, area: Rect) {
    if model.prompt.is_some() {
        render_prompt_bar(model, frame, area);
    } else if model.active_toast().is_some() {
        render_toast_bar(model, frame, area);
    } else {
        let hint = Paragraph::new(key_hint(model)).style(model.theme.dim);
        frame.render_widget(hint, area);
    }
}

fn key_hint(model: &Model) -> &'static str {
    let state = model.session.state();
    match (state.role, state.lock, model.view()) {
        (Role::Author, _, View::Editable) => {
            " Shift+arrows/drag: select  Ctrl+K: mark field  Ctrl+P: preview  Ctrl+S: save"
        }
        (Role::Author, Lock::Locked, View::Fields) => {
            " Tab: next field  Enter: commit  Ctrl+E: edit template  Ctrl+X: export"
        }
        (Role::Author, Lock::Unlocked, View::Fields) | (Role::Filler, _, _) => {
            " Tab: next field  Enter: commit  Esc: revert  Ctrl+X: export"
        }
    }
}

pub fn render_prompt_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(prompt) = model.prompt.as_ref() else {
        return;
    };
    let line = Line::from(vec![
        Span::raw(format!("{}: {}", prompt.title(), prompt.input)),
        Span::styled(" ", model.theme.cursor),
        Span::raw("  Enter: ok  Esc: cancel"),
    ]);
    let bar = Paragraph::new(line).style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(bar, area);
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let state = model.session.state();
    let template = state
        .status_line()
        .unwrap_or_else(|| "No template".to_string());
    let fields = model.session.document().highlights().len();
    let position = match model.view() {
        View::Editable => {
            let c = model.editor.cursor();
            format!("  Ln {}, Col {}", c.line + 1, c.col + 1)
        }
        View::Fields => String::new(),
    };

    let status = format!(
        " {}  {}  [{} field{}]{}  F1:help",
        state.role,
        template,
        fields,
        if fields == 1 { "" } else { "s" },
        position
    );

    let status_bar = Paragraph::new(status).style(model.theme.status());

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{Focus, Model};
use crate::session::{Lock, Role, View};

use super::fields::{self, RunKind};
use super::{
    FOOTER_ROWS, editor_gutter_width, editor_horizontal_offset, overlays, split_main_columns,
    status,
};

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let main = Rect {
        height: area.height.saturating_sub(FOOTER_ROWS),
        ..area
    };
    let message_area = Rect {
        y: area.y + area.height.saturating_sub(2),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    let chunks = split_main_columns(main);
    render_panel(model, frame, chunks[0]);
    render_document(model, frame, chunks[1]);

    status::render_message_bar(model, frame, message_area);
    status::render_status_bar(model, frame, status_area);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn pane_block(model: &Model, title: &str, focused: bool) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(if focused {
            model.theme.border_focused
        } else {
            Style::default()
        })
}

/// Lines shown above the Author's field list.
pub(crate) fn panel_header(model: &Model) -> Vec<Line<'static>> {
    let theme = &model.theme;
    let state = model.session.state();
    let mut lines = vec![Line::from(vec![
        Span::styled("Role: ", theme.dim),
        Span::raw(state.role.to_string()),
    ])];
    match state.status_line() {
        Some(status) => lines.push(Line::raw(status)),
        None => lines.push(Line::styled("No template", theme.dim)),
    }
    if !state.template_description.is_empty() {
        lines.push(Line::styled(state.template_description.clone(), theme.dim));
    }
    lines.push(Line::raw(""));

    if state.role == Role::Author {
        let count = model.session.document().highlights().len();
        lines.push(Line::styled(format!("Fields ({count})"), theme.heading));
    }
    lines
}

/// First field-list row shown when `selected` must fit in `rows`.
pub(crate) const fn panel_list_offset(selected: usize, rows: usize) -> usize {
    if rows == 0 {
        return selected;
    }
    (selected + 1).saturating_sub(rows)
}

fn render_panel(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = &model.theme;
    let state = model.session.state();
    let block = pane_block(model, &state.role.to_string(), model.focus == Focus::Panel);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = panel_header(model);

    if state.role == Role::Filler {
        lines.push(Line::raw("Fill in the highlighted inputs,"));
        lines.push(Line::raw("then export with Ctrl+X."));
        if !state.has_template() {
            lines.push(Line::raw(""));
            lines.push(Line::styled("Load a template to begin editing.", theme.dim));
        }
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }

    let highlights = model.session.document().highlights();
    if highlights.is_empty() {
        let hint = match model.view() {
            View::Editable => "Select text and press Ctrl+K",
            View::Fields => "No fields",
        };
        lines.push(Line::styled(hint, theme.dim));
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }

    let header_rows = lines.len();
    let list_rows = (inner.height as usize).saturating_sub(header_rows + 1);
    let offset = panel_list_offset(model.panel_selected, list_rows);
    let panel_focused = model.focus == Focus::Panel;
    for (idx, h) in highlights.iter().enumerate().skip(offset).take(list_rows) {
        let selected = panel_focused && idx == model.panel_selected;
        let marker = if selected { ">" } else { " " };
        let label = format!("{marker}{:>2}. \"{}\"", idx + 1, h.source_text.replace('\n', " "));
        let mut spans = vec![Span::styled(
            label,
            if selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            },
        )];
        if h.editable {
            spans.push(Span::styled(" [input]", theme.dim));
        }
        lines.push(Line::from(spans));
    }

    let hint = if state.lock == Lock::Locked {
        "Locked: Ctrl+E to edit"
    } else if panel_focused {
        "e: edit  d: remove  F2: back"
    } else {
        "F2: field list"
    };
    let hint_row = Rect {
        y: inner.y + inner.height.saturating_sub(1),
        height: inner.height.min(1),
        ..inner
    };
    frame.render_widget(Paragraph::new(lines), inner);
    frame.render_widget(Paragraph::new(Line::styled(hint, theme.dim)), hint_row);
}

fn render_document(model: &Model, frame: &mut Frame, area: Rect) {
    let state = model.session.state();
    let title = match (model.view(), state.role) {
        (View::Editable, _) => "Template Editor",
        (View::Fields, Role::Author) => "Template Preview",
        (View::Fields, Role::Filler) => "Fill Form",
    };
    let block = pane_block(model, title, model.focus == Focus::Document);
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    match model.view() {
        View::Editable => render_editable_view(model, frame, inner),
        View::Fields => render_field_view(model, frame, inner),
    }
}

fn render_editable_view(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = &model.theme;
    let buf = &model.editor;
    let document = model.session.document();

    // Line number gutter width
    let total_lines = buf.line_count();
    let gutter_width = editor_gutter_width(total_lines);
    let text_width = area.width.saturating_sub(gutter_width) as usize;

    let visible_height = area.height as usize;
    let start = model.editor_scroll_offset;
    let end = (start + visible_height).min(total_lines);
    let cursor = buf.cursor();
    let hscroll = editor_horizontal_offset(cursor.col, text_width);
    let selection = buf.selection();
    let show_cursor = model.focus == Focus::Document && model.prompt.is_none();

    let mut content: Vec<Line> = Vec::new();
    for line_idx in start..end {
        let line_text = buf.line_at(line_idx).unwrap_or_default();
        let line_start = buf.line_start(line_idx);
        let line_num = format!(
            "{:>width$} ",
            line_idx + 1,
            width = (gutter_width - 1) as usize
        );
        let mut spans = vec![Span::styled(line_num, theme.gutter)];

        let chars: Vec<char> = line_text.chars().collect();
        let cursor_here = show_cursor && line_idx == cursor.line;
        let mut run = String::new();
        let mut run_style = Style::default();
        let last_col = (hscroll + text_width).min(chars.len());
        for (col, ch) in chars.iter().enumerate().take(last_col).skip(hscroll) {
            let offset = line_start + col;
            let style = if cursor_here && col == cursor.col {
                theme.cursor
            } else if selection.as_ref().is_some_and(|r| r.contains(&offset)) {
                theme.selection
            } else if document.highlight_covering(offset).is_some() {
                theme.field
            } else {
                Style::default()
            };
            if style != run_style && !run.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut run), run_style));
            }
            run_style = style;
            run.push(if *ch == '\t' { ' ' } else { *ch });
        }
        if !run.is_empty() {
            spans.push(Span::styled(run, run_style));
        }
        if cursor_here && cursor.col >= chars.len() {
            spans.push(Span::styled(" ", theme.cursor));
        }

        content.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(content), area);
}

fn render_field_view(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = &model.theme;
    let rows = fields::layout(model, area.width as usize);
    let content: Vec<Line> = rows
        .into_iter()
        .skip(model.fields_scroll_offset)
        .take(area.height as usize)
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|run| {
                        let style = match run.kind {
                            RunKind::Plain => Style::default(),
                            RunKind::Token { focused: false, .. } => theme.field,
                            RunKind::Token { focused: true, .. } => theme.field_focused,
                            RunKind::Input { focused: false, .. } => theme.input,
                            RunKind::Input { focused: true, .. } => theme.input_focused,
                            RunKind::Cursor { .. } => theme.cursor,
                        };
                        Span::styled(run.text, style)
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(content), area);
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}

/// Field-list index drawn at screen `row`, if any.
pub fn panel_field_at_row(model: &Model, row: u16) -> Option<usize> {
    if model.role() != Role::Author {
        return None;
    }
    let inner = super::panel_area(model.width, model.height);
    let header = panel_header(model).len();
    let list_top = inner.y as usize + header;
    let row = row as usize;
    if row < list_top {
        return None;
    }
    let list_rows = (inner.height as usize).saturating_sub(header + 1);
    let rel = row - list_top;
    if rel >= list_rows {
        return None;
    }
    let idx = panel_list_offset(model.panel_selected, list_rows) + rel;
    (idx < model.session.document().highlights().len()).then_some(idx)
}

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;
use crate::session::Role;

/// Key bindings and usage notes for `role`.
pub fn help_lines(role: Role) -> Vec<(&'static str, Vec<&'static str>)> {
    match role {
        Role::Author => vec![
            (
                "Authoring",
                vec![
                    "  Ctrl+N              Set template name",
                    "  Ctrl+D              Set description",
                    "  Ctrl+O              Load a .txt file",
                    "  Type                Edit the text directly",
                    "  Shift+arrows, drag  Select text",
                    "  Ctrl+K, mouse up    Mark selection as a field",
                    "  Ctrl+W              Remove field at cursor",
                    "  F2                  Focus field list (e: edit, d: remove)",
                ],
            ),
            (
                "Template",
                vec![
                    "  Ctrl+P              Convert highlights to inputs",
                    "  Ctrl+S              Save template (locks it)",
                    "  Ctrl+E              Edit a locked template",
                    "  Ctrl+T              Load a .json template",
                    "  Ctrl+X              Export text",
                ],
            ),
            (
                "Notes",
                vec![
                    "  Typing inside a field removes that field",
                    "  Templates can be loaded by fillers to fill out forms",
                ],
            ),
        ],
        Role::Filler => vec![
            (
                "Filling",
                vec![
                    "  Ctrl+T              Load a .json template",
                    "  Tab / Shift+Tab     Move between inputs",
                    "  Type                Fill in the focused input",
                    "  Enter               Commit the input",
                    "  Esc                 Revert the input",
                    "  Ctrl+X              Save the completed form",
                ],
            ),
            (
                "Notes",
                vec!["  Only the designated fields can be edited; the rest is protected"],
            ),
        ],
    }
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = model.theme.heading;

    let mut all_lines: Vec<Line> = Vec::new();
    for (title, entries) in help_lines(model.role()) {
        all_lines.push(Line::styled(title, section_style));
        all_lines.extend(entries.into_iter().map(Line::raw));
        all_lines.push(Line::raw(""));
    }

    // Other
    all_lines.push(Line::styled("Other", section_style));
    all_lines.push(Line::raw("  Ctrl+R              Switch role"));
    all_lines.push(Line::raw("  PageUp/PageDown     Scroll"));
    all_lines.push(Line::raw("  Ctrl+Q              Quit"));
    all_lines.push(Line::raw("  F1                  Toggle help"));
    all_lines.push(Line::raw(""));

    // Config
    all_lines.push(Line::styled("Config", section_style));
    all_lines.push(Line::raw(format!("  Global: {global_cfg}")));
    all_lines.push(Line::raw(format!("  Local override: {local_cfg}")));

    let block = Block::default()
        .title(format!("Help: {}", model.role()))
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    let inner = block.inner(popup);
    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Reserve 1 row at bottom for footer hint
    let content_height = inner.height.saturating_sub(1);
    let content_area = Rect::new(inner.x, inner.y, inner.width, content_height);
    frame.render_widget(Paragraph::new(all_lines), content_area);

    let footer_area = Rect::new(inner.x, inner.y + content_height, inner.width, 1);
    let footer = Line::styled("any key closes", model.theme.dim);
    frame.render_widget(Paragraph::new(footer), footer_area);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}

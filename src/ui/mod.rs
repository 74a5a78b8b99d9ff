//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`render`]: Frame layout, the control panel, and both document views
//! - [`fields`]: Soft-wrapped layout of the field view, shared with hit testing
//! - [`style`]: Theming and colors

pub mod fields;
pub mod style;

mod overlays;
mod render;
mod status;

pub use render::{line_number_width, panel_field_at_row, render};

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const PANEL_WIDTH_PERCENT: u16 = 30;
pub const DOCUMENT_WIDTH_PERCENT: u16 = 70;
/// Message row plus status bar.
pub const FOOTER_ROWS: u16 = 2;

pub fn split_main_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(PANEL_WIDTH_PERCENT),
            Constraint::Percentage(DOCUMENT_WIDTH_PERCENT),
        ])
        .split(area)
}

/// Area above the footer rows.
pub const fn main_area(width: u16, height: u16) -> Rect {
    Rect {
        x: 0,
        y: 0,
        width,
        height: height.saturating_sub(FOOTER_ROWS),
    }
}

/// The document pane, borders included.
pub fn document_outer_area(width: u16, height: u16) -> Rect {
    split_main_columns(main_area(width, height))[1]
}

/// The document pane inside its borders.
pub fn document_area(width: u16, height: u16) -> Rect {
    let outer = document_outer_area(width, height);
    Rect {
        x: outer.x.saturating_add(1),
        y: outer.y.saturating_add(1),
        width: outer.width.saturating_sub(2),
        height: outer.height.saturating_sub(2),
    }
}

/// The control panel inside its borders.
pub fn panel_area(width: u16, height: u16) -> Rect {
    let outer = split_main_columns(main_area(width, height))[0];
    Rect {
        x: outer.x.saturating_add(1),
        y: outer.y.saturating_add(1),
        width: outer.width.saturating_sub(2),
        height: outer.height.saturating_sub(2),
    }
}

/// Columns left of the text in the editable view: line number plus a space.
pub const fn editor_gutter_width(total_lines: usize) -> u16 {
    line_number_width(total_lines) + 1
}

/// First visible column of the editable view, chosen so the cursor stays on
/// screen.
pub const fn editor_horizontal_offset(cursor_col: usize, text_width: usize) -> usize {
    if text_width == 0 {
        return cursor_col;
    }
    (cursor_col + 1).saturating_sub(text_width)
}

pub const fn point_in_rect(col: u16, row: u16, rect: Rect) -> bool {
    col >= rect.x
        && col < rect.x + rect.width
        && row >= rect.y
        && row < rect.y + rect.height
}

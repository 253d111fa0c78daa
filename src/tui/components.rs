//! Common UI components module
//!
//! Layout helpers, text fitting, and the half-block frame widget.

use crate::preview::{Frame, PreviewBudget};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Widget,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Rows used by the status block under the preview
pub const STATUS_HEIGHT: u16 = 5;

/// Three-panel layout: header, preview, status
pub fn three_panel_layout(area: Rect) -> [Rect; 3] {
    Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(STATUS_HEIGHT),
    ])
    .areas(area)
}

/// Preview area inside the bordered body panel
pub fn preview_area(area: Rect) -> Rect {
    let [_, body, _] = three_panel_layout(area);
    Rect {
        x: body.x.saturating_add(1),
        y: body.y.saturating_add(1),
        width: body.width.saturating_sub(2),
        height: body.height.saturating_sub(2),
    }
}

/// Pixel budget for a preview area; each cell holds two pixel rows
pub fn budget_for(area: Rect) -> PreviewBudget {
    PreviewBudget::new(u32::from(area.width), u32::from(area.height) * 2)
}

/// 按显示宽度截断文本，避免 UTF-8 边界问题
pub fn truncate_value(value: &str, max_width: usize) -> String {
    if value.width() <= max_width {
        return value.to_string();
    }

    let target_width = max_width.saturating_sub(3);
    let mut current_width = 0;
    let mut output = String::new();

    for ch in value.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > target_width {
            break;
        }
        output.push(ch);
        current_width += ch_width;
    }

    output.push_str("...");
    output
}

/// Draws an RGB frame with upper half blocks, centered in its area
pub struct FrameView<'a> {
    frame: &'a Frame,
}

impl<'a> FrameView<'a> {
    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }
}

impl Widget for FrameView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cols = (self.frame.width as u16).min(area.width);
        let rows = (self.frame.height.div_ceil(2) as u16).min(area.height);
        let left = area.x + (area.width - cols) / 2;
        let top = area.y + (area.height - rows) / 2;

        for row in 0..rows {
            for col in 0..cols {
                let x = u32::from(col);
                let y = u32::from(row) * 2;
                let Some(upper) = self.frame.pixel(x, y) else {
                    continue;
                };
                let mut style = Style::new().fg(rgb(upper));
                if let Some(lower) = self.frame.pixel(x, y + 1) {
                    style = style.bg(rgb(lower));
                }
                if let Some(cell) = buf.cell_mut((left + col, top + row)) {
                    cell.set_symbol("▀").set_style(style);
                }
            }
        }
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

//! UI渲染模块
//!
//! 标题栏显示当前文件，中间是预览面板，底部是状态区。

use crate::playback::{PlaybackPhase, PlaybackStatus};
use crate::preview::Preview;
use crate::session::{NavigationSession, SessionState, format_millis, relative_display};
use crate::tui::components::{FrameView, three_panel_layout, truncate_value};
use crate::tui::theme::theme;
use ratatui::{
    DefaultTerminal, Frame,
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Wrap},
};
use std::path::Path;

/// 设置全局背景
fn set_background(area: Rect, buf: &mut Buffer) {
    let style = Style::new().bg(theme().bg);
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut(ratatui::layout::Position { x, y }) {
                cell.set_style(style);
            }
        }
    }
}

/// 渲染整个查看器
pub fn render(
    terminal: &mut DefaultTerminal,
    session: &NavigationSession,
    source_root: &Path,
) -> std::io::Result<()> {
    terminal.draw(|frame| draw(frame, frame.area(), session, source_root))?;
    Ok(())
}

fn draw(frame: &mut Frame, area: Rect, session: &NavigationSession, source_root: &Path) {
    set_background(area, frame.buffer_mut());

    let [header, body, footer] = three_panel_layout(area);
    draw_header(frame, header, session, source_root);
    draw_preview(frame, body, session);
    draw_status(frame, footer, session);
}

fn draw_header(frame: &mut Frame, area: Rect, session: &NavigationSession, source_root: &Path) {
    let title = Line::from(" Photo Triage ").centered().style(theme().title());
    let block = Block::bordered()
        .title(title)
        .border_type(BorderType::Rounded)
        .border_style(theme().border())
        .style(theme().normal());

    let text = match (session.state(), session.current()) {
        (SessionState::AwaitingInput(index), Some(entry)) => format!(
            "File: {} ({}/{}) [{}]",
            relative_display(entry.path(), source_root),
            index + 1,
            session.len(),
            entry.kind().label()
        ),
        (SessionState::Completing, _) => "Done".to_string(),
        _ => String::new(),
    };
    let width = area.width.saturating_sub(4) as usize;
    let line = Paragraph::new(truncate_value(&text, width))
        .style(theme().normal())
        .block(block);
    frame.render_widget(line, area);
}

fn draw_preview(frame: &mut Frame, area: Rect, session: &NavigationSession) {
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(theme().border())
        .style(theme().normal());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(image) = session.frame() {
        frame.render_widget(FrameView::new(image), inner);
        return;
    }

    let lines = match session.preview() {
        Preview::Placeholder { title, detail } => vec![
            Line::from(title.as_str()).style(theme().title()),
            Line::from(""),
            Line::from(detail.as_str()).style(theme().hint()),
        ],
        Preview::Empty => match (session.state(), session.notice()) {
            (SessionState::AwaitingInput(_), _) | (_, None) => Vec::new(),
            (_, Some(notice)) => vec![Line::from(notice).style(theme().accent())],
        },
        Preview::Frame(_) => Vec::new(),
    };

    // 文本块垂直居中
    let top = inner.height.saturating_sub(lines.len() as u16) / 2;
    let text_area = Rect {
        y: inner.y + top,
        height: inner.height - top,
        ..inner
    };
    let placeholder = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(placeholder, text_area);
}

fn draw_status(frame: &mut Frame, area: Rect, session: &NavigationSession) {
    let mut lines = Vec::new();

    if let Some(notice) = session.notice() {
        let style = if notice.starts_with("Failed") || notice.starts_with("Unknown") {
            theme().error()
        } else {
            theme().success()
        };
        lines.push(Line::from(notice).style(style));
    }

    if let Some(status) = session.playback() {
        lines.push(playback_line(&status, session.backend_name()));
    }

    if matches!(session.state(), SessionState::AwaitingInput(_)) {
        let stats = session.stats();
        lines.push(
            Line::from(format!(
                "{}: {}  Skipped: {}  Failed: {}",
                session.transfer_mode().verb(),
                stats.transferred,
                stats.skipped,
                stats.failed
            ))
            .style(theme().hint()),
        );
        lines.push(Line::from(session.instructions()).style(theme().hint()));
    } else if session.state() == SessionState::Terminated {
        lines.push(Line::from("Press any key to close").style(theme().hint()));
    }

    let status = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(status, area);
}

/// "▶ 0:12 / 1:00 (clock)"
fn playback_line(status: &PlaybackStatus, backend: &str) -> Line<'static> {
    let icon = match status.phase {
        PlaybackPhase::Playing => "▶",
        PlaybackPhase::Paused => "⏸",
        PlaybackPhase::Loading => "…",
        PlaybackPhase::Idle | PlaybackPhase::Stopped => "■",
    };
    let duration = status
        .duration_ms
        .map(format_millis)
        .unwrap_or_else(|| "--:--".to_string());
    let mut spans = vec![
        Span::styled(format!("{} ", icon), theme().accent()),
        Span::styled(
            format!("{} / {}", format_millis(status.position_ms), duration),
            theme().normal(),
        ),
        Span::styled(format!(" ({})", backend), theme().hint()),
    ];
    if status.exhausted {
        spans.push(Span::styled(" end of video", theme().warning()));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_line_formats_unknown_duration() {
        let status = PlaybackStatus {
            phase: PlaybackPhase::Paused,
            position_ms: 12_400,
            duration_ms: None,
            paused: true,
            exhausted: false,
        };
        let line = playback_line(&status, "clock");
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "⏸ 0:12 / --:-- (clock)");
    }

    #[test]
    fn test_playback_line_marks_exhausted() {
        let status = PlaybackStatus {
            phase: PlaybackPhase::Stopped,
            position_ms: 60_000,
            duration_ms: Some(60_000),
            paused: false,
            exhausted: true,
        };
        let text: String = playback_line(&status, "ffmpeg-frames")
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(text, "■ 1:00 / 1:00 (ffmpeg-frames) end of video");
    }
}

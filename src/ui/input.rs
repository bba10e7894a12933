use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use super::helpers::truncate_string;
use super::{spinner, theme};
use crate::app::State;
use crate::app::actions::input_target;
use crate::config::UI;

/// Single-line input aimed at the selected node.
pub fn render_input(frame: &mut Frame, state: &State, area: Rect) {
    let target = input_target(state);
    let (title, border) = match &target {
        Some(target) => (format!(" Prompt → {} ", target), theme::BORDER_FOCUS),
        None => (" Select a node with Tab ".to_string(), theme::BORDER),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(theme::BG_INPUT))
        .title(Span::styled(title, Style::default().fg(theme::TEXT_SECONDARY)));
    let inner = block.inner(area);
    render_line_editor(frame, state, block, area, inner, target.is_some());
}

/// Paragraph + cursor for the input buffer, scrolled so the cursor stays visible.
pub fn render_line_editor(frame: &mut Frame, state: &State, block: Block, area: Rect, inner: Rect, focused: bool) {
    let cursor_width = state.input[..state.input_cursor].width();
    let visible = usize::from(inner.width.max(1));
    let scroll = cursor_width.saturating_sub(visible - 1);

    let paragraph = Paragraph::new(state.input.as_str())
        .style(Style::default().fg(theme::TEXT))
        .block(block)
        .scroll((0, scroll as u16));
    frame.render_widget(paragraph, area);

    if focused && inner.width > 0 && inner.height > 0 {
        frame.set_cursor_position((inner.x + (cursor_width - scroll) as u16, inner.y));
    }
}

pub fn render_status_bar(frame: &mut Frame, state: &State, area: Rect) {
    let base_style = Style::default().bg(theme::BG_BASE).fg(theme::TEXT_MUTED);
    let in_flight = state.session.in_flight_count();

    let mut spans = vec![Span::styled(" ", base_style)];

    if in_flight > 0 {
        spans.push(Span::styled(
            format!(" {} {} {} ", spinner::spinner(state.spinner_frame), UI.status.generating, in_flight),
            Style::default().fg(theme::BG_BASE).bg(theme::SUCCESS).bold(),
        ));
    } else {
        spans.push(Span::styled(
            format!(" {} ", UI.status.ready),
            Style::default().fg(theme::BG_BASE).bg(theme::TEXT_MUTED).bold(),
        ));
    }
    spans.push(Span::styled(" ", base_style));

    if state.offline {
        spans.push(Span::styled(
            format!(" {} ", UI.status.offline),
            Style::default().fg(theme::BG_BASE).bg(theme::WARNING).bold(),
        ));
    } else {
        spans.push(Span::styled(
            format!(" {} ", state.backend),
            Style::default().fg(theme::BG_BASE).bg(theme::ACCENT_DIM).bold(),
        ));
    }
    spans.push(Span::styled(" ", base_style));

    if let Some(user) = state.session.user() {
        spans.push(Span::styled(format!(" {} ", user.name), Style::default().fg(theme::TEXT).bg(theme::BG_ELEVATED)));
        spans.push(Span::styled(" ", base_style));
    }

    if let Some(error) = &state.last_error {
        spans.push(Span::styled(format!(" ✗ {} ", error), Style::default().fg(theme::BG_BASE).bg(theme::ERROR).bold()));
        spans.push(Span::styled(" ", base_style));
    }

    // Right side: key hints, dropped when there is no room
    let left_width: usize = spans.iter().map(|s| s.content.width()).sum();
    let room = usize::from(area.width).saturating_sub(left_width + 1);
    let right_info = if room > 12 { format!("{} ", truncate_string(&UI.hints, room)) } else { String::new() };
    let padding = usize::from(area.width).saturating_sub(left_width + right_info.width());

    spans.push(Span::styled(" ".repeat(padding), base_style));
    spans.push(Span::styled(right_info, base_style));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use bf_core::Session;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::app::actions::{Action, apply_action};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn status_bar_shows_user_and_error() {
        let mut state = State::new(Session::default(), "http", false);
        for c in "Ada".chars() {
            apply_action(&mut state, Action::InputChar(c));
        }
        apply_action(&mut state, Action::Submit);
        state.last_error = Some("Prompt is empty".into());

        let mut terminal = Terminal::new(TestBackend::new(100, 1)).unwrap();
        terminal.draw(|frame| render_status_bar(frame, &state, frame.area())).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("READY"));
        assert!(text.contains("http"));
        assert!(text.contains("Ada"));
        assert!(text.contains("Prompt is empty"));
    }
}

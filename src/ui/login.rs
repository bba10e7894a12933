use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

use super::helpers::centered_rect;
use super::input::render_line_editor;
use super::theme;
use crate::app::State;
use crate::config::UI;

const CARD_WIDTH: u16 = 52;
const CARD_HEIGHT: u16 = 9;

pub fn render_login(frame: &mut Frame, state: &State, area: Rect) {
    let card = centered_rect(CARD_WIDTH, CARD_HEIGHT, area);
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ACCENT))
        .style(Style::default().bg(theme::BG_SURFACE))
        .title(Span::styled(format!(" {} ", UI.login.title), Style::default().fg(theme::TEXT).bold()));
    let inner = outer.inner(card);
    frame.render_widget(outer, card);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Prompt
            Constraint::Length(3), // Name input
            Constraint::Min(1),    // Error
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(UI.login.prompt.as_str()).style(Style::default().fg(theme::TEXT_SECONDARY)), rows[0]);

    let field = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_FOCUS))
        .style(Style::default().bg(theme::BG_INPUT));
    let field_inner = field.inner(rows[1]);
    render_line_editor(frame, state, field, rows[1], field_inner, true);

    if let Some(error) = &state.last_error {
        frame.render_widget(Paragraph::new(error.as_str()).style(Style::default().fg(theme::ERROR)), rows[2]);
    }
}

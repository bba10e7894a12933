//! Graph canvas: edges drawn in world coordinates, node boxes laid over them.
//!
//! World `y` grows downward; the canvas grows upward, so edges are drawn with `-y`.

use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        Block, BorderType, Borders, Clear, Paragraph,
        canvas::{Canvas, Line as CanvasLine},
    },
};

use bf_core::{DisplayPayload, ExchangeBody, NodeView, Position};

use super::helpers::{clamp_lines, truncate_string};
use super::{spinner, theme};
use crate::app::State;
use crate::config::UI;
use crate::constants::{EXCHANGE_HEIGHT, NODE_WIDTH, PLACEHOLDER_HEIGHT, UNITS_PER_COL, UNITS_PER_ROW};

/// Lines of response text shown inside an exchange box
const RESPONSE_LINES: usize = 4;

fn node_height(node: &NodeView) -> u16 {
    match node.display {
        DisplayPayload::Placeholder => PLACEHOLDER_HEIGHT,
        DisplayPayload::Exchange { .. } => EXCHANGE_HEIGHT,
    }
}

/// Terminal cell of a world position, relative to `area`, with `viewport` at the centre.
pub fn to_cell(position: Position, viewport: Position, area: Rect) -> (i32, i32) {
    let col = (position.x - viewport.x) / UNITS_PER_COL + f64::from(area.width) / 2.0;
    let row = (position.y - viewport.y) / UNITS_PER_ROW + f64::from(area.height) / 2.0;
    (area.x as i32 + col.floor() as i32, area.y as i32 + row.floor() as i32)
}

/// Screen rect of a node box clipped to `area`; `None` when entirely off screen.
/// The node's position is the top-centre of its box.
pub fn node_rect(node: &NodeView, viewport: Position, area: Rect) -> Option<Rect> {
    let (col, row) = to_cell(node.position, viewport, area);
    let left = col - i32::from(NODE_WIDTH) / 2;
    let right = left + i32::from(NODE_WIDTH);
    let bottom = row + i32::from(node_height(node));

    let x0 = left.max(i32::from(area.x));
    let y0 = row.max(i32::from(area.y));
    let x1 = right.min(i32::from(area.right()));
    let y1 = bottom.min(i32::from(area.bottom()));
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some(Rect::new(x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16))
}

pub fn render_graph(frame: &mut Frame, state: &State, area: Rect) {
    let projection = state.projection();
    let viewport = state.viewport;
    let half_w = f64::from(area.width) * UNITS_PER_COL / 2.0;
    let half_h = f64::from(area.height) * UNITS_PER_ROW / 2.0;

    let canvas = Canvas::default()
        .background_color(theme::BG_BASE)
        .marker(Marker::Braille)
        .x_bounds([viewport.x - half_w, viewport.x + half_w])
        .y_bounds([-(viewport.y + half_h), -(viewport.y - half_h)])
        .paint(|ctx| {
            for edge in &projection.edges {
                let (Some(source), Some(target)) =
                    (projection.node(edge.source.as_str()), projection.node(edge.target.as_str()))
                else {
                    continue;
                };
                let source_bottom = source.position.y + f64::from(node_height(source)) * UNITS_PER_ROW;
                ctx.draw(&CanvasLine::new(
                    source.position.x,
                    -source_bottom,
                    target.position.x,
                    -target.position.y,
                    theme::EDGE,
                ));
            }
        });
    frame.render_widget(canvas, area);

    for node in &projection.nodes {
        if let Some(rect) = node_rect(node, viewport, area) {
            let selected = state.selected.as_ref() == Some(&node.id);
            render_node(frame, state, node, selected, rect);
        }
    }
}

fn render_node(frame: &mut Frame, state: &State, node: &NodeView, selected: bool, rect: Rect) {
    let inner_width = usize::from(NODE_WIDTH.saturating_sub(4));

    let (title, lines, failed) = match &node.display {
        DisplayPayload::Placeholder => {
            let hint = if selected && !state.input.is_empty() { state.input.as_str() } else { UI.placeholder.hint.as_str() };
            let lines = vec![Line::from(Span::styled(
                truncate_string(hint, inner_width),
                Style::default().fg(theme::TEXT_MUTED).italic(),
            ))];
            (UI.placeholder.title.clone(), lines, false)
        }
        DisplayPayload::Exchange { prompt, body, branch_count, can_branch } => {
            let mut lines = vec![Line::from(Span::styled(
                UI.exchange.response_title.clone(),
                Style::default().fg(theme::ASSISTANT).bold(),
            ))];
            let failed = matches!(body, ExchangeBody::Error { .. });
            match body {
                ExchangeBody::Loading => lines.push(Line::from(Span::styled(
                    format!("{} {}", spinner::spinner(state.spinner_frame), UI.exchange.loading),
                    Style::default().fg(theme::WARNING),
                ))),
                ExchangeBody::Response { text } => {
                    for line in clamp_lines(text, inner_width, RESPONSE_LINES) {
                        lines.push(Line::from(Span::styled(line, Style::default().fg(theme::TEXT))));
                    }
                }
                ExchangeBody::Error { message } => {
                    for line in clamp_lines(message, inner_width, RESPONSE_LINES) {
                        lines.push(Line::from(Span::styled(line, Style::default().fg(theme::ERROR))));
                    }
                }
            }
            while lines.len() < RESPONSE_LINES + 1 {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(
                format!("{}: {}", UI.exchange.branch_count, branch_count),
                Style::default().fg(theme::TEXT_SECONDARY),
            )));
            if *can_branch && selected {
                lines.push(Line::from(Span::styled(
                    truncate_string(&UI.exchange.branch_hint, inner_width),
                    Style::default().fg(theme::ACCENT_DIM).italic(),
                )));
            }
            (truncate_string(prompt, inner_width), lines, failed)
        }
    };

    let border = if selected {
        theme::BORDER_FOCUS
    } else if failed {
        theme::ERROR
    } else {
        theme::BORDER
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(theme::BG_SURFACE))
        .title(Span::styled(format!(" {} ", title), Style::default().fg(theme::USER).bold()));

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

#[cfg(test)]
mod tests {
    use bf_core::TurnKind;

    use super::*;

    fn node(x: f64, y: f64) -> NodeView {
        NodeView {
            id: "t0".into(),
            kind: TurnKind::Exchange,
            position: Position::new(x, y),
            display: DisplayPayload::Exchange {
                prompt: "hi".into(),
                body: ExchangeBody::Loading,
                branch_count: 0,
                can_branch: false,
            },
        }
    }

    #[test]
    fn viewport_centre_maps_to_area_centre() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(to_cell(Position::new(10.0, 20.0), Position::new(10.0, 20.0), area), (50, 20));
        assert_eq!(
            to_cell(Position::new(10.0 + UNITS_PER_COL * 4.0, 20.0), Position::new(10.0, 20.0), area),
            (54, 20)
        );
    }

    #[test]
    fn node_rect_is_centred_on_position() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = node_rect(&node(0.0, 0.0), Position::default(), area).unwrap();
        assert_eq!(rect, Rect::new(50 - NODE_WIDTH / 2, 20, NODE_WIDTH, EXCHANGE_HEIGHT));
    }

    #[test]
    fn node_rect_clips_and_culls() {
        let area = Rect::new(0, 0, 40, 20);
        // Half a box width off the left edge.
        let x = -20.0 * UNITS_PER_COL;
        let rect = node_rect(&node(x, 0.0), Position::default(), area).unwrap();
        assert_eq!(rect.x, 0);
        assert_eq!(rect.width, NODE_WIDTH / 2);
        assert!(node_rect(&node(10_000.0, 0.0), Position::default(), area).is_none());
    }

    #[test]
    fn sibling_boxes_do_not_overlap() {
        let area = Rect::new(0, 0, 200, 40);
        let layout = bf_core::config::ENGINE.layout;
        let a = node_rect(&node(0.0, 0.0), Position::default(), area).unwrap();
        let b = node_rect(&node(layout.branch_spacing / 2.0, 0.0), Position::default(), area).unwrap();
        assert!(a.right() <= b.x);
    }
}

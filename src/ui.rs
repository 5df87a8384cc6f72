use std::f64::consts::PI;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use reflex::{Mode, SessionState};
use unicode_width::UnicodeWidthStr;

use crate::{key_for_target, App};

const HORIZONTAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(7),
                Constraint::Length(1),
            ])
            .split(area);

        render_header(self, chunks[0], buf, bold_style);

        let ring_area = chunks[1];
        Block::default()
            .borders(Borders::ALL)
            .border_style(dim_style)
            .render(ring_area, buf);
        render_ring(self, ring_area, buf);
        render_center(self, ring_area, buf, bold_style);

        let help = match self.controller.state() {
            SessionState::Countdown | SessionState::Active => {
                "press the lit target's key · (esc)abort"
            }
            _ => "(enter)start · (tab)mode · (del)reset best · (esc)quit",
        };
        Paragraph::new(Span::styled(help, dim_style.add_modifier(Modifier::ITALIC)))
            .centered()
            .render(chunks[2], buf);
    }
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer, bold_style: Style) {
    let bests = Mode::ALL
        .iter()
        .map(|m| format!("{m} best {}", app.best(*m)))
        .join("  ");

    let line = Line::from(vec![
        Span::styled("reflex", bold_style.fg(Color::Magenta)),
        Span::raw("  mode "),
        Span::styled(app.mode.to_string(), bold_style),
        Span::raw("  "),
        Span::styled(bests, Style::default().add_modifier(Modifier::DIM)),
    ]);
    Paragraph::new(line).render(area, buf);
}

/// Lays targets out on an ellipse inside `area`, first target at 12 o'clock
fn ring_positions(area: Rect, count: usize) -> Vec<(u16, u16)> {
    let cx = area.x as f64 + area.width as f64 / 2.0;
    let cy = area.y as f64 + area.height as f64 / 2.0;
    let rx = (area.width as f64 / 2.0 - 4.0).max(1.0);
    let ry = (area.height as f64 / 2.0 - 1.5).max(1.0);

    (0..count)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / count as f64 - PI / 2.0;
            let x = (cx + rx * angle.cos()).round() as u16;
            let y = (cy + ry * angle.sin()).round() as u16;
            (x.saturating_sub(1), y)
        })
        .collect()
}

fn render_ring(app: &App, area: Rect, buf: &mut Buffer) {
    let armed = app.controller.armed_target();
    let armed_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Green)
        .add_modifier(Modifier::BOLD);
    let idle_style = Style::default().add_modifier(Modifier::DIM);

    for (target, (x, y)) in ring_positions(area, app.controller.target_count())
        .into_iter()
        .enumerate()
    {
        if !area.contains((x, y).into()) {
            continue;
        }
        let style = if armed == Some(target) {
            armed_style
        } else {
            idle_style
        };
        buf.set_string(x, y, format!("[{}]", key_for_target(target)), style);
    }
}

fn render_center(app: &App, area: Rect, buf: &mut Buffer, bold_style: Style) {
    let session = app.controller.session();
    let lines: Vec<(String, Style)> = match app.controller.state() {
        SessionState::Countdown => vec![(
            session
                .countdown_remaining
                .map_or(String::new(), |n| n.to_string()),
            bold_style.fg(Color::Yellow),
        )],
        SessionState::Active => vec![
            (format!("score {}", app.controller.score_tracker()), bold_style),
            (
                format!("time {}", session.elapsed_secs),
                Style::default().fg(Color::Cyan),
            ),
        ],
        SessionState::Ended | SessionState::Idle => match app.last_result {
            Some(result) => {
                let headline = if result.is_new_record {
                    ("NEW PERSONAL BEST!".to_string(), bold_style.fg(Color::Green))
                } else {
                    ("TIME'S UP".to_string(), bold_style.fg(Color::Red))
                };
                vec![
                    headline,
                    (format!("score {}", result.final_score), bold_style),
                    (
                        format!("{} best {}", result.mode, app.best(result.mode)),
                        Style::default().add_modifier(Modifier::DIM),
                    ),
                ]
            }
            None => vec![(
                "press enter to start".to_string(),
                Style::default().add_modifier(Modifier::ITALIC),
            )],
        },
    };

    let top = (area.y + area.height / 2).saturating_sub(lines.len() as u16 / 2);
    for (row, (text, style)) in lines.into_iter().enumerate() {
        let width = text.width() as u16;
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = top + row as u16;
        if y < area.bottom() {
            buf.set_string(x, y, text, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_positions_start_at_top_and_stay_inside() {
        let area = Rect::new(0, 0, 60, 20);
        let positions = ring_positions(area, 12);

        assert_eq!(positions.len(), 12);
        let (_, top_y) = positions[0];
        assert!(positions.iter().all(|&(_, y)| y >= top_y));
        assert!(positions
            .iter()
            .all(|&(x, y)| x < area.right() && y < area.bottom()));
    }

    #[test]
    fn ring_positions_are_distinct() {
        let positions = ring_positions(Rect::new(0, 0, 80, 24), 12);
        assert_eq!(positions.iter().unique().count(), 12);
    }
}

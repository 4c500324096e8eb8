use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

/// Which set of key hints the bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hints {
    RoomList,
    RoomCard,
    Form,
    Prompt,
}

pub struct StatusBar {
    pub error_message: Option<String>,
    pub loading: bool,
    pub hints: Hints,
    pub room_count: usize,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            error_message: None,
            loading: true,
            hints: Hints::RoomList,
            room_count: 0,
        }
    }

    fn hint_spans(&self) -> Vec<Span<'static>> {
        let keys: &[(&'static str, &'static str)] = match self.hints {
            Hints::RoomList => &[
                ("\u{2191}\u{2193}", "Navigate"),
                ("Enter", "Open room"),
                ("r", "Refresh"),
                ("e", "Export"),
                ("?", "Help"),
                ("q", "Quit"),
            ],
            Hints::RoomCard => &[
                ("p", "Approve"),
                ("b", "Book"),
                ("w", "Review"),
                ("Esc", "Back"),
                ("?", "Help"),
            ],
            Hints::Form => &[("Tab", "Next field"), ("Enter", "Submit"), ("Esc", "Close")],
            Hints::Prompt => &[("y", "Sign"), ("n", "Reject")],
        };

        let mut spans = vec![Span::raw(" ")];
        for (key, action) in keys {
            spans.push(Span::styled(*key, Style::default().fg(THEME.text_accent)));
            spans.push(Span::styled(
                format!(":{action}  "),
                Style::default().fg(THEME.text_muted),
            ));
        }
        spans
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let bg = Block::default().style(THEME.header_style());
        frame.render_widget(bg, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(24)])
            .split(area);

        // --- Left side ---
        let left_content = if let Some(ref err) = self.error_message {
            Line::from(vec![
                Span::styled(
                    " ! ",
                    Style::default()
                        .fg(THEME.error)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(err.as_str(), Style::default().fg(THEME.warning)),
            ])
        } else {
            Line::from(self.hint_spans())
        };

        let left = Paragraph::new(left_content).style(THEME.header_style());
        frame.render_widget(left, chunks[0]);

        // --- Right side ---
        let right_content = if self.loading {
            Line::from(Span::styled(
                "Loading... ",
                Style::default().fg(THEME.text_accent),
            ))
        } else {
            Line::from(vec![
                Span::styled("\u{25cf} ", Style::default().fg(THEME.success)),
                Span::styled(
                    format!("{} rooms ", self.room_count),
                    THEME.muted_style(),
                ),
            ])
        };

        let right = Paragraph::new(right_content)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(right, chunks[1]);
    }
}

use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::centered_rect;
use crate::theme::THEME;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("\u{2191}/k", "Move up"),
            ("\u{2193}/j", "Move down"),
            ("Enter", "Open room card"),
            ("Esc", "Go back / Close"),
        ],
    ),
    (
        "Room card",
        &[
            ("p", "Approve the booking payment"),
            ("b", "Book this room's category"),
            ("w", "Write a review"),
        ],
    ),
    (
        "Owner",
        &[("a", "Add a room"), ("v", "Set room availability")],
    ),
    (
        "Forms",
        &[
            ("Tab", "Next field"),
            ("Space", "Toggle checkbox"),
            ("Ctrl+U", "Clear field"),
            ("Enter", "Submit"),
        ],
    ),
    (
        "Signing",
        &[("y", "Sign and send"), ("n", "Reject the request")],
    ),
    (
        "Other",
        &[
            ("r", "Refresh contract state"),
            ("e", "Export rooms to CSV"),
            ("?", "Toggle this help"),
            ("q", "Quit"),
        ],
    ),
];

pub struct HelpOverlay {
    pub visible: bool,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Returns true if it consumed the event
    pub fn handle_key(&mut self, _key: KeyEvent) -> bool {
        if self.visible {
            self.visible = false;
            true
        } else {
            false
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let popup_area = centered_rect(area, 60, area.height * 80 / 100);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style())
            .style(Style::default().bg(THEME.surface));

        let mut help_text: Vec<Line> = Vec::new();
        for (i, (section, keys)) in SECTIONS.iter().enumerate() {
            if i > 0 {
                help_text.push(Line::from(""));
            }
            help_text.push(Line::from(Span::styled(
                *section,
                Style::default()
                    .fg(THEME.text_accent)
                    .add_modifier(Modifier::BOLD),
            )));
            for (key, action) in keys.iter() {
                help_text.push(Line::from(vec![
                    Span::styled(
                        format!("  {key:<9}"),
                        Style::default().fg(THEME.text_accent),
                    ),
                    Span::styled(*action, Style::default().fg(THEME.text)),
                ]));
            }
        }

        let paragraph = Paragraph::new(help_text)
            .block(block)
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
    }
}

use alloy::primitives::Address;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::room_list::is_owner;
use crate::theme::THEME;
use crate::utils;

pub struct Header {
    pub chain_id: Option<u64>,
    pub account: Option<Address>,
    pub owner: Option<Address>,
    pub view_title: String,
}

impl Header {
    pub fn new() -> Self {
        Self {
            chain_id: None,
            account: None,
            owner: None,
            view_title: "Rooms".to_string(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let header_block = Block::default().style(THEME.header_style());
        frame.render_widget(header_block, area);

        // Left: title, center: current view, right: account and network
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(12),
                Constraint::Min(0),
                Constraint::Length(40),
            ])
            .split(area);

        let title = Paragraph::new(Span::styled(
            " hotel-tui",
            Style::default()
                .fg(THEME.text_accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(THEME.header_style());
        frame.render_widget(title, chunks[0]);

        let view = Paragraph::new(Span::styled(
            self.view_title.as_str(),
            THEME.accent_style().add_modifier(Modifier::BOLD),
        ))
        .style(THEME.header_style());
        frame.render_widget(view, chunks[1]);

        let mut right: Vec<Span> = Vec::new();
        if is_owner(self.account, self.owner) {
            right.push(Span::styled(
                "OWNER ",
                Style::default()
                    .fg(THEME.warning)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        match self.account {
            Some(account) => right.push(Span::styled(
                utils::truncate_address(&account),
                THEME.address_style(),
            )),
            None => right.push(Span::styled("read-only", THEME.muted_style())),
        }
        right.push(Span::styled(" | ", THEME.muted_style()));
        right.push(match self.chain_id {
            Some(id) => Span::styled(format!("chain {id} "), THEME.accent_style()),
            None => Span::styled("connecting ", THEME.muted_style()),
        });

        let network_paragraph = Paragraph::new(Line::from(right))
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(network_paragraph, chunks[2]);
    }
}

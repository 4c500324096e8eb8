use alloy::primitives::Address;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::types::Room;
use crate::events::{AppEvent, View};
use crate::forms::FormKind;
use crate::theme::THEME;
use crate::utils;

/// Owner-only actions render iff the connected account is the contract owner.
/// Both must be known; addresses compare independent of checksum casing.
pub fn is_owner(account: Option<Address>, owner: Option<Address>) -> bool {
    match (account, owner) {
        (Some(account), Some(owner)) => account == owner,
        _ => false,
    }
}

pub struct RoomList {
    pub rooms: Vec<Room>,
    pub account: Option<Address>,
    pub owner: Option<Address>,
    pub loading: bool,
    table_state: TableState,
    scroll_state: ScrollbarState,
}

impl RoomList {
    pub fn new() -> Self {
        Self {
            rooms: Vec::new(),
            account: None,
            owner: None,
            loading: true,
            table_state: TableState::default(),
            scroll_state: ScrollbarState::default(),
        }
    }

    pub fn set_rooms(&mut self, rooms: Vec<Room>) {
        self.rooms = rooms;
        self.loading = false;
        let selected = match self.table_state.selected() {
            _ if self.rooms.is_empty() => None,
            Some(i) => Some(i.min(self.rooms.len() - 1)),
            None => Some(0),
        };
        self.table_state.select(selected);
    }

    pub fn owner_controls(&self) -> bool {
        is_owner(self.account, self.owner)
    }

    pub fn selected_room(&self) -> Option<&Room> {
        self.table_state.selected().and_then(|i| self.rooms.get(i))
    }

    fn select_next(&mut self) {
        let len = self.rooms.len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = if current + 1 >= len { current } else { current + 1 };
        self.table_state.select(Some(next));
        self.scroll_state = self.scroll_state.position(next);
    }

    fn select_prev(&mut self) {
        if self.rooms.is_empty() {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let prev = current.saturating_sub(1);
        self.table_state.select(Some(prev));
        self.scroll_state = self.scroll_state.position(prev);
    }
}

fn build_rows(rooms: &[Room]) -> Vec<Row<'static>> {
    rooms
        .iter()
        .map(|room| {
            let (status, status_style) = if room.is_available {
                ("Available", THEME.availability_style(true))
            } else {
                ("Unavailable", THEME.availability_style(false))
            };
            let rating = room
                .average_rating()
                .map(|r| format!("{r:.1}"))
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(room.id.to_string()).style(THEME.accent_style()),
                Cell::from(room.category.to_string()),
                Cell::from(room.price_per_night.to_string()).style(THEME.token_style()),
                Cell::from(status).style(status_style),
                Cell::from(room.reviews.len().to_string()),
                Cell::from(rating).style(THEME.star_style()),
            ])
        })
        .collect()
}

impl Component for RoomList {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                None
            }
            KeyCode::Enter => self
                .selected_room()
                .map(|room| AppEvent::Navigate(View::RoomCard(room.id))),
            KeyCode::Char('a') if self.owner_controls() => Some(AppEvent::OpenForm(FormKind::AddRoom)),
            KeyCode::Char('v') if self.owner_controls() => {
                Some(AppEvent::OpenForm(FormKind::SetAvailability))
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let owner_height = if self.owner_controls() { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(owner_height), Constraint::Min(0)])
            .split(area);

        if self.owner_controls() {
            let owner_block = Block::default()
                .title(" Owner actions ")
                .borders(Borders::ALL)
                .border_style(THEME.border_style());
            let actions = Paragraph::new(Line::from(vec![
                Span::styled(" a", THEME.accent_style()),
                Span::styled(":Add room  ", THEME.muted_style()),
                Span::styled("v", THEME.accent_style()),
                Span::styled(":Set availability", THEME.muted_style()),
            ]))
            .block(owner_block);
            frame.render_widget(actions, chunks[0]);
        }

        let outer_block = Block::default()
            .title(format!(" Rooms ({}) ", self.rooms.len()))
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());

        if self.rooms.is_empty() {
            let msg = if self.loading {
                "Loading rooms..."
            } else {
                "No rooms available"
            };
            let text = Paragraph::new(msg)
                .style(THEME.muted_style())
                .alignment(Alignment::Center)
                .block(outer_block);
            frame.render_widget(text, chunks[1]);
            return;
        }

        let header = Row::new(vec![
            Cell::from("ID"),
            Cell::from("Category"),
            Cell::from("Price/Night"),
            Cell::from("Status"),
            Cell::from("Reviews"),
            Cell::from("Rating"),
        ])
        .style(THEME.table_header_style())
        .bottom_margin(0);

        let rows = build_rows(&self.rooms);
        let widths = [
            Constraint::Length(6),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Min(6),
        ];

        self.scroll_state = self.scroll_state.content_length(self.rooms.len());

        let table = Table::new(rows, widths)
            .header(header)
            .block(outer_block)
            .row_highlight_style(THEME.selected_style())
            .highlight_symbol(" > ");

        frame.render_stateful_widget(table, chunks[1], &mut self.table_state);

        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));
        let table_area = chunks[1];
        let scrollbar_area = Rect {
            x: table_area.x + table_area.width.saturating_sub(1),
            y: table_area.y + 1,
            width: 1,
            height: table_area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut self.scroll_state);

        if self.account.is_none() && table_area.height > 2 {
            let hint = Paragraph::new(Span::styled(
                " read-only: no signing key ",
                THEME.warning_style(),
            ))
            .alignment(Alignment::Right);
            let hint_area = Rect {
                x: table_area.x + 1,
                y: table_area.y + table_area.height - 1,
                width: table_area.width.saturating_sub(2),
                height: 1,
            };
            frame.render_widget(hint, hint_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    const CHECKSUMMED: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_is_owner_ignores_case() {
        let account: Address = CHECKSUMMED.to_lowercase().parse().unwrap();
        let owner: Address = CHECKSUMMED.parse().unwrap();
        assert!(is_owner(Some(account), Some(owner)));
    }

    #[test]
    fn test_is_owner_requires_both_known() {
        let owner: Address = CHECKSUMMED.parse().unwrap();
        assert!(!is_owner(Some(owner), None));
        assert!(!is_owner(None, Some(owner)));
        assert!(!is_owner(Some(Address::ZERO), Some(owner)));
    }

    #[test]
    fn test_owner_keys_hidden_until_owner_loaded() {
        let mut list = RoomList::new();
        let me: Address = CHECKSUMMED.parse().unwrap();
        list.account = Some(me);
        assert!(list.handle_key(key('a')).is_none());

        list.owner = Some(me);
        assert!(matches!(
            list.handle_key(key('a')),
            Some(AppEvent::OpenForm(FormKind::AddRoom))
        ));
        assert!(matches!(
            list.handle_key(key('v')),
            Some(AppEvent::OpenForm(FormKind::SetAvailability))
        ));
    }

    #[test]
    fn test_non_owner_gets_no_owner_actions() {
        let mut list = RoomList::new();
        list.account = Some(Address::from_slice(&[0x01; 20]));
        list.owner = Some(Address::from_slice(&[0x02; 20]));
        assert!(!list.owner_controls());
        assert!(list.handle_key(key('v')).is_none());
    }
}

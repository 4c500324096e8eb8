use alloy::primitives::{Address, U256};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::types::{ContractCall, Room};
use crate::error::FormError;
use crate::events::AppEvent;
use crate::forms::FormKind;
use crate::theme::THEME;
use crate::tx::{TxController, TxLifecycle};
use crate::utils;

/// Which booking controls a room card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingControls {
    pub show_approve: bool,
    pub book_enabled: bool,
}

/// Approval is offered while the allowance is short of the payment; booking
/// is enabled only once it covers it. An unknown allowance counts as short.
pub fn booking_controls(room: &Room, allowance: Option<U256>) -> BookingControls {
    if !room.is_available {
        return BookingControls {
            show_approve: false,
            book_enabled: false,
        };
    }
    let covered = allowance.is_some_and(|a| a >= room.required_payment());
    BookingControls {
        show_approve: !covered,
        book_enabled: covered,
    }
}

/// Gate checked before any booking call is built.
pub fn check_bookable(room: &Room, allowance: Option<U256>) -> Result<(), FormError> {
    if !room.is_available {
        return Err(FormError::RoomUnavailable);
    }
    if !booking_controls(room, allowance).book_enabled {
        return Err(FormError::AllowanceTooLow {
            required: utils::format_token(room.required_payment()),
        });
    }
    Ok(())
}

pub struct RoomCard {
    pub room_id: U256,
    pub room: Option<Room>,
    pub allowance: Option<U256>,
    /// Booking contract, the spender of the approval.
    spender: Address,
    pub approve: TxController,
    scroll: u16,
}

impl RoomCard {
    pub fn new(room_id: U256, room: Option<Room>, allowance: Option<U256>, spender: Address) -> Self {
        Self {
            room_id,
            room,
            allowance,
            spender,
            approve: TxController::new("Approve"),
            scroll: 0,
        }
    }

    pub fn controls(&self) -> Option<BookingControls> {
        self.room
            .as_ref()
            .map(|room| booking_controls(room, self.allowance))
    }

    fn request_approval(&mut self) -> Option<AppEvent> {
        let room = self.room.as_ref()?;
        if !booking_controls(room, self.allowance).show_approve {
            return None;
        }
        let amount = room.required_payment();
        if !self.approve.begin() {
            return None;
        }
        Some(AppEvent::RequestSignature {
            controller: self.approve.id,
            call: ContractCall::Approve {
                spender: self.spender,
                amount,
            },
        })
    }

    fn request_booking(&self) -> Option<AppEvent> {
        let room = self.room.as_ref()?;
        match check_bookable(room, self.allowance) {
            Ok(()) => Some(AppEvent::OpenForm(FormKind::BookRoom { room: room.clone() })),
            Err(e) => Some(AppEvent::Error(e.to_string())),
        }
    }
}

impl Component for RoomCard {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('p') => self.request_approval(),
            KeyCode::Char('b') => self.request_booking(),
            KeyCode::Char('w') => Some(AppEvent::OpenForm(FormKind::AddReview {
                room_id: self.room_id,
            })),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            KeyCode::Esc | KeyCode::Backspace => Some(AppEvent::Back),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let outer_block = Block::default()
            .title(format!(" Room #{} ", self.room_id))
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());
        let inner = outer_block.inner(area);
        frame.render_widget(outer_block, area);

        let Some(room) = self.room.as_ref() else {
            let text = Paragraph::new("Room not found")
                .style(THEME.muted_style())
                .alignment(Alignment::Center);
            frame.render_widget(text, inner);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // details
                Constraint::Length(3), // actions
                Constraint::Min(3),    // reviews
            ])
            .split(inner);

        // -- Details --
        let allowance = self
            .allowance
            .map(utils::format_token)
            .unwrap_or_else(|| "unknown".to_string());
        let details = vec![
            Line::from(Span::styled(
                format!("  {}", room.category),
                Style::default()
                    .fg(THEME.text_accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("  Price per night: ", THEME.muted_style()),
                Span::styled(room.price_per_night.to_string(), THEME.token_style()),
            ]),
            Line::from(vec![
                Span::styled("  Availability:    ", THEME.muted_style()),
                Span::styled(
                    if room.is_available { "Available" } else { "Unavailable" },
                    THEME.availability_style(room.is_available),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Your allowance:  ", THEME.muted_style()),
                Span::styled(allowance, THEME.token_style()),
                Span::styled(
                    format!(" / {} required", utils::format_token(room.required_payment())),
                    THEME.muted_style(),
                ),
            ]),
        ];
        frame.render_widget(Paragraph::new(details), chunks[0]);

        // -- Actions --
        let controls = booking_controls(room, self.allowance);
        let mut actions: Vec<Span> = vec![Span::raw("  ")];
        if controls.show_approve {
            let label = match self.approve.state() {
                TxLifecycle::Submitted | TxLifecycle::Pending { .. } => "Approving...",
                _ => "p:Approve",
            };
            actions.push(Span::styled(label, THEME.accent_style()));
            actions.push(Span::raw("  "));
        }
        if room.is_available {
            let style = if controls.book_enabled {
                THEME.success_style()
            } else {
                THEME.muted_style()
            };
            actions.push(Span::styled("b:Book room", style));
            actions.push(Span::raw("  "));
        }
        actions.push(Span::styled("w:Add review", THEME.accent_style()));

        let action_block = Block::default()
            .borders(Borders::TOP)
            .border_style(THEME.border_style());
        frame.render_widget(
            Paragraph::new(Line::from(actions)).block(action_block),
            chunks[1],
        );

        // -- Reviews --
        let review_block = Block::default()
            .title(format!(" Reviews ({}) ", room.reviews.len()))
            .borders(Borders::ALL)
            .border_style(THEME.border_style());

        let lines: Vec<Line> = if room.reviews.is_empty() {
            vec![Line::from(Span::styled("  No reviews yet.", THEME.muted_style()))]
        } else {
            room.reviews
                .iter()
                .map(|review| {
                    Line::from(vec![
                        Span::styled(
                            format!("  {} ", utils::format_stars(review.rating)),
                            THEME.star_style(),
                        ),
                        Span::styled(review.comment.clone(), Style::default().fg(THEME.text)),
                    ])
                })
                .collect()
        };

        let reviews = Paragraph::new(lines)
            .block(review_block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(reviews, chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::RoomCategory;
    use crossterm::event::KeyModifiers;

    const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

    fn room(category: RoomCategory, price: u64, available: bool) -> Room {
        Room {
            id: U256::from(1u64),
            category,
            price_per_night: U256::from(price),
            is_available: available,
            reviews: vec![],
        }
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_booking_blocked_below_price_for_all_categories() {
        for category in RoomCategory::ALL {
            let r = room(category, 2, true);
            let controls = booking_controls(&r, Some(U256::from(ONE_TOKEN)));
            assert!(controls.show_approve);
            assert!(!controls.book_enabled);
            assert!(check_bookable(&r, Some(U256::from(ONE_TOKEN))).is_err());
        }
    }

    #[test]
    fn test_booking_enabled_at_exact_price() {
        let r = room(RoomCategory::Deluxe, 2, true);
        let controls = booking_controls(&r, Some(U256::from(2 * ONE_TOKEN)));
        assert_eq!(
            controls,
            BookingControls {
                show_approve: false,
                book_enabled: true,
            }
        );
        assert!(check_bookable(&r, Some(U256::from(2 * ONE_TOKEN))).is_ok());
    }

    #[test]
    fn test_unknown_allowance_blocks_booking() {
        let r = room(RoomCategory::Suite, 1, true);
        assert!(!booking_controls(&r, None).book_enabled);
        assert!(matches!(
            check_bookable(&r, None),
            Err(FormError::AllowanceTooLow { .. })
        ));
    }

    #[test]
    fn test_unavailable_room_has_no_booking_controls() {
        let r = room(RoomCategory::Suite, 1, false);
        let controls = booking_controls(&r, Some(U256::MAX));
        assert!(!controls.show_approve);
        assert!(!controls.book_enabled);
        assert_eq!(check_bookable(&r, Some(U256::MAX)), Err(FormError::RoomUnavailable));
    }

    #[test]
    fn test_approve_key_requests_signature_for_price() {
        let spender = Address::from_slice(&[0xbb; 20]);
        let r = room(RoomCategory::Presidential, 2, true);
        let mut card = RoomCard::new(r.id, Some(r), Some(U256::ZERO), spender);

        match card.handle_key(key('p')) {
            Some(AppEvent::RequestSignature { controller, call }) => {
                assert_eq!(controller, card.approve.id);
                assert_eq!(
                    call,
                    ContractCall::Approve {
                        spender,
                        amount: U256::from(2 * ONE_TOKEN),
                    }
                );
            }
            other => panic!("unexpected {other:?}"),
        }
        // Busy: a second press does nothing
        assert!(card.handle_key(key('p')).is_none());
    }

    #[test]
    fn test_book_key_blocked_without_allowance() {
        let r = room(RoomCategory::Deluxe, 2, true);
        let mut card = RoomCard::new(r.id, Some(r), Some(U256::from(ONE_TOKEN)), Address::ZERO);
        assert!(matches!(card.handle_key(key('b')), Some(AppEvent::Error(_))));

        card.allowance = Some(U256::from(2 * ONE_TOKEN));
        assert!(matches!(
            card.handle_key(key('b')),
            Some(AppEvent::OpenForm(FormKind::BookRoom { .. }))
        ));
        // Nothing left to approve
        assert!(card.handle_key(key('p')).is_none());
    }
}

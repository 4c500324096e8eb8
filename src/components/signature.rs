use alloy::primitives::Address;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::centered_rect;
use crate::data::types::{ContractCall, Contracts};
use crate::theme::THEME;
use crate::tx::ControllerId;
use crate::utils;

/// Outcome of the signature prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptDecision {
    Approved(ControllerId, ContractCall),
    Declined(ControllerId),
}

/// Confirmation overlay shown before the local signer signs anything.
pub struct SignaturePrompt {
    pending: Option<(ControllerId, ContractCall)>,
    account: Option<Address>,
    contracts: Contracts,
}

impl SignaturePrompt {
    pub fn new(account: Option<Address>, contracts: Contracts) -> Self {
        Self {
            pending: None,
            account,
            contracts,
        }
    }

    /// Show the prompt. A request arriving while one is open replaces it and
    /// the replaced one is returned so its controller can be released.
    pub fn open(&mut self, controller: ControllerId, call: ContractCall) -> Option<ControllerId> {
        self.pending
            .replace((controller, call))
            .map(|(previous, _)| previous)
            .filter(|previous| *previous != controller)
    }

    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PromptDecision> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => self
                .pending
                .take()
                .map(|(controller, call)| PromptDecision::Approved(controller, call)),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self
                .pending
                .take()
                .map(|(controller, _)| PromptDecision::Declined(controller)),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some((_, call)) = &self.pending else {
            return;
        };
        let popup_area = centered_rect(area, 60, 10);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Signature Request ")
            .borders(Borders::ALL)
            .border_style(THEME.warning_style())
            .style(Style::default().bg(THEME.surface));

        let signer = self
            .account
            .map(|a| utils::truncate_address(&a))
            .unwrap_or_else(|| "none".to_string());
        let target = call.target(&self.contracts);
        let contract_name = if target == self.contracts.token {
            "token"
        } else {
            "booking"
        };

        let lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Call:     ", THEME.muted_style()),
                Span::styled(call.to_string(), Style::default().fg(THEME.text)),
            ]),
            Line::from(vec![
                Span::styled("  Contract: ", THEME.muted_style()),
                Span::styled(utils::truncate_address(&target), THEME.address_style()),
                Span::styled(format!(" ({contract_name})"), THEME.muted_style()),
            ]),
            Line::from(vec![
                Span::styled("  Signer:   ", THEME.muted_style()),
                Span::styled(signer, THEME.address_style()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("  y", THEME.success_style()),
                Span::styled(":Sign and send  ", THEME.muted_style()),
                Span::styled("n", THEME.error_style()),
                Span::styled(":Reject", THEME.muted_style()),
            ]),
        ];

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            popup_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use crossterm::event::KeyModifiers;

    fn prompt() -> SignaturePrompt {
        SignaturePrompt::new(
            Some(Address::from_slice(&[0xaa; 20])),
            Contracts {
                booking: Address::from_slice(&[0xb0; 20]),
                token: Address::from_slice(&[0x70; 20]),
            },
        )
    }

    fn call() -> ContractCall {
        ContractCall::SetAvailability {
            room_id: U256::from(3u64),
            is_available: false,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_approve_returns_call() {
        let mut p = prompt();
        let id = ControllerId::next();
        assert!(p.open(id, call()).is_none());
        assert!(p.is_active());
        assert_eq!(
            p.handle_key(key(KeyCode::Char('y'))),
            Some(PromptDecision::Approved(id, call()))
        );
        assert!(!p.is_active());
    }

    #[test]
    fn test_escape_declines() {
        let mut p = prompt();
        let id = ControllerId::next();
        p.open(id, call());
        assert_eq!(p.handle_key(key(KeyCode::Esc)), Some(PromptDecision::Declined(id)));
        assert!(p.handle_key(key(KeyCode::Char('y'))).is_none());
    }

    #[test]
    fn test_other_keys_keep_prompt_open() {
        let mut p = prompt();
        p.open(ControllerId::next(), call());
        assert!(p.handle_key(key(KeyCode::Char('x'))).is_none());
        assert!(p.is_active());
    }

    #[test]
    fn test_replacing_request_returns_previous_controller() {
        let mut p = prompt();
        let first = ControllerId::next();
        let second = ControllerId::next();
        p.open(first, call());
        assert_eq!(p.open(second, call()), Some(first));
        assert_eq!(
            p.handle_key(key(KeyCode::Char('n'))),
            Some(PromptDecision::Declined(second))
        );
    }
}

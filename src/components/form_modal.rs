use alloy::primitives::U256;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::room_card::check_bookable;
use crate::components::{Component, centered_rect};
use crate::data::types::ContractCall;
use crate::error::FormError;
use crate::events::AppEvent;
use crate::forms::{Field, FieldInput, FormKind};
use crate::theme::THEME;
use crate::tx::{TxController, TxLifecycle};
use crate::utils;

/// Modal form hosting one write flow. It closes itself once its
/// transaction confirms.
pub struct FormModal {
    pub kind: FormKind,
    fields: Vec<Field>,
    focus: usize,
    pub tx: TxController,
    /// Allowance snapshot, consulted by the booking form.
    pub allowance: Option<U256>,
    pub error: Option<String>,
}

impl FormModal {
    pub fn new(kind: FormKind, allowance: Option<U256>) -> Self {
        let fields = kind.fields();
        let tx = TxController::new(kind.action_label());
        Self {
            kind,
            fields,
            focus: 0,
            tx,
            allowance,
            error: None,
        }
    }

    fn build_call(&self) -> Result<ContractCall, FormError> {
        if let FormKind::BookRoom { room } = &self.kind {
            check_bookable(room, self.allowance)?;
        }
        self.kind.validate(&self.fields)
    }

    fn submit(&mut self) -> Option<AppEvent> {
        if self.tx.is_busy() {
            return None;
        }
        match self.build_call() {
            Ok(call) => {
                self.error = None;
                if !self.tx.begin() {
                    return None;
                }
                Some(AppEvent::RequestSignature {
                    controller: self.tx.id,
                    call,
                })
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = if self.focus == 0 {
                self.fields.len() - 1
            } else {
                self.focus - 1
            };
        }
    }

    fn status_line(&self) -> Line<'static> {
        match self.tx.state() {
            TxLifecycle::Submitted => {
                Line::from(Span::styled("  Waiting for signature...", THEME.warning_style()))
            }
            TxLifecycle::Pending { hash } => Line::from(vec![
                Span::styled("  Pending ", THEME.warning_style()),
                Span::styled(utils::truncate_hash(hash), THEME.hash_style()),
            ]),
            TxLifecycle::Failed { error, .. } => {
                let mut spans = vec![Span::styled(format!("  Failed: {error}"), THEME.error_style())];
                if let Some(hash) = self.tx.state().hash() {
                    spans.push(Span::styled(
                        format!(" ({})", utils::truncate_hash(&hash)),
                        THEME.hash_style(),
                    ));
                }
                Line::from(spans)
            }
            TxLifecycle::Idle | TxLifecycle::Confirmed { .. } => Line::from(vec![
                Span::styled("  Enter", THEME.accent_style()),
                Span::styled(":Submit  ", THEME.muted_style()),
                Span::styled("Tab", THEME.accent_style()),
                Span::styled(":Next field  ", THEME.muted_style()),
                Span::styled("Space", THEME.accent_style()),
                Span::styled(":Toggle  ", THEME.muted_style()),
                Span::styled("Esc", THEME.accent_style()),
                Span::styled(":Close", THEME.muted_style()),
            ]),
        }
    }
}

impl Component for FormModal {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Esc => Some(AppEvent::CloseForm),
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                None
            }
            // Inputs are frozen while a submission is in flight
            _ if self.tx.is_busy() => None,
            KeyCode::Backspace => {
                if let Some(FieldInput::Text(value)) =
                    self.fields.get_mut(self.focus).map(|f| &mut f.input)
                {
                    value.pop();
                }
                self.error = None;
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(FieldInput::Text(value)) =
                    self.fields.get_mut(self.focus).map(|f| &mut f.input)
                {
                    value.clear();
                }
                self.error = None;
                None
            }
            // Other chords are not text
            KeyCode::Char(_)
                if key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                None
            }
            KeyCode::Char(c) => {
                match self.fields.get_mut(self.focus).map(|f| &mut f.input) {
                    Some(FieldInput::Toggle(value)) if c == ' ' => *value = !*value,
                    Some(FieldInput::Text(value)) => value.push(c),
                    _ => {}
                }
                self.error = None;
                None
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let height = self.fields.len() as u16 + 6;
        let popup_area = centered_rect(area, 60, height);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!(" {} ", self.kind.title()))
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style())
            .style(Style::default().bg(THEME.surface));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let mut lines: Vec<Line> = Vec::new();
        if let FormKind::BookRoom { room } = &self.kind {
            lines.push(Line::from(vec![
                Span::styled(format!("  {} ", room.category), THEME.accent_style()),
                Span::styled(
                    format!("{} per night", utils::format_token(room.required_payment())),
                    THEME.token_style(),
                ),
            ]));
        } else {
            lines.push(Line::from(""));
        }

        for (i, field) in self.fields.iter().enumerate() {
            let focused = i == self.focus;
            let value = match &field.input {
                FieldInput::Text(v) if focused => format!("{v}_"),
                FieldInput::Text(v) => v.clone(),
                FieldInput::Toggle(true) => "[x]".to_string(),
                FieldInput::Toggle(false) => "[ ]".to_string(),
            };
            let style = if focused {
                Style::default().fg(THEME.text).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(THEME.text)
            };
            lines.push(Line::from(vec![
                Span::styled(
                    if focused { " > " } else { "   " },
                    THEME.accent_style(),
                ),
                Span::styled(format!("{}: ", field.label), THEME.muted_style()),
                Span::styled(value, style),
            ]));
        }

        lines.push(Line::from(""));
        match &self.error {
            Some(err) => lines.push(Line::from(Span::styled(
                format!("  {err}"),
                THEME.error_style(),
            ))),
            None => lines.push(Line::from("")),
        }
        lines.push(self.status_line());

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

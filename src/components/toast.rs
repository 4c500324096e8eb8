use std::time::{Duration, Instant};

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;
use crate::tx::{ControllerId, Notice};
use crate::utils;

const TOAST_TTL: Duration = Duration::from_secs(6);
const MAX_VISIBLE: usize = 4;
const TOAST_WIDTH: u16 = 56;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Stays until replaced or dismissed.
    Loading,
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub controller: Option<ControllerId>,
    pub kind: ToastKind,
    pub title: String,
    pub body: String,
    created: Instant,
}

impl Toast {
    fn expired(&self, now: Instant) -> bool {
        self.kind != ToastKind::Loading && now.duration_since(self.created) >= TOAST_TTL
    }
}

/// Notification stack drawn in the bottom-right corner. Transaction toasts
/// are keyed by controller so a flow's pending toast is replaced by its
/// outcome.
pub struct Toasts {
    items: Vec<Toast>,
    explorer_url: String,
}

impl Toasts {
    pub fn new(explorer_url: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            explorer_url: explorer_url.into(),
        }
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }

    pub fn notify(&mut self, controller: ControllerId, notice: Notice) {
        let (kind, title, body) = match notice {
            Notice::Pending { label, hash } => (
                ToastKind::Loading,
                "Transaction Pending".to_string(),
                format!("{label}: {}", utils::truncate_hash(&hash)),
            ),
            Notice::Success { label, hash } => (
                ToastKind::Success,
                "Transaction Successful".to_string(),
                format!(
                    "{label}: {}",
                    utils::explorer_tx_url(&self.explorer_url, &hash)
                ),
            ),
            Notice::Failure { label, message } => (
                ToastKind::Error,
                format!("{label} failed"),
                message,
            ),
        };
        self.dismiss(controller);
        self.push(Toast {
            controller: Some(controller),
            kind,
            title,
            body,
            created: Instant::now(),
        });
    }

    pub fn info(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.push(Toast {
            controller: None,
            kind: ToastKind::Info,
            title: title.into(),
            body: body.into(),
            created: Instant::now(),
        });
    }

    pub fn error(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.push(Toast {
            controller: None,
            kind: ToastKind::Error,
            title: title.into(),
            body: body.into(),
            created: Instant::now(),
        });
    }

    /// Drop any toast owned by `controller`.
    pub fn dismiss(&mut self, controller: ControllerId) {
        self.items.retain(|t| t.controller != Some(controller));
    }

    pub fn prune(&mut self) {
        let now = Instant::now();
        self.items.retain(|t| !t.expired(now));
    }

    fn push(&mut self, toast: Toast) {
        self.items.push(toast);
        if self.items.len() > MAX_VISIBLE {
            let overflow = self.items.len() - MAX_VISIBLE;
            self.items.drain(..overflow);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = TOAST_WIDTH.min(area.width);
        let mut bottom = area.y + area.height;

        for toast in self.items.iter().rev() {
            let height = 4u16;
            if bottom < area.y + height {
                break;
            }
            bottom -= height;
            let rect = Rect::new(area.x + area.width - width, bottom, width, height);

            let (icon, style) = match toast.kind {
                ToastKind::Loading => ("\u{25cc} ", THEME.warning_style()),
                ToastKind::Success => ("\u{2714} ", THEME.success_style()),
                ToastKind::Error => ("\u{2716} ", THEME.error_style()),
                ToastKind::Info => ("\u{2139} ", THEME.accent_style()),
            };

            let block = Block::default()
                .title(Line::from(vec![
                    Span::styled(format!(" {icon}"), style),
                    Span::styled(format!("{} ", toast.title), style.add_modifier(Modifier::BOLD)),
                ]))
                .borders(Borders::ALL)
                .border_style(style)
                .style(Style::default().bg(THEME.surface));

            let body = Paragraph::new(Span::styled(
                toast.body.clone(),
                Style::default().fg(THEME.text),
            ))
            .block(block)
            .wrap(Wrap { trim: true });

            frame.render_widget(Clear, rect);
            frame.render_widget(body, rect);
        }
    }
}

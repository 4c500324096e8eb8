use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::components::Component;
use crate::components::form_modal::FormModal;
use crate::components::header::Header;
use crate::components::help::HelpOverlay;
use crate::components::room_card::RoomCard;
use crate::components::room_list::RoomList;
use crate::components::signature::{PromptDecision, SignaturePrompt};
use crate::components::status_bar::{Hints, StatusBar};
use crate::components::toast::Toasts;
use crate::data::DataService;
use crate::data::types::Contracts;
use crate::error::GatewayError;
use crate::events::{AppEvent, View};
use crate::theme::THEME;
use crate::tx::{ControllerId, TxUpdate};

pub struct App {
    // Navigation
    view_stack: Vec<View>,
    current_view: View,

    // Components
    header: Header,
    room_list: RoomList,
    room_card: Option<RoomCard>,
    form: Option<FormModal>,
    prompt: SignaturePrompt,
    toasts: Toasts,
    status_bar: StatusBar,
    help: HelpOverlay,

    // Session
    account: Option<Address>,
    contracts: Contracts,
    allowance: Option<U256>,

    // Data
    data_service: Arc<DataService>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    export_dir: PathBuf,

    // State
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn with_service(
        data_service: Arc<DataService>,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        explorer_url: &str,
        export_dir: PathBuf,
        tick_rate_ms: u64,
    ) -> Self {
        let account = data_service.account();
        let contracts = data_service.contracts();
        Self {
            view_stack: Vec::new(),
            current_view: View::RoomList,
            header: Header::new(),
            room_list: RoomList::new(),
            room_card: None,
            form: None,
            prompt: SignaturePrompt::new(account, contracts),
            toasts: Toasts::new(explorer_url),
            status_bar: StatusBar::new(),
            help: HelpOverlay::new(),
            account,
            contracts,
            allowance: None,
            data_service,
            event_rx,
            export_dir,
            should_quit: false,
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    pub async fn run(&mut self, mut terminal: ratatui::DefaultTerminal) -> color_eyre::Result<()> {
        self.load_initial();

        let mut interval = tokio::time::interval(self.tick_rate);
        let mut events = EventStream::new();

        while !self.should_quit {
            tokio::select! {
                _ = interval.tick() => {
                    self.toasts.prune();
                    terminal.draw(|frame| self.render(frame))?;
                }
                Some(Ok(event)) = events.next() => {
                    self.handle_terminal_event(event);
                }
                Some(app_event) = self.event_rx.recv() => {
                    self.handle_app_event(app_event);
                }
            }
        }

        Ok(())
    }

    fn load_initial(&self) {
        self.data_service.fetch_rooms();
        self.data_service.fetch_owner();
        self.data_service.fetch_allowance();
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Fill background
        frame.render_widget(
            Block::default().style(Style::default().bg(THEME.bg)),
            area,
        );

        // Layout: header (1) | content (fill) | status bar (1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.render(frame, chunks[0]);

        match (&self.current_view, self.room_card.as_mut()) {
            (View::RoomCard(_), Some(card)) => card.render(frame, chunks[1]),
            _ => self.room_list.render(frame, chunks[1]),
        }

        self.status_bar.hints = if self.prompt.is_active() {
            Hints::Prompt
        } else if self.form.is_some() {
            Hints::Form
        } else if matches!(self.current_view, View::RoomCard(_)) {
            Hints::RoomCard
        } else {
            Hints::RoomList
        };
        self.status_bar.render(frame, chunks[2]);

        // Overlays (rendered on top)
        if let Some(form) = self.form.as_mut() {
            form.render(frame, chunks[1]);
        }
        self.prompt.render(frame, area);
        self.help.render(frame, area);
        self.toasts.render(frame, chunks[1]);
    }

    fn handle_terminal_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only handle key press events (not release/repeat) for cross-platform compat
            if key.kind != KeyEventKind::Press {
                return;
            }
            self.handle_key(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Help overlay consumes all keys when visible
        if self.help.handle_key(key) {
            return;
        }

        // The signature prompt is modal
        if self.prompt.is_active() {
            match self.prompt.handle_key(key) {
                Some(PromptDecision::Approved(controller, call)) => {
                    info!(%call, "signature approved");
                    self.data_service.submit(controller, call);
                }
                Some(PromptDecision::Declined(controller)) => {
                    info!("signature rejected");
                    self.route_tx(controller, TxUpdate::SubmitFailed(GatewayError::UserRejected));
                }
                None => {}
            }
            return;
        }

        if let Some(form) = self.form.as_mut() {
            if let Some(event) = form.handle_key(key) {
                self.handle_app_event(event);
            }
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.help.toggle();
                return;
            }
            KeyCode::Char('r') => {
                self.handle_app_event(AppEvent::Refresh);
                return;
            }
            KeyCode::Char('e') => {
                self.export();
                return;
            }
            KeyCode::Esc | KeyCode::Backspace => {
                self.go_back();
                return;
            }
            _ => {}
        }

        // Delegate to current view's component
        let app_event = match (&self.current_view, self.room_card.as_mut()) {
            (View::RoomCard(_), Some(card)) => card.handle_key(key),
            _ => self.room_list.handle_key(key),
        };

        if let Some(event) = app_event {
            self.handle_app_event(event);
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Connected { chain_id, account } => {
                self.header.chain_id = Some(chain_id);
                self.header.account = account;
                self.room_list.account = account;
                self.account = account;
            }
            AppEvent::RoomsLoaded(rooms) => {
                self.status_bar.loading = false;
                self.status_bar.room_count = rooms.len();
                if let Some(card) = self.room_card.as_mut() {
                    card.room = rooms.iter().find(|r| r.id == card.room_id).cloned();
                }
                self.room_list.set_rooms(rooms);
            }
            AppEvent::OwnerLoaded(owner) => {
                self.header.owner = Some(owner);
                self.room_list.owner = Some(owner);
            }
            AppEvent::AllowanceLoaded {
                owner,
                spender,
                amount,
            } => {
                if Some(owner) != self.account || spender != self.contracts.booking {
                    debug!(%owner, %spender, "ignoring allowance for another pair");
                    return;
                }
                self.allowance = Some(amount);
                if let Some(card) = self.room_card.as_mut() {
                    card.allowance = Some(amount);
                }
                if let Some(form) = self.form.as_mut() {
                    form.allowance = Some(amount);
                }
            }
            AppEvent::AllowanceFailed(msg) => {
                self.forget_allowance();
                self.handle_app_event(AppEvent::ReadFailed(msg));
            }
            AppEvent::ReadFailed(msg) => {
                self.status_bar.loading = false;
                self.room_list.loading = false;
                self.toasts.error("Read failed", msg.clone());
                self.status_bar.error_message = Some(msg);
            }
            AppEvent::OpenForm(kind) => {
                if self.form.is_some() {
                    return;
                }
                if self.account.is_none() {
                    self.status_bar.error_message =
                        Some("Read-only session: no signing key configured".to_string());
                    return;
                }
                self.status_bar.error_message = None;
                self.form = Some(FormModal::new(kind, self.allowance));
            }
            AppEvent::CloseForm => {
                if let Some(form) = self.form.take() {
                    if form.tx.is_busy() {
                        self.toasts.dismiss(form.tx.id);
                    }
                }
            }
            AppEvent::RequestSignature { controller, call } => {
                if self.account.is_none() {
                    self.route_tx(
                        controller,
                        TxUpdate::SubmitFailed(GatewayError::Submission(
                            "no signing key configured".to_string(),
                        )),
                    );
                    return;
                }
                if let Some(replaced) = self.prompt.open(controller, call) {
                    self.route_tx(replaced, TxUpdate::SubmitFailed(GatewayError::UserRejected));
                }
            }
            AppEvent::Tx { controller, update } => {
                self.route_tx(controller, update);
            }
            AppEvent::ExportComplete(msg) => {
                self.toasts.info("Export complete", msg);
            }
            AppEvent::Navigate(view) => {
                self.navigate_to(view);
            }
            AppEvent::Back => {
                self.go_back();
            }
            AppEvent::Refresh => {
                // Whatever was read before the refresh may already be spent
                self.forget_allowance();
                self.status_bar.loading = true;
                self.status_bar.error_message = None;
                self.data_service.refresh();
            }
            AppEvent::Error(msg) => {
                self.status_bar.error_message = Some(msg);
                self.status_bar.loading = false;
            }
        }
    }

    /// Deliver a transaction update to the mounted controller with this id.
    fn route_tx(&mut self, controller: ControllerId, update: TxUpdate) {
        let mut from_form = false;
        let reaction = if let Some(form) = self.form.as_mut().filter(|f| f.tx.id == controller) {
            from_form = true;
            form.tx.on_update(update)
        } else if let Some(card) = self
            .room_card
            .as_mut()
            .filter(|c| c.approve.id == controller)
        {
            card.approve.on_update(update)
        } else {
            debug!(?controller, ?update, "dropping update for unmounted controller");
            return;
        };

        if let Some(notice) = reaction.notice {
            self.toasts.notify(controller, notice);
        }
        if reaction.refresh {
            self.handle_app_event(AppEvent::Refresh);
        }
        if reaction.finished && from_form {
            self.form = None;
        }
    }

    /// Treat the allowance as unknown until the next successful read.
    fn forget_allowance(&mut self) {
        self.allowance = None;
        if let Some(card) = self.room_card.as_mut() {
            card.allowance = None;
        }
        if let Some(form) = self.form.as_mut() {
            form.allowance = None;
        }
    }

    fn export(&mut self) {
        if self.room_list.rooms.is_empty() {
            self.status_bar.error_message = Some("No rooms to export".to_string());
            return;
        }
        self.data_service
            .export_rooms(self.room_list.rooms.clone(), self.export_dir.clone());
    }

    fn navigate_to(&mut self, view: View) {
        // Clear error on navigation
        self.status_bar.error_message = None;

        if let View::RoomCard(room_id) = &view {
            let room = self
                .room_list
                .rooms
                .iter()
                .find(|r| r.id == *room_id)
                .cloned();
            self.dismiss_card();
            self.room_card = Some(RoomCard::new(
                *room_id,
                room,
                self.allowance,
                self.contracts.booking,
            ));
            self.header.view_title = format!("Room #{room_id}");
            self.data_service.fetch_allowance();
        }

        // Push current view to stack
        let old_view = std::mem::replace(&mut self.current_view, view);
        self.view_stack.push(old_view);
    }

    fn go_back(&mut self) {
        if let Some(prev_view) = self.view_stack.pop() {
            self.current_view = prev_view;
            if self.current_view == View::RoomList {
                self.dismiss_card();
                self.header.view_title = "Rooms".to_string();
            }
            self.status_bar.error_message = None;
        }
    }

    /// Unmount the room card. Its in-flight approval is no longer observed.
    fn dismiss_card(&mut self) {
        if let Some(card) = self.room_card.take() {
            if card.approve.is_busy() {
                self.toasts.dismiss(card.approve.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::room_card::BookingControls;
    use crate::components::toast::ToastKind;
    use crate::data::gateway::ReceiptStatus;
    use crate::data::gateway::mock::MockGateway;
    use crate::data::types::{ContractCall, Room, RoomCategory};
    use crate::forms::FormKind;
    use crate::tx::TxLifecycle;
    use alloy::primitives::B256;

    const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

    fn room(id: u64, price: u64) -> Room {
        Room {
            id: U256::from(id),
            category: RoomCategory::Deluxe,
            price_per_night: U256::from(price),
            is_available: true,
            reviews: vec![],
        }
    }

    fn app_with(gateway: Arc<MockGateway>) -> App {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = DataService::new(
            gateway.clone(),
            tx,
            Duration::from_millis(1),
            Duration::from_secs(5),
        );
        let mut app = App::with_service(
            Arc::new(service),
            rx,
            "https://explorer.test",
            std::env::temp_dir(),
            100,
        );
        app.handle_app_event(AppEvent::Connected {
            chain_id: 2810,
            account: gateway.account,
        });
        app
    }

    fn press(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }

    fn enter(app: &mut App) {
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    }

    /// Feed data events into the app until `done` holds.
    async fn pump_until(app: &mut App, done: impl Fn(&App) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !done(&*app) {
                let Some(event) = app.event_rx.recv().await else {
                    break;
                };
                app.handle_app_event(event);
            }
        })
        .await
        .expect("condition not reached in time");
    }

    async fn loaded_app(gateway: Arc<MockGateway>) -> App {
        let mut app = app_with(gateway);
        app.load_initial();
        pump_until(&mut app, |a| {
            !a.room_list.rooms.is_empty() && a.allowance.is_some() && a.room_list.owner.is_some()
        })
        .await;
        app
    }

    #[tokio::test]
    async fn test_approve_then_book_flow() {
        let gateway = Arc::new(MockGateway::new());
        *gateway.rooms.lock().unwrap() = Ok(vec![room(1, 2)]);
        *gateway.allowance.lock().unwrap() = U256::from(ONE_TOKEN);
        gateway.push_receipt(Ok(ReceiptStatus::Success));

        let mut app = loaded_app(gateway.clone()).await;
        app.handle_app_event(AppEvent::Navigate(View::RoomCard(U256::from(1u64))));

        let controls = app.room_card.as_ref().and_then(|c| c.controls()).unwrap();
        assert!(controls.show_approve);
        assert!(!controls.book_enabled);

        // Booking is refused before approval
        press(&mut app, 'b');
        assert!(app.form.is_none());
        assert!(app.status_bar.error_message.is_some());

        press(&mut app, 'p');
        assert!(app.prompt.is_active());

        // The chain now reports the approved amount
        *gateway.allowance.lock().unwrap() = U256::from(2 * ONE_TOKEN);
        press(&mut app, 'y');

        pump_until(&mut app, |a| a.allowance == Some(U256::from(2 * ONE_TOKEN))).await;

        let card = app.room_card.as_ref().unwrap();
        assert!(matches!(card.approve.state(), TxLifecycle::Confirmed { .. }));
        let controls = card.controls().unwrap();
        assert!(!controls.show_approve);
        assert!(controls.book_enabled);

        assert_eq!(
            gateway.submitted.lock().unwrap()[0],
            ContractCall::Approve {
                spender: app.contracts.booking,
                amount: U256::from(2 * ONE_TOKEN),
            }
        );
        assert!(
            app.toasts
                .items()
                .iter()
                .any(|t| t.title == "Transaction Successful")
        );

        press(&mut app, 'b');
        assert!(matches!(
            app.form.as_ref().map(|f| &f.kind),
            Some(FormKind::BookRoom { .. })
        ));
    }

    #[tokio::test]
    async fn test_booking_confirmation_refreshes_once_and_closes_form() {
        let gateway = Arc::new(MockGateway::new());
        *gateway.rooms.lock().unwrap() = Ok(vec![room(1, 2)]);
        *gateway.allowance.lock().unwrap() = U256::from(2 * ONE_TOKEN);
        gateway.push_receipt(Ok(ReceiptStatus::NotFound));
        gateway.push_receipt(Ok(ReceiptStatus::Success));

        let mut app = loaded_app(gateway.clone()).await;
        app.handle_app_event(AppEvent::Navigate(View::RoomCard(U256::from(1u64))));
        press(&mut app, 'b');
        assert!(app.form.is_some());

        enter(&mut app);
        assert!(app.prompt.is_active());
        // Once the booking lands the contract reports the room as taken
        let mut booked = room(1, 2);
        booked.is_available = false;
        *gateway.rooms.lock().unwrap() = Ok(vec![booked]);
        press(&mut app, 'y');

        let reads_before = *gateway.room_reads.lock().unwrap();
        pump_until(&mut app, |a| a.form.is_none()).await;

        // Let the refresh land, then drain whatever is left
        let reads = gateway.clone();
        pump_until(&mut app, move |_| *reads.room_reads.lock().unwrap() > reads_before).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        while let Ok(event) = app.event_rx.try_recv() {
            app.handle_app_event(event);
        }
        assert_eq!(*gateway.room_reads.lock().unwrap(), reads_before + 1);
        assert!(!app.room_list.rooms[0].is_available);
        let card = app.room_card.as_ref().unwrap();
        assert!(!card.room.as_ref().unwrap().is_available);
        assert_eq!(
            card.controls(),
            Some(BookingControls {
                show_approve: false,
                book_enabled: false,
            })
        );
        assert!(matches!(
            gateway.submitted.lock().unwrap()[0],
            ContractCall::BookRoom {
                category: RoomCategory::Deluxe,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_failed_allowance_reread_blocks_booking() {
        let gateway = Arc::new(MockGateway::new());
        *gateway.rooms.lock().unwrap() = Ok(vec![room(1, 2)]);
        gateway.push_allowance(Duration::ZERO, Ok(U256::from(2 * ONE_TOKEN)));
        gateway.push_allowance(
            Duration::ZERO,
            Err(GatewayError::Read("allowance returned no data".into())),
        );
        gateway.push_receipt(Ok(ReceiptStatus::Success));

        let mut app = loaded_app(gateway.clone()).await;
        app.handle_app_event(AppEvent::Navigate(View::RoomCard(U256::from(1u64))));
        assert!(app.room_card.as_ref().unwrap().controls().unwrap().book_enabled);

        press(&mut app, 'b');
        enter(&mut app);
        press(&mut app, 'y');

        pump_until(&mut app, |a| {
            a.form.is_none() && a.toasts.items().iter().any(|t| t.title == "Read failed")
        })
        .await;

        assert_eq!(app.allowance, None);
        let controls = app.room_card.as_ref().unwrap().controls().unwrap();
        assert!(controls.show_approve);
        assert!(!controls.book_enabled);

        press(&mut app, 'b');
        assert!(app.form.is_none());
    }

    #[tokio::test]
    async fn test_refresh_forgets_allowance_everywhere() {
        let gateway = Arc::new(MockGateway::new());
        *gateway.rooms.lock().unwrap() = Ok(vec![room(1, 2)]);
        *gateway.allowance.lock().unwrap() = U256::from(2 * ONE_TOKEN);
        let mut app = loaded_app(gateway).await;
        app.handle_app_event(AppEvent::Navigate(View::RoomCard(U256::from(1u64))));
        press(&mut app, 'b');
        assert!(app.form.is_some());

        app.handle_app_event(AppEvent::Refresh);
        assert_eq!(app.allowance, None);
        assert_eq!(app.room_card.as_ref().unwrap().allowance, None);
        assert_eq!(app.form.as_ref().unwrap().allowance, None);
    }

    #[tokio::test]
    async fn test_owner_controls_hidden_until_owner_loaded() {
        let gateway = Arc::new(MockGateway::new());
        let mut app = app_with(gateway.clone());

        press(&mut app, 'a');
        assert!(app.form.is_none());

        app.data_service.fetch_owner();
        pump_until(&mut app, |a| a.room_list.owner.is_some()).await;
        press(&mut app, 'a');
        assert!(matches!(
            app.form.as_ref().map(|f| &f.kind),
            Some(FormKind::AddRoom)
        ));
    }

    #[tokio::test]
    async fn test_rejected_signature_returns_to_idle() {
        let gateway = Arc::new(MockGateway::new());
        *gateway.rooms.lock().unwrap() = Ok(vec![room(1, 2)]);
        let mut app = loaded_app(gateway.clone()).await;
        app.handle_app_event(AppEvent::Navigate(View::RoomCard(U256::from(1u64))));

        press(&mut app, 'p');
        press(&mut app, 'n');

        let card = app.room_card.as_ref().unwrap();
        assert_eq!(card.approve.state(), &TxLifecycle::Idle);
        assert!(gateway.submitted.lock().unwrap().is_empty());
        let toast = app.toasts.items().last().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.body, "signature request rejected");
    }

    #[tokio::test]
    async fn test_read_only_session_cannot_sign() {
        let gateway = Arc::new(MockGateway {
            account: None,
            ..MockGateway::new()
        });
        *gateway.rooms.lock().unwrap() = Ok(vec![room(1, 2)]);
        let mut app = app_with(gateway.clone());
        app.data_service.fetch_rooms();
        pump_until(&mut app, |a| !a.room_list.rooms.is_empty()).await;

        app.handle_app_event(AppEvent::Navigate(View::RoomCard(U256::from(1u64))));
        press(&mut app, 'p');
        assert!(!app.prompt.is_active());
        assert_eq!(
            app.room_card.as_ref().unwrap().approve.state(),
            &TxLifecycle::Idle
        );

        press(&mut app, 'w');
        assert!(app.form.is_none());
    }

    #[tokio::test]
    async fn test_updates_for_unmounted_controller_are_dropped() {
        let gateway = Arc::new(MockGateway::new());
        let mut app = app_with(gateway);
        app.handle_app_event(AppEvent::Tx {
            controller: ControllerId::next(),
            update: TxUpdate::Confirmed(B256::repeat_byte(1)),
        });
        assert!(app.toasts.items().is_empty());
    }

    #[tokio::test]
    async fn test_closing_busy_form_dismisses_pending_toast() {
        let gateway = Arc::new(MockGateway::new());
        let mut app = app_with(gateway);
        app.handle_app_event(AppEvent::OpenForm(FormKind::SetAvailability));
        enter(&mut app);
        let id = app.form.as_ref().unwrap().tx.id;
        press(&mut app, 'y');
        app.handle_app_event(AppEvent::Tx {
            controller: id,
            update: TxUpdate::Accepted(B256::repeat_byte(2)),
        });
        assert_eq!(app.toasts.items()[0].kind, ToastKind::Loading);

        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(app.form.is_none());
        assert!(app.toasts.items().is_empty());

        // The late confirmation has nowhere to go
        app.handle_app_event(AppEvent::Tx {
            controller: id,
            update: TxUpdate::Confirmed(B256::repeat_byte(2)),
        });
        assert!(app.toasts.items().is_empty());
    }
}

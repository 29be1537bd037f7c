//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns all panels and `AppState` (shared read-only data for them).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background
//!   tasks: the startup load, chat requests, and the per-kind generation
//!   pollers.
//! - The event loop draws each frame, then awaits the next message.
//! - Panels return `Vec<Action>`; App dispatches each Action.
//! - Generation tasks are registered in a `JobRegistry`, so resubmitting a
//!   kind aborts its previous poller instead of leaking it.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use genbox_proto::api::{ApiClient, UserInfo};
use genbox_proto::catalog::{MediaKind, ModelCatalog};
use genbox_proto::job::GenerationRequest;
use genbox_proto::poll::{spawn_generation, JobRegistry, JobUpdate, PollSettings};

use crate::{
    action::{Action, Tab},
    app_state::{AppState, ChatExchange, JobPhase, StatusBadge},
    component::Component,
    components::{
        chat_panel::ChatPanel, gen_panel::GenPanel, header::Header, music_panel::MusicPanel,
    },
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
};

const CHAT_HISTORY_MAX: usize = 50;

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    CatalogLoaded(ModelCatalog),
    CatalogFailed(String),
    IdentityMissing,
    UserLoaded(UserInfo),
    UserFailed(String),
    ChatReply { message: String, text: String },
    ChatFailed { message: String, error: String },
    Job(MediaKind, JobUpdate),
}

// ── Persistence serde structs ─────────────────────────────────────────────────

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
struct UiSessionState {
    tab: String,
    chat_model: Option<String>,
    image_model: Option<String>,
    video_model: Option<String>,
    music_model: Option<String>,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    // ── Shared state (passed read-only to panels) ─────────────────────────────
    state: AppState,

    // ── Panels ────────────────────────────────────────────────────────────────
    header: Header,
    chat_panel: ChatPanel,
    image_panel: GenPanel,
    video_panel: GenPanel,
    music_panel: MusicPanel,

    // ── Session bookkeeping ───────────────────────────────────────────────────
    api: ApiClient,
    settings: PollSettings,
    identity: Option<i64>,
    registry: JobRegistry,
    toast: ToastManager,
    ui_state_path: PathBuf,
    saved_session: UiSessionState,

    tx: Option<mpsc::Sender<AppMessage>>,
    job_tx: Option<mpsc::Sender<(MediaKind, JobUpdate)>>,

    /// Whether to quit on next iteration.
    should_quit: bool,
}

impl App {
    pub fn new(
        api: ApiClient,
        settings: PollSettings,
        identity: Option<i64>,
        ui_state_path: PathBuf,
    ) -> Self {
        let saved_session = load_ui_session_state(&ui_state_path);
        let mut state = AppState::new();
        if let Some(tab) = Tab::ALL
            .iter()
            .find(|t| t.kind().slug() == saved_session.tab)
        {
            state.tab = *tab;
        }

        Self {
            state,
            header: Header,
            chat_panel: ChatPanel::new(),
            image_panel: GenPanel::new(
                MediaKind::Image,
                crate::action::ComponentId::ImagePanel,
                '2',
            ),
            video_panel: GenPanel::new(
                MediaKind::Video,
                crate::action::ComponentId::VideoPanel,
                '3',
            ),
            music_panel: MusicPanel::new(),
            api,
            settings,
            identity,
            registry: JobRegistry::new(),
            toast: ToastManager::new(),
            ui_state_path,
            saved_session,
            tx: None,
            job_tx: None,
            should_quit: false,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);
        self.tx = Some(tx.clone());

        // ── Background task: keyboard events ──────────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: generation updates → AppMessage ──────────────────
        let (job_tx, mut job_rx) = mpsc::channel::<(MediaKind, JobUpdate)>(64);
        self.job_tx = Some(job_tx);
        let job_forward_tx = tx.clone();
        tokio::spawn(async move {
            while let Some((kind, update)) = job_rx.recv().await {
                if job_forward_tx
                    .send(AppMessage::Job(kind, update))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        // ── Background task: startup load (catalog, then identity/balance) ────
        self.spawn_startup_load(tx.clone());

        // Toast expiry check
        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        loop {
            terminal.draw(|f| self.draw(f))?;
            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    self.handle_message(msg);
                }
                _ = toast_tick.tick() => {
                    self.toast.tick();
                }
            }

            if self.should_quit {
                break;
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        self.registry.abort_all();
        self.save_ui_session_state();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    /// Fetch the model catalog, then resolve identity and the credit
    /// balance.  A catalog failure aborts the sequence; a balance failure
    /// leaves the already-rendered catalog untouched.
    fn spawn_startup_load(&self, tx: mpsc::Sender<AppMessage>) {
        let api = self.api.clone();
        let identity = self.identity;
        tokio::spawn(async move {
            match api.models().await {
                Ok(catalog) => {
                    let _ = tx.send(AppMessage::CatalogLoaded(catalog)).await;
                }
                Err(e) => {
                    warn!("catalog load failed: {}", e);
                    let _ = tx.send(AppMessage::CatalogFailed(e.to_string())).await;
                    return;
                }
            }
            match identity {
                None => {
                    let _ = tx.send(AppMessage::IdentityMissing).await;
                }
                Some(id) => match api.me(id).await {
                    Ok(user) => {
                        let _ = tx.send(AppMessage::UserLoaded(user)).await;
                    }
                    Err(e) => {
                        warn!("user info load failed: {}", e);
                        let _ = tx.send(AppMessage::UserFailed(e.to_string())).await;
                    }
                },
            }
        });
    }

    // ── Message handler ───────────────────────────────────────────────────────

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(ev) => {
                if let Event::Key(key) = ev {
                    if key.kind == KeyEventKind::Release {
                        return;
                    }
                    let actions = self.handle_key(key);
                    for action in actions {
                        self.dispatch(action);
                    }
                }
            }
            AppMessage::CatalogLoaded(catalog) => {
                info!(
                    "catalog loaded: {} chat / {} image / {} video / {} music models",
                    catalog.chat.len(),
                    catalog.image.len(),
                    catalog.video.len(),
                    catalog.music.len()
                );
                self.state.catalog = catalog;
                self.state.catalog_loaded = true;
                self.restore_model_selection();
            }
            AppMessage::CatalogFailed(message) => {
                self.state.badge = StatusBadge::Error;
                self.state.user_line = format!("Load failed: {message}");
                self.toast.error("model catalog load failed");
            }
            AppMessage::IdentityMissing => {
                self.state.badge = StatusBadge::NoIdentity;
                self.state.user_line =
                    "No user identity — set GENBOX_TG_ID or [identity] tg_id".to_string();
            }
            AppMessage::UserLoaded(user) => {
                self.state.badge = StatusBadge::Ok;
                self.state.user = Some(user);
            }
            AppMessage::UserFailed(message) => {
                self.state.badge = StatusBadge::Error;
                self.state.user_line = format!("Load failed: {message}");
                self.toast.error("balance load failed");
            }
            AppMessage::ChatReply { message, text } => {
                self.state.chat_busy = false;
                self.push_chat_exchange(message, text);
            }
            AppMessage::ChatFailed { message, error } => {
                self.state.chat_busy = false;
                self.push_chat_exchange(message, format!("Error: {error}"));
                self.toast.error("chat request failed");
            }
            AppMessage::Job(kind, update) => self.handle_job_update(kind, update),
        }
    }

    fn push_chat_exchange(&mut self, message: String, reply: String) {
        self.state.chat_history.push(ChatExchange { message, reply });
        let excess = self.state.chat_history.len().saturating_sub(CHAT_HISTORY_MAX);
        if excess > 0 {
            self.state.chat_history.drain(..excess);
        }
    }

    fn handle_job_update(&mut self, kind: MediaKind, update: JobUpdate) {
        match update {
            JobUpdate::Queued { job_id } => {
                if let Some(slot) = self.state.job_mut(kind) {
                    *slot = JobPhase::Queued {
                        job_id,
                        submitted_at: chrono::Local::now(),
                    };
                }
            }
            JobUpdate::Waiting {
                elapsed_secs,
                status,
                url,
            } => {
                let job_id = self
                    .state
                    .job(kind)
                    .job_id()
                    .unwrap_or("?")
                    .to_string();
                if let Some(slot) = self.state.job_mut(kind) {
                    *slot = JobPhase::Waiting {
                        job_id,
                        elapsed_secs,
                        status,
                        url,
                    };
                }
            }
            JobUpdate::Done { url } => {
                if let Some(slot) = self.state.job_mut(kind) {
                    *slot = JobPhase::Done { url };
                }
                self.toast.success(format!("{} result ready", kind.label()));
            }
            JobUpdate::TimedOut => {
                if let Some(slot) = self.state.job_mut(kind) {
                    *slot = JobPhase::TimedOut;
                }
                self.toast.error(format!("{} job timed out", kind.label()));
            }
            JobUpdate::Failed { message } => {
                self.toast.error(format!("{} job failed", kind.label()));
                if let Some(slot) = self.state.job_mut(kind) {
                    *slot = JobPhase::Failed { message };
                }
            }
        }
    }

    // ── Key routing ───────────────────────────────────────────────────────────

    fn active_editing(&self) -> bool {
        match self.state.tab {
            Tab::Chat => self.chat_panel.editing(),
            Tab::Image => self.image_panel.editing(),
            Tab::Video => self.video_panel.editing(),
            Tab::Music => self.music_panel.editing(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return vec![Action::Quit];
        }

        // Global shortcuts, suspended while a text field is capturing input.
        if !self.active_editing() {
            match key.code {
                KeyCode::Char('q') => return vec![Action::Quit],
                KeyCode::Char(c @ '1'..='4') => {
                    if let Some(tab) = Tab::from_index(c as usize - '1' as usize) {
                        return vec![Action::SwitchTab(tab)];
                    }
                }
                KeyCode::Tab => return vec![Action::NextTab],
                KeyCode::BackTab => return vec![Action::PrevTab],
                _ => {}
            }
        }

        match self.state.tab {
            Tab::Chat => self.chat_panel.handle_key(key, &self.state),
            Tab::Image => self.image_panel.handle_key(key, &self.state),
            Tab::Video => self.video_panel.handle_key(key, &self.state),
            Tab::Music => self.music_panel.handle_key(key, &self.state),
        }
    }

    // ── Action dispatch ───────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::SwitchTab(tab) => {
                self.state.tab = tab;
                self.save_ui_session_state();
            }
            Action::NextTab => {
                self.state.tab = self.state.tab.next();
                self.save_ui_session_state();
            }
            Action::PrevTab => {
                self.state.tab = self.state.tab.prev();
                self.save_ui_session_state();
            }
            Action::CycleModel { kind, step } => {
                let len = self.state.models(kind).len() as i64;
                if len > 0 {
                    let cur = self.state.selected_index(kind) as i64;
                    let next = (cur + step).rem_euclid(len) as usize;
                    self.state.selected.insert(kind, next);
                    self.save_ui_session_state();
                }
            }
            Action::SubmitChat { model, message } => self.submit_chat(model, message),
            Action::Submit { kind, request } => self.submit_generation(kind, request),
            Action::CopyToClipboard(text) => self.copy_to_clipboard(text),
            Action::Quit => self.should_quit = true,
        }
    }

    fn submit_chat(&mut self, model: String, message: String) {
        if self.state.chat_busy {
            self.toast.info("chat request already in flight");
            return;
        }
        let Some(tx) = self.tx.clone() else {
            return;
        };
        self.state.chat_busy = true;
        let api = self.api.clone();
        tokio::spawn(async move {
            match api.chat(&model, &message).await {
                Ok(reply) => {
                    let text = reply
                        .text
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| "(no text)".to_string());
                    let _ = tx.send(AppMessage::ChatReply { message, text }).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(AppMessage::ChatFailed {
                            message,
                            error: e.to_string(),
                        })
                        .await;
                }
            }
        });
    }

    fn submit_generation(&mut self, kind: MediaKind, request: GenerationRequest) {
        let Some(job_tx) = self.job_tx.clone() else {
            return;
        };
        if self.registry.is_running(kind) {
            self.toast
                .info(format!("replacing the running {} job", kind.slug()));
        }
        if let Some(slot) = self.state.job_mut(kind) {
            *slot = JobPhase::Submitting;
        }
        let handle = spawn_generation(self.api.clone(), kind, request, self.settings, job_tx);
        self.registry.replace(kind, handle);
    }

    fn copy_to_clipboard(&mut self, text: String) {
        match arboard::Clipboard::new().and_then(|mut clip| clip.set_text(text)) {
            Ok(()) => self.toast.success("url copied"),
            Err(e) => self.toast.error(format!("clipboard: {e}")),
        }
    }

    // ── Render ────────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.draw(frame, rows[0], &self.state);
        status_bar::draw_separator(frame, rows[1]);

        match self.state.tab {
            Tab::Chat => self.chat_panel.draw(frame, rows[2], &self.state),
            Tab::Image => self.image_panel.draw(frame, rows[2], &self.state),
            Tab::Video => self.video_panel.draw(frame, rows[2], &self.state),
            Tab::Music => self.music_panel.draw(frame, rows[2], &self.state),
        }

        let mode = if self.active_editing() {
            InputMode::Edit
        } else {
            InputMode::Nav
        };
        status_bar::draw_keys_bar(frame, rows[3], mode, self.state.tab);

        self.toast.draw(frame, area);
    }

    // ── Session persistence ───────────────────────────────────────────────────

    fn restore_model_selection(&mut self) {
        let saved = [
            (MediaKind::Chat, self.saved_session.chat_model.clone()),
            (MediaKind::Image, self.saved_session.image_model.clone()),
            (MediaKind::Video, self.saved_session.video_model.clone()),
            (MediaKind::Music, self.saved_session.music_model.clone()),
        ];
        for (kind, model_id) in saved {
            let Some(model_id) = model_id else { continue };
            if let Some(pos) = self
                .state
                .models(kind)
                .iter()
                .position(|m| m.id == model_id)
            {
                self.state.selected.insert(kind, pos);
            }
        }
    }

    fn save_ui_session_state(&self) {
        let session = UiSessionState {
            tab: self.state.tab.kind().slug().to_string(),
            chat_model: self
                .state
                .selected_model(MediaKind::Chat)
                .map(|m| m.id.clone()),
            image_model: self
                .state
                .selected_model(MediaKind::Image)
                .map(|m| m.id.clone()),
            video_model: self
                .state
                .selected_model(MediaKind::Video)
                .map(|m| m.id.clone()),
            music_model: self
                .state
                .selected_model(MediaKind::Music)
                .map(|m| m.id.clone()),
        };
        if let Ok(json) = serde_json::to_string_pretty(&session) {
            let _ = std::fs::write(&self.ui_state_path, json);
        }
    }
}

fn load_ui_session_state(path: &PathBuf) -> UiSessionState {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

mod classifier;
mod config;
mod content_fetcher;
mod content_table;
mod errors;
mod grammar_session;
mod host;
mod log_util;
mod navigation;
mod pairing;
mod quiz;
mod rich_text;
mod tree_store;
mod ui_renderer;
mod view_managers;

use color_eyre::Result;
use config::{AppConfig, ConfigForm};
use content_fetcher::{ContentFetcher, FetchMessage};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use dotenvy::dotenv;
use grammar_session::GrammarSession;
use host::{CONFIG_SECTION, GRAMMAR_SECTION, TerminalSignals};
use log_util::log_debug;
use ratatui::{DefaultTerminal, Frame};
use std::{
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    time::Duration,
};
use ui_renderer::UiRenderer;
use view_managers::{ConfigManager, GrammarManager, MenuManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppView {
    Menu,
    Grammar,
    Config,
}

fn main() -> color_eyre::Result<()> {
    dotenv().ok();
    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = App::new().run(terminal);
    ratatui::restore();
    result
}

/// The terminal shell hosting the grammar section.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    pub(crate) running: bool,
    /// Current view being displayed.
    pub(crate) view: AppView,
    /// Currently selected index in the main menu.
    pub(crate) menu_index: usize,
    /// Aggregated errors from loading configuration and content.
    pub(crate) error: Option<String>,
    /// Navigation state of the grammar section.
    pub(crate) grammar: GrammarSession,
    /// Resolves catalog and table documents against the content root.
    fetcher: ContentFetcher,
    fetch_sender: Sender<FetchMessage>,
    fetch_receiver: Receiver<FetchMessage>,
    /// Bumped on every catalog request; only the latest response is applied.
    catalog_generation: u64,
    /// Holds the editable configuration state when rendering the config view.
    pub(crate) config_form: ConfigForm,
}

impl App {
    /// Construct a new instance of [`App`] and start fetching the catalog.
    pub fn new() -> Self {
        let mut aggregated_error: Option<String> = None;

        if let Err(err) = config::initialize() {
            Self::push_error(
                &mut aggregated_error,
                format!("Configuration load failed: {}", err),
            );
        }

        let mut app = Self::with_config(config::current(), aggregated_error);
        app.request_catalog();
        app
    }

    /// Build the shell for `current` without starting any fetch.
    fn with_config(current: AppConfig, error: Option<String>) -> Self {
        let fetcher = ContentFetcher::new(&config::content_root());
        log_debug(&format!("App: content root {:?}", fetcher.root()));
        let grammar = GrammarSession::new(
            current.root_label.clone(),
            current.shuffle_options,
            Box::new(TerminalSignals::new(current.warning_bell)),
        );
        let (fetch_sender, fetch_receiver) = mpsc::channel();

        Self {
            running: false,
            view: AppView::Menu,
            menu_index: 0,
            error,
            grammar,
            fetcher,
            fetch_sender,
            fetch_receiver,
            catalog_generation: 0,
            config_form: ConfigForm::from_config(current),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.running = true;
        let tick_rate = Duration::from_millis(120);
        while self.running {
            self.poll_fetch_messages();
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events(tick_rate)?;
        }
        Ok(())
    }

    /// Dispatch rendering based on the active view.
    fn render(&self, frame: &mut Frame) {
        UiRenderer::new(self).render(frame);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    fn handle_crossterm_events(&mut self, tick_rate: Duration) -> Result<()> {
        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(_) => {}
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
        self.start_pending_table_fetch();
        self.poll_fetch_messages();
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            _ => match self.view {
                AppView::Menu => MenuManager::new(self).handle_key(key),
                AppView::Grammar => GrammarManager::new(self).handle_key(key),
                AppView::Config => ConfigManager::new(self).handle_key(key),
            },
        }
    }

    /// Drain every finished background fetch.
    fn poll_fetch_messages(&mut self) {
        loop {
            match self.fetch_receiver.try_recv() {
                Ok(message) => self.handle_fetch_message(message),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log_debug("App: fetch channel disconnected");
                    break;
                }
            }
        }
    }

    fn handle_fetch_message(&mut self, message: FetchMessage) {
        match message {
            FetchMessage::Catalog { generation, .. } if generation != self.catalog_generation => {
                log_debug(&format!(
                    "App: dropped catalog response {} superseded by {}",
                    generation, self.catalog_generation
                ));
            }
            FetchMessage::Catalog {
                result: Ok(text), ..
            } => {
                if let Err(err) = self.grammar.catalog_loaded(&text) {
                    Self::push_error(&mut self.error, err.to_string());
                }
            }
            FetchMessage::Catalog {
                result: Err(reason),
                ..
            } => {
                Self::push_error(
                    &mut self.error,
                    format!("Failed to load grammar catalog: {}", reason),
                );
                self.grammar.catalog_failed(reason);
            }
            FetchMessage::Table { request, result } => {
                self.grammar.apply_table_result(&request, result);
            }
        }
    }

    /// Request the catalog from the content root. Each request is a single attempt.
    pub(crate) fn request_catalog(&mut self) {
        let catalog_file = config::current().catalog_file;
        self.catalog_generation += 1;
        log_debug(&format!(
            "App: requesting catalog {} (request {})",
            catalog_file, self.catalog_generation
        ));
        self.grammar.catalog_loading();
        content_fetcher::spawn_catalog_fetch(
            self.fetcher.clone(),
            catalog_file,
            self.catalog_generation,
            self.fetch_sender.clone(),
        );
    }

    fn start_pending_table_fetch(&mut self) {
        if let Some(request) = self.grammar.take_table_request() {
            log_debug(&format!("App: requesting table {}", request.file));
            content_fetcher::spawn_table_fetch(
                self.fetcher.clone(),
                request,
                self.fetch_sender.clone(),
            );
        }
    }

    /// Shell hook for opening a named section.
    pub(crate) fn open_section(&mut self, name: &str) {
        match name {
            GRAMMAR_SECTION => self.show_page(GRAMMAR_SECTION),
            CONFIG_SECTION => ConfigManager::new(self).show_config(),
            other => log_debug(&format!("App: unknown section {:?}", other)),
        }
    }

    /// Shell hook for switching pages. Entering the grammar page starts a fresh session at
    /// the root; other pages keep the plain switch.
    pub(crate) fn show_page(&mut self, id: &str) {
        match id {
            GRAMMAR_SECTION => self.view = AppView::Grammar,
            CONFIG_SECTION => self.view = AppView::Config,
            _ => self.view = AppView::Menu,
        }
        if id == GRAMMAR_SECTION {
            self.grammar.reset();
        }
        log_debug(&format!("App: showing page {:?}", id));
    }

    pub(crate) fn return_to_menu(&mut self) {
        if matches!(self.view, AppView::Config) {
            self.config_form = ConfigForm::from_config(config::current());
        }
        self.view = AppView::Menu;
    }

    /// Push saved settings into the running session, refetching when the source moved.
    pub(crate) fn apply_config(&mut self, previous: &AppConfig, updated: &AppConfig) {
        self.grammar.set_shuffle_options(updated.shuffle_options);
        self.grammar
            .set_signals(Box::new(TerminalSignals::new(updated.warning_bell)));
        if previous.content_root != updated.content_root
            || previous.catalog_file != updated.catalog_file
        {
            self.fetcher = ContentFetcher::new(&config::content_root());
            self.request_catalog();
        }
    }

    /// Set running to false to quit the application.
    pub(crate) fn quit(&mut self) {
        self.running = false;
    }

    /// Append a message to an optional error slot.
    pub(crate) fn push_error(slot: &mut Option<String>, message: String) {
        log_debug(&format!("App: {}", message));
        if let Some(existing) = slot {
            existing.push_str(" | ");
            existing.push_str(&message);
        } else {
            *slot = Some(message);
        }
    }
}

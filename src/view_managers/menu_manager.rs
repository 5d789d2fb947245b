use crate::{
    App,
    host::{CONFIG_SECTION, GRAMMAR_SECTION},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub(crate) const MENU_OPTIONS: [&str; 2] = ["1. Grammar", "2. Configure"];

pub(crate) struct MenuManager<'a> {
    app: &'a mut App,
}

impl<'a> MenuManager<'a> {
    pub(crate) fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q')) => self.app.quit(),
            (KeyModifiers::NONE, KeyCode::Down | KeyCode::Char('j')) => self.menu_next(),
            (KeyModifiers::NONE, KeyCode::Up | KeyCode::Char('k')) => self.menu_previous(),
            (KeyModifiers::NONE, KeyCode::Enter) => self.activate_menu_option(),
            (KeyModifiers::NONE, KeyCode::Char('1') | KeyCode::Char('g')) => {
                self.app.menu_index = 0;
                self.activate_menu_option();
            }
            (KeyModifiers::NONE, KeyCode::Char('2') | KeyCode::Char('c')) => {
                self.app.menu_index = 1;
                self.activate_menu_option();
            }
            _ => {}
        }
    }

    fn menu_next(&mut self) {
        self.app.menu_index = (self.app.menu_index + 1) % MENU_OPTIONS.len();
    }

    fn menu_previous(&mut self) {
        if self.app.menu_index == 0 {
            self.app.menu_index = MENU_OPTIONS.len() - 1;
        } else {
            self.app.menu_index -= 1;
        }
    }

    fn activate_menu_option(&mut self) {
        match self.app.menu_index {
            0 => self.app.open_section(GRAMMAR_SECTION),
            1 => self.app.open_section(CONFIG_SECTION),
            _ => {}
        }
    }
}

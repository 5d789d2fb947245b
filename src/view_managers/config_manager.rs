use crate::{
    App,
    config::{self, ConfigForm},
    host::CONFIG_SECTION,
    log_util::log_debug,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub(crate) struct ConfigManager<'a> {
    app: &'a mut App,
}

impl<'a> ConfigManager<'a> {
    pub(crate) fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    pub(crate) fn show_config(&mut self) {
        self.app.config_form = ConfigForm::from_config(config::current());
        self.app
            .config_form
            .set_status("Enter edits a path or flips a toggle, s saves changes.");
        self.app.show_page(CONFIG_SECTION);
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if self.app.config_form.is_editing() {
            self.handle_edit_key(key);
            return;
        }
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Down | KeyCode::Char('j')) => {
                self.app.config_form.select_next();
            }
            (KeyModifiers::NONE, KeyCode::Up | KeyCode::Char('k')) => {
                self.app.config_form.select_previous();
            }
            (KeyModifiers::NONE, KeyCode::Enter) => {
                if self.app.config_form.is_text_field_selected() {
                    self.app.config_form.start_editing();
                } else {
                    self.app.config_form.toggle_current();
                }
            }
            (
                KeyModifiers::NONE,
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('h'),
            )
            | (KeyModifiers::NONE, KeyCode::Char('l')) => self.app.config_form.toggle_current(),
            (KeyModifiers::NONE, KeyCode::Char('s')) => self.save_config_changes(),
            (KeyModifiers::NONE, KeyCode::Char('r')) => self.reset_config_form(),
            (_, KeyCode::Esc) | (KeyModifiers::NONE, KeyCode::Char('m')) => {
                self.app.return_to_menu()
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let form = &mut self.app.config_form;
        match (key.modifiers, key.code) {
            (_, KeyCode::Enter) => form.apply_edit(),
            (_, KeyCode::Esc) => form.cancel_edit(),
            (_, KeyCode::Backspace) => form.backspace(),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(ch)) => form.push_char(ch),
            _ => {}
        }
    }

    fn save_config_changes(&mut self) {
        if !self.app.config_form.dirty {
            self.app
                .config_form
                .set_status("No pending changes to save.");
            return;
        }

        let previous = config::current();
        let form = self.app.config_form.clone();
        match config::update(|config| form.apply_to(config)) {
            Ok(updated) => {
                self.app.apply_config(&previous, &updated);
                self.app.config_form.apply_saved(updated);
                self.app.config_form.set_status(format!(
                    "Saved configuration to {}",
                    config::config_file_path().display()
                ));
                log_debug("ConfigManager: configuration saved");
            }
            Err(err) => {
                App::push_error(
                    &mut self.app.error,
                    format!("Failed to save configuration: {}", err),
                );
                self.app
                    .config_form
                    .set_status("Failed to save configuration. Check error panel.");
            }
        }
    }

    fn reset_config_form(&mut self) {
        self.app.config_form = ConfigForm::from_config(config::current());
        self.app
            .config_form
            .set_status("Reverted to saved configuration values.");
    }
}

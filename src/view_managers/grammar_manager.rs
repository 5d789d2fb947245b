use crate::{
    App,
    grammar_session::{GrammarView, TableState},
    log_util::log_debug,
    quiz::AdvanceOutcome,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub(crate) struct GrammarManager<'a> {
    app: &'a mut App,
}

impl<'a> GrammarManager<'a> {
    pub(crate) fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if self.table_ready() && self.handle_filter_key(key) {
            return;
        }
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => self.go_back(),
            (KeyModifiers::NONE, KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h')) => {
                self.go_back()
            }
            (KeyModifiers::NONE, KeyCode::Down | KeyCode::Char('j')) => {
                self.app.grammar.move_cursor(1)
            }
            (KeyModifiers::NONE, KeyCode::Up | KeyCode::Char('k')) => {
                self.app.grammar.move_cursor(-1)
            }
            (KeyModifiers::NONE, KeyCode::Enter | KeyCode::Right | KeyCode::Char(' ')) => {
                self.app.grammar.activate()
            }
            (KeyModifiers::NONE, KeyCode::Char(digit @ '1'..='9')) => self.select_by_number(digit),
            (KeyModifiers::NONE, KeyCode::Char('n')) => self.advance_quiz(),
            (KeyModifiers::NONE, KeyCode::Char('p')) => {
                if self.app.grammar.open_practice_link() {
                    log_debug("GrammarManager: opened practice from text");
                }
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => self.app.request_catalog(),
            (KeyModifiers::NONE, KeyCode::Char('m')) => self.app.return_to_menu(),
            _ => {}
        }
    }

    /// Filter editing for a loaded table. Returns false when the key is not consumed.
    fn handle_filter_key(&mut self, key: KeyEvent) -> bool {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Backspace) => self.app.grammar.pop_filter_char(),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(ch)) => {
                self.app.grammar.push_filter_char(ch)
            }
            _ => false,
        }
    }

    fn table_ready(&self) -> bool {
        matches!(
            self.app.grammar.view(),
            GrammarView::Table {
                state: TableState::Ready(_),
                ..
            }
        )
    }

    /// Pop the grammar path, or fall back to the shell menu at the root.
    fn go_back(&mut self) {
        if !self.app.grammar.navigate_back() {
            self.app.return_to_menu();
        }
    }

    fn select_by_number(&mut self, digit: char) {
        let Some(position) = digit.to_digit(10) else {
            return;
        };
        if matches!(self.app.grammar.view(), GrammarView::Quiz { .. }) {
            self.app.grammar.select_answer(position as usize - 1);
        }
    }

    fn advance_quiz(&mut self) {
        match self.app.grammar.advance_quiz() {
            Some(Ok(AdvanceOutcome::Next(index))) => {
                log_debug(&format!("GrammarManager: quiz moved to question {}", index + 1));
            }
            Some(Ok(AdvanceOutcome::Finished)) => {
                if let GrammarView::Quiz { session, .. } = self.app.grammar.view() {
                    log_debug(&format!(
                        "GrammarManager: quiz finished with {} / {}",
                        session.score(),
                        session.len()
                    ));
                }
            }
            Some(Err(err)) => log_debug(&format!("GrammarManager: {}", err)),
            None => {}
        }
    }
}

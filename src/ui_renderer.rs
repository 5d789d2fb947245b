use crate::{
    App, AppView, config,
    content_table::{COLUMN_TITLES, ContentTable},
    grammar_session::{CHOOSER_OPTIONS, GrammarView, TableState},
    pairing::ListEntry,
    quiz::QuizSession,
    rich_text::TextBlock,
    view_managers::menu_manager::MENU_OPTIONS,
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

pub(crate) struct UiRenderer<'a> {
    app: &'a App,
}

impl<'a> UiRenderer<'a> {
    pub(crate) fn new(app: &'a App) -> Self {
        Self { app }
    }

    pub(crate) fn render(&self, frame: &mut Frame) {
        match self.app.view {
            AppView::Menu => self.render_menu(frame),
            AppView::Grammar => self.render_grammar(frame),
            AppView::Config => self.render_config(frame),
        }
    }

    fn shell_layout(area: Rect) -> [Rect; 3] {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(5),
            ])
            .split(area);
        [layout[0], layout[1], layout[2]]
    }

    fn render_menu(&self, frame: &mut Frame) {
        let [header, body, footer] = Self::shell_layout(frame.area());

        frame.render_widget(
            Paragraph::new(format!("Content: {}", config::content_root()))
                .block(Block::bordered().title(Line::from("Grammar Trail").bold().blue().centered()))
                .centered(),
            header,
        );

        let items: Vec<ListItem> = MENU_OPTIONS.iter().map(|label| ListItem::new(*label)).collect();
        let mut state = ListState::default();
        state.select(Some(self.app.menu_index));
        frame.render_stateful_widget(
            List::new(items)
                .block(Block::bordered().title(Line::from("Sections")))
                .highlight_symbol("▶ ")
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            body,
            &mut state,
        );

        let mut status_lines = self.error_lines();
        status_lines.push("Use ↑/↓ or j/k to choose. Press Enter to open.".into());
        status_lines.push("Press 1 or g for grammar, 2 or c to configure. q or Ctrl-C quits.".into());
        self.render_status(frame, footer, status_lines);
    }

    fn render_grammar(&self, frame: &mut Frame) {
        let grammar = &self.app.grammar;
        let [header, body, footer] = Self::shell_layout(frame.area());

        let breadcrumb = if grammar.path().is_empty() {
            "Pick a topic to start.".to_string()
        } else {
            grammar.path().keys().join(" › ")
        };
        frame.render_widget(
            Paragraph::new(breadcrumb)
                .block(Block::bordered().title(Line::from(grammar.title()).bold().blue().centered()))
                .centered(),
            header,
        );

        let mut hints: Vec<String> = Vec::new();
        match grammar.view() {
            GrammarView::Loading => {
                frame.render_widget(
                    Paragraph::new("Loading grammar topics…").block(Block::bordered()),
                    body,
                );
            }
            GrammarView::Unavailable(reason) => {
                frame.render_widget(
                    Paragraph::new(vec![
                        Line::from("Grammar content is unavailable.").red().bold(),
                        Line::from(reason.as_str()),
                    ])
                    .wrap(Wrap { trim: false })
                    .block(Block::bordered()),
                    body,
                );
                hints.push("Press r to request the catalog again.".into());
            }
            GrammarView::Missing => frame.render_widget(Block::bordered(), body),
            GrammarView::List { entries, selected } => {
                Self::render_topic_list(frame, body, entries, *selected);
                hints.push("Enter opens a topic. Backspace or Esc goes back.".into());
            }
            GrammarView::Chooser {
                theory, selected, ..
            } => {
                let items: Vec<ListItem> = CHOOSER_OPTIONS
                    .iter()
                    .map(|label| ListItem::new(*label))
                    .collect();
                let mut state = ListState::default();
                state.select(Some(*selected));
                frame.render_stateful_widget(
                    List::new(items)
                        .block(Block::bordered().title(Line::from(theory.as_str())))
                        .highlight_symbol("▶ ")
                        .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
                    body,
                    &mut state,
                );
                hints.push("Choose theory or practice, Enter to open.".into());
            }
            GrammarView::Text {
                blocks,
                practice_key,
            } => {
                Self::render_text(frame, body, blocks, practice_key.as_deref());
                if practice_key.is_some() {
                    hints.push("Press p to practice this topic.".into());
                }
            }
            GrammarView::Quiz {
                session,
                instructions,
                cursor,
            } => {
                if session.is_finished() {
                    Self::render_quiz_review(frame, body, session);
                } else {
                    Self::render_quiz_question(frame, body, session, instructions, *cursor);
                    hints.push("Enter or 1-9 selects an answer, n continues.".into());
                }
            }
            GrammarView::Table { title, state, .. } => {
                Self::render_table(frame, body, title, state);
                if matches!(state, TableState::Ready(_)) {
                    hints.push("Type to filter, Backspace deletes, Esc goes back.".into());
                }
            }
        }

        let mut status_lines = self.error_lines();
        if let Some(notice) = grammar.notice() {
            status_lines.push(notice.to_string());
        }
        status_lines.extend(hints);
        status_lines.push("Press m for the menu, Ctrl-C to quit.".into());
        self.render_status(frame, footer, status_lines);
    }

    fn render_topic_list(frame: &mut Frame, area: Rect, entries: &[ListEntry], selected: usize) {
        if entries.is_empty() {
            frame.render_widget(
                Paragraph::new("No topics here yet.").block(Block::bordered()),
                area,
            );
            return;
        }
        let items: Vec<ListItem> = entries
            .iter()
            .map(|entry| {
                if entry.paired {
                    ListItem::new(format!("{}  · theory + practice", entry.key))
                } else {
                    ListItem::new(entry.key.as_str())
                }
            })
            .collect();
        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_stateful_widget(
            List::new(items)
                .block(Block::bordered().title(Line::from("Topics")))
                .highlight_symbol("▶ ")
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            area,
            &mut state,
        );
    }

    fn render_text(frame: &mut Frame, area: Rect, blocks: &[TextBlock], practice_key: Option<&str>) {
        let mut lines: Vec<Line> = Vec::new();
        for block in blocks {
            match block {
                TextBlock::Paragraph(text) => lines.push(Line::from(text.as_str())),
                TextBlock::Bullets(items) => {
                    lines.extend(items.iter().map(|item| Line::from(format!("  • {}", item))));
                }
                TextBlock::Spacer => lines.push(Line::default()),
            }
        }

        let Some(practice_key) = practice_key else {
            frame.render_widget(
                Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .block(Block::bordered()),
                area,
            );
            return;
        };

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(area);
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::bordered()),
            sections[0],
        );
        frame.render_widget(
            Paragraph::new(Line::from(format!("▶ {} (press p)", practice_key)).green())
                .block(Block::bordered().title(Line::from("Practice"))),
            sections[1],
        );
    }

    fn render_quiz_question(
        frame: &mut Frame,
        area: Rect,
        session: &QuizSession,
        instructions: &str,
        cursor: usize,
    ) {
        let (Some(index), Some(question)) = (session.current_index(), session.current_question())
        else {
            return;
        };
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(3)])
            .split(area);

        let action = if session.is_last_question() {
            "Finish"
        } else {
            "Next"
        };
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(instructions).italic(),
                Line::from(question.text.as_str()).bold(),
                Line::from(format!("[n] {}", action)).dim(),
            ])
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(Line::from(format!(
                "Question {} of {}",
                index + 1,
                session.len()
            )))),
            sections[0],
        );

        let selection = session.current_selection();
        let items: Vec<ListItem> = question
            .options
            .iter()
            .map(|option| {
                let marker = if selection == Some(option.as_str()) {
                    "(●)"
                } else {
                    "( )"
                };
                ListItem::new(format!("{} {}", marker, option))
            })
            .collect();
        let mut state = ListState::default();
        if !question.options.is_empty() {
            state.select(Some(cursor.min(question.options.len() - 1)));
        }
        frame.render_stateful_widget(
            List::new(items)
                .block(Block::bordered().title(Line::from("Options")))
                .highlight_symbol("▶ ")
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            sections[1],
            &mut state,
        );
    }

    fn render_quiz_review(frame: &mut Frame, area: Rect, session: &QuizSession) {
        let mut lines = vec![
            Line::from(format!("Score: {} / {}", session.score(), session.len())).bold(),
            Line::default(),
        ];
        for (index, row) in session.review().into_iter().enumerate() {
            let verdict = if row.is_correct { "✓" } else { "✗" };
            let heading = Line::from(format!("{} {}. {}", verdict, index + 1, row.prompt));
            lines.push(if row.is_correct {
                heading.green()
            } else {
                heading.red()
            });
            lines.push(Line::from(format!("   Your answer: {}", row.chosen_label())));
            lines.push(Line::from(format!("   Correct answer: {}", row.correct_option)));
            if let Some(explanation) = &row.explanation {
                lines.push(Line::from(format!("   {}", explanation)).italic());
            }
            lines.push(Line::default());
        }
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(Line::from("Results"))),
            area,
        );
    }

    fn render_table(frame: &mut Frame, area: Rect, title: &str, state: &TableState) {
        let block = Block::bordered().title(Line::from(title));
        let table = match state {
            TableState::Loading => {
                frame.render_widget(Paragraph::new("Loading table…").block(block), area);
                return;
            }
            TableState::Failed(err) => {
                frame.render_widget(
                    Paragraph::new(Line::from(err.to_string()).red())
                        .wrap(Wrap { trim: false })
                        .block(block),
                    area,
                );
                return;
            }
            TableState::Ready(table) => table,
        };

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);
        frame.render_widget(
            Paragraph::new(format!("Filter: {}▏", table.filter())).block(
                Block::bordered().title(Line::from(format!(
                    "Showing {} of {}",
                    table.visible_rows().len(),
                    table.total()
                ))),
            ),
            sections[0],
        );
        frame.render_widget(Self::forms_table(table).block(block), sections[1]);
    }

    fn forms_table(table: &ContentTable) -> Table<'_> {
        let columns = if table.has_translations() { 4 } else { 3 };
        let header = Row::new(COLUMN_TITLES[..columns].iter().map(|title| Cell::from(*title)))
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = table.visible_rows().into_iter().map(|record| {
            let mut cells = vec![
                Cell::from(record.base.as_str()),
                Cell::from(record.past.as_str()),
                Cell::from(record.participle.as_str()),
            ];
            if columns == 4 {
                cells.push(Cell::from(record.translation.as_deref().unwrap_or("")));
            }
            Row::new(cells)
        });
        let widths = vec![Constraint::Ratio(1, columns as u32); columns];
        Table::new(rows, widths).header(header)
    }

    fn render_config(&self, frame: &mut Frame) {
        let form = &self.app.config_form;
        let [header, body, footer] = Self::shell_layout(frame.area());

        frame.render_widget(
            Paragraph::new(format!("Config file: {}", config::config_file_path().display()))
                .block(Block::bordered().title(Line::from("Settings").bold().blue().centered()))
                .centered(),
            header,
        );

        let text_value = |index: usize, value: &str| {
            if form.is_editing() && form.selected_index() == index {
                format!("{}▏ (editing)", form.edit_buffer())
            } else {
                value.to_string()
            }
        };
        let toggle = |value: bool| if value { "On" } else { "Off" };
        let items = vec![
            ListItem::new(format!("Content root: {}", text_value(0, &form.content_root))),
            ListItem::new(format!("Catalog file: {}", text_value(1, &form.catalog_file))),
            ListItem::new(format!("Shuffle quiz options: {}", toggle(form.shuffle_options))),
            ListItem::new(format!("Bell on warnings: {}", toggle(form.warning_bell))),
        ];
        let mut state = ListState::default();
        state.select(Some(form.selected_index()));
        frame.render_stateful_widget(
            List::new(items)
                .block(Block::bordered().title(Line::from("Grammar content")))
                .highlight_symbol("▶ ")
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            body,
            &mut state,
        );

        let mut status_lines = self.error_lines();
        status_lines.push("↑/↓ or j/k choose a field. Enter edits paths or flips toggles.".into());
        status_lines.push("Press s to save, r to revert, m or Esc for the menu.".into());
        if form.dirty {
            status_lines.push("Unsaved changes".into());
        }
        if let Some(status) = &form.status {
            status_lines.push(status.clone());
        }
        self.render_status(frame, footer, status_lines);
    }

    fn error_lines(&self) -> Vec<String> {
        self.app
            .error
            .iter()
            .map(|error| format!("Error: {}", error))
            .collect()
    }

    fn render_status(&self, frame: &mut Frame, area: Rect, lines: Vec<String>) {
        frame.render_widget(
            Paragraph::new(lines.join("\n"))
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(Line::from("Status"))),
            area,
        );
    }
}

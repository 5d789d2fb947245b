use crate::{
    classifier::{Leaf, NodeKind, classify},
    content_fetcher::TableRequest,
    content_table::ContentTable,
    errors::GrammarError,
    host::HostSignals,
    log_util::log_debug,
    navigation::NavigationPath,
    pairing::{self, ListEntry},
    quiz::{AdvanceOutcome, QuizSession},
    rich_text::{self, TextBlock},
    tree_store::TopicTree,
};

pub const CHOOSER_OPTIONS: [&str; 2] = ["Theory", "Practice"];
pub const DEFAULT_INSTRUCTIONS: &str = "Choose the correct option";
pub const SELECTION_REQUIRED_NOTICE: &str = "Choose an answer before continuing.";

#[derive(Debug)]
enum CatalogState {
    Loading,
    Ready(TopicTree),
    Unavailable(String),
}

/// What the grammar region currently shows. Rebuilt from the path on every navigation change.
#[derive(Debug, Clone)]
pub enum GrammarView {
    Loading,
    Unavailable(String),
    /// The path no longer resolves; nothing is rendered.
    Missing,
    List {
        entries: Vec<ListEntry>,
        selected: usize,
    },
    /// Theory/practice chooser shown after opening a paired card.
    Chooser {
        theory: String,
        practice: String,
        selected: usize,
    },
    Text {
        blocks: Vec<TextBlock>,
        practice_key: Option<String>,
    },
    Quiz {
        session: QuizSession,
        instructions: String,
        cursor: usize,
    },
    Table {
        file: String,
        title: String,
        state: TableState,
    },
}

#[derive(Debug, Clone)]
pub enum TableState {
    Loading,
    Ready(ContentTable),
    Failed(GrammarError),
}

/// One navigation session over the topic tree: the tree, the path into it and the view
/// derived from both. Reset when the grammar section is entered.
#[derive(Debug)]
pub struct GrammarSession {
    catalog: CatalogState,
    path: NavigationPath,
    view: GrammarView,
    root_label: String,
    shuffle_options: bool,
    signals: Box<dyn HostSignals>,
    pending_table: Option<TableRequest>,
    notice: Option<String>,
}

impl GrammarSession {
    pub fn new(
        root_label: impl Into<String>,
        shuffle_options: bool,
        signals: Box<dyn HostSignals>,
    ) -> Self {
        Self {
            catalog: CatalogState::Loading,
            path: NavigationPath::new(),
            view: GrammarView::Loading,
            root_label: root_label.into(),
            shuffle_options,
            signals,
            pending_table: None,
            notice: None,
        }
    }

    pub fn view(&self) -> &GrammarView {
        &self.view
    }

    pub fn path(&self) -> &NavigationPath {
        &self.path
    }

    pub fn title(&self) -> &str {
        self.path.title(&self.root_label)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_shuffle_options(&mut self, shuffle: bool) {
        self.shuffle_options = shuffle;
    }

    pub fn set_signals(&mut self, signals: Box<dyn HostSignals>) {
        self.signals = signals;
    }

    pub fn catalog_loading(&mut self) {
        self.catalog = CatalogState::Loading;
        self.refresh();
    }

    /// Install the fetched catalog text. A parse failure leaves the section unavailable.
    pub fn catalog_loaded(&mut self, text: &str) -> Result<(), GrammarError> {
        match TopicTree::parse(text) {
            Ok(tree) => {
                log_debug("GrammarSession: catalog loaded");
                self.catalog = CatalogState::Ready(tree);
                self.path.reset();
                self.refresh();
                Ok(())
            }
            Err(err) => {
                self.catalog_failed(err.to_string());
                Err(err)
            }
        }
    }

    pub fn catalog_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log_debug(&format!("GrammarSession: catalog unavailable: {}", reason));
        self.catalog = CatalogState::Unavailable(reason);
        self.refresh();
    }

    pub fn reset(&mut self) {
        self.path.reset();
        log_debug("GrammarSession: reset to root");
        self.refresh();
    }

    /// Push `key` if it is a child of the current category.
    pub fn descend(&mut self, key: &str) -> bool {
        if !self.current_category_has(key) {
            log_debug(&format!("GrammarSession: refused to descend into {:?}", key));
            return false;
        }
        self.path.descend(key);
        log_debug(&format!("GrammarSession: descended to {:?}", self.path.keys()));
        self.refresh();
        true
    }

    pub fn back(&mut self) -> bool {
        if !self.path.back() {
            return false;
        }
        log_debug(&format!("GrammarSession: back to {:?}", self.path.keys()));
        self.refresh();
        true
    }

    pub fn replace_last(&mut self, key: &str) -> bool {
        if !self.path.replace_last(key) {
            return false;
        }
        log_debug(&format!("GrammarSession: swapped to {:?}", self.path.keys()));
        self.refresh();
        true
    }

    /// Back hook for the host: true when the path was popped, false when the host should
    /// apply its own back behavior.
    pub fn navigate_back(&mut self) -> bool {
        self.back()
    }

    /// Move the cursor of the list, chooser or quiz options.
    pub fn move_cursor(&mut self, delta: isize) {
        let (cursor, len) = match &mut self.view {
            GrammarView::List { entries, selected } => (selected, entries.len()),
            GrammarView::Chooser { selected, .. } => (selected, CHOOSER_OPTIONS.len()),
            GrammarView::Quiz {
                session, cursor, ..
            } => {
                let len = session
                    .current_question()
                    .map(|question| question.options.len())
                    .unwrap_or(0);
                (cursor, len)
            }
            _ => return,
        };
        if len == 0 {
            *cursor = 0;
            return;
        }
        *cursor = (*cursor as isize + delta).rem_euclid(len as isize) as usize;
    }

    /// Enter on the current view: open a card, pick a chooser option or select an answer.
    pub fn activate(&mut self) {
        match &self.view {
            GrammarView::List { entries, selected } => {
                if let Some(entry) = entries.get(*selected).cloned() {
                    self.open_entry(&entry);
                }
            }
            GrammarView::Chooser { selected, .. } => {
                let selected = *selected;
                self.choose(selected);
            }
            GrammarView::Quiz { cursor, .. } => {
                let cursor = *cursor;
                self.select_answer(cursor);
            }
            _ => {}
        }
    }

    /// Open a list card. Paired cards push the theory key and show the chooser.
    pub fn open_entry(&mut self, entry: &ListEntry) {
        if !entry.paired {
            self.descend(&entry.key);
            return;
        }
        if !self.current_category_has(&entry.key) {
            return;
        }
        self.path.descend(entry.key.as_str());
        self.notice = None;
        self.view = GrammarView::Chooser {
            theory: entry.key.clone(),
            practice: pairing::practice_key(&entry.key),
            selected: 0,
        };
        log_debug(&format!("GrammarSession: chooser for {:?}", entry.key));
    }

    /// Chooser pick: 0 shows the pushed theory node, 1 swaps to its practice.
    pub fn choose(&mut self, option: usize) {
        let GrammarView::Chooser { practice, .. } = &self.view else {
            return;
        };
        match option {
            0 => self.refresh(),
            1 => {
                let practice = practice.clone();
                self.replace_last(&practice);
            }
            _ => {}
        }
    }

    /// Follow the practice call-to-action of a text leaf.
    pub fn open_practice_link(&mut self) -> bool {
        let GrammarView::Text {
            practice_key: Some(key),
            ..
        } = &self.view
        else {
            return false;
        };
        let key = key.clone();
        self.replace_last(&key)
    }

    pub fn select_answer(&mut self, option_index: usize) {
        if let GrammarView::Quiz {
            session, cursor, ..
        } = &mut self.view
        {
            if session.select(option_index) {
                *cursor = option_index;
                self.notice = None;
            }
        }
    }

    /// Advance the quiz. A missing selection raises the host warning and keeps the question.
    pub fn advance_quiz(&mut self) -> Option<Result<AdvanceOutcome, GrammarError>> {
        let GrammarView::Quiz {
            session, cursor, ..
        } = &mut self.view
        else {
            return None;
        };
        if session.is_finished() {
            return None;
        }
        let outcome = session.advance();
        match &outcome {
            Ok(AdvanceOutcome::Next(_)) => {
                *cursor = 0;
                self.notice = None;
            }
            Ok(AdvanceOutcome::Finished) => self.notice = None,
            Err(_) => {
                self.notice = Some(SELECTION_REQUIRED_NOTICE.to_string());
                self.signals.warning_feedback();
            }
        }
        Some(outcome)
    }

    pub fn push_filter_char(&mut self, ch: char) -> bool {
        match self.ready_table_mut() {
            Some(table) => {
                table.push_filter_char(ch);
                true
            }
            None => false,
        }
    }

    pub fn pop_filter_char(&mut self) -> bool {
        self.ready_table_mut()
            .is_some_and(|table| table.pop_filter_char())
    }

    /// Table fetch requested by the last render, to be started by the caller.
    pub fn take_table_request(&mut self) -> Option<TableRequest> {
        self.pending_table.take()
    }

    /// Install a finished table fetch. Responses for a path the user already left are dropped.
    pub fn apply_table_result(
        &mut self,
        request: &TableRequest,
        result: Result<String, String>,
    ) -> bool {
        if request.path.as_slice() != self.path.keys() {
            log_debug(&format!(
                "GrammarSession: dropped stale table response for {:?}",
                request.path
            ));
            return false;
        }
        let GrammarView::Table { file, state, .. } = &mut self.view else {
            return false;
        };
        if *file != request.file {
            return false;
        }
        let loaded = match result {
            Ok(text) => ContentTable::parse(file, &text),
            Err(reason) => Err(GrammarError::ContentTableLoad {
                path: file.clone(),
                reason,
            }),
        };
        *state = match loaded {
            Ok(table) => TableState::Ready(table),
            Err(err) => {
                log_debug(&format!("GrammarSession: {}", err));
                TableState::Failed(err)
            }
        };
        true
    }

    fn ready_table_mut(&mut self) -> Option<&mut ContentTable> {
        match &mut self.view {
            GrammarView::Table {
                state: TableState::Ready(table),
                ..
            } => Some(table),
            _ => None,
        }
    }

    fn current_category_has(&self, key: &str) -> bool {
        let CatalogState::Ready(tree) = &self.catalog else {
            return false;
        };
        tree.resolve(self.path.keys())
            .map(classify)
            .is_some_and(|kind| match kind {
                NodeKind::Category(map) => map.contains_key(key),
                NodeKind::Leaf(_) => false,
            })
    }

    /// Rebuild the view for the current path.
    fn refresh(&mut self) {
        self.notice = None;
        self.pending_table = None;
        let (view, table_request, is_leaf) = self.build_view();
        self.view = view;
        self.pending_table = table_request;
        if is_leaf {
            self.signals.hide_main_button();
        }
    }

    fn build_view(&self) -> (GrammarView, Option<TableRequest>, bool) {
        let tree = match &self.catalog {
            CatalogState::Loading => return (GrammarView::Loading, None, false),
            CatalogState::Unavailable(reason) => {
                return (GrammarView::Unavailable(reason.clone()), None, false);
            }
            CatalogState::Ready(tree) => tree,
        };

        let Some(node) = tree.resolve(self.path.keys()) else {
            log_debug(&format!(
                "GrammarSession: path {:?} no longer resolves",
                self.path.keys()
            ));
            return (GrammarView::Missing, None, false);
        };

        match classify(node) {
            NodeKind::Category(map) => (
                GrammarView::List {
                    entries: pairing::list_entries(map),
                    selected: 0,
                },
                None,
                false,
            ),
            NodeKind::Leaf(Leaf::Text { content }) => {
                let practice_key = self.path.last().and_then(|current| {
                    tree.resolve(self.path.parent())
                        .and_then(|parent| parent.as_object())
                        .and_then(|parent| pairing::practice_link(parent, current))
                });
                (
                    GrammarView::Text {
                        blocks: rich_text::segment(&content),
                        practice_key,
                    },
                    None,
                    true,
                )
            }
            NodeKind::Leaf(Leaf::Quiz(quiz)) => {
                let session = if self.shuffle_options {
                    QuizSession::shuffled(quiz.questions)
                } else {
                    QuizSession::new(quiz.questions)
                };
                (
                    GrammarView::Quiz {
                        session,
                        instructions: quiz
                            .instructions
                            .unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string()),
                        cursor: 0,
                    },
                    None,
                    true,
                )
            }
            NodeKind::Leaf(Leaf::File(file_leaf)) => {
                let title = file_leaf
                    .title
                    .unwrap_or_else(|| self.title().to_string());
                let request = TableRequest {
                    path: self.path.keys().to_vec(),
                    file: file_leaf.path.clone(),
                };
                (
                    GrammarView::Table {
                        file: file_leaf.path,
                        title,
                        state: TableState::Loading,
                    },
                    Some(request),
                    true,
                )
            }
        }
    }
}

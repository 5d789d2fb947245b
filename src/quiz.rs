use crate::{errors::GrammarError, log_util::log_debug};
use rand::{rng, seq::SliceRandom};
use serde_json::Value;
use std::collections::BTreeMap;

/// Marker shown in the review for a question without an answer.
pub const NO_ANSWER_MARKER: &str = "—";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Question {
    pub text: String,
    /// Options are authored with a letter label, e.g. `"B) went"`.
    pub options: Vec<String>,
    /// A bare letter, a letter-prefixed option, or any other value compared by its text.
    pub correct_answer: Value,
    pub explanation: Option<String>,
}

impl Question {
    pub fn correct_letter(&self) -> String {
        answer_letter(&self.correct_answer)
    }

    /// Full text of the option matching the correct answer, or the raw answer when none does.
    pub fn correct_option_text(&self) -> String {
        let correct = self.correct_letter();
        self.options
            .iter()
            .find(|option| normalize_letter(option) == correct)
            .cloned()
            .unwrap_or_else(|| match &self.correct_answer {
                Value::String(text) => text.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
    }

    pub fn is_correct(&self, chosen_option: &str) -> bool {
        normalize_letter(chosen_option) == self.correct_letter()
    }
}

/// Reduce an option or answer string to its canonical letter.
///
/// Leading whitespace is ignored. A Latin or Cyrillic letter followed by `.` or `)` yields
/// that letter; otherwise the first character is used as is. The result is uppercased, so
/// `"b) went"`, `" B"` and `"B"` agree.
pub fn normalize_letter(text: &str) -> String {
    let text = text.trim_start();
    let mut label = text.chars();
    if let (Some(letter), Some('.' | ')')) = (label.next(), label.next()) {
        if is_label_letter(letter) {
            return letter.to_uppercase().collect();
        }
    }
    text.chars()
        .next()
        .map(|first| first.to_uppercase().collect())
        .unwrap_or_default()
}

/// Letter for a `correct_answer` value. Non-strings are stringified and uppercased whole.
pub fn answer_letter(value: &Value) -> String {
    match value {
        Value::String(text) => normalize_letter(text),
        Value::Null => String::new(),
        other => other.to_string().to_uppercase(),
    }
}

fn is_label_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || (matches!(ch, '\u{0400}'..='\u{04FF}') && ch.is_alphabetic())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    Presenting(usize),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Next(usize),
    Finished,
}

/// One row of the post-quiz review.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub prompt: String,
    pub chosen: Option<String>,
    pub correct_option: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

impl ReviewRow {
    pub fn chosen_label(&self) -> &str {
        self.chosen.as_deref().unwrap_or(NO_ANSWER_MARKER)
    }
}

/// A single pass through a quiz leaf. Created fresh on every entry, never resumed.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    state: QuizState,
    answers: BTreeMap<usize, String>,
    score: usize,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        let state = if questions.is_empty() {
            QuizState::Finished
        } else {
            QuizState::Presenting(0)
        };
        Self {
            questions,
            state,
            answers: BTreeMap::new(),
            score: 0,
        }
    }

    /// Start a session with each question's options shuffled.
    pub fn shuffled(mut questions: Vec<Question>) -> Self {
        let mut rng = rng();
        for question in &mut questions {
            question.options.shuffle(&mut rng);
        }
        Self::new(questions)
    }

    #[cfg(test)]
    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == QuizState::Finished
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            QuizState::Presenting(index) => Some(index),
            QuizState::Finished => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index()
            .and_then(|index| self.questions.get(index))
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index()
            .is_some_and(|index| index + 1 == self.questions.len())
    }

    /// The option chosen for the current question, if any.
    pub fn current_selection(&self) -> Option<&str> {
        self.current_index()
            .and_then(|index| self.answers.get(&index))
            .map(String::as_str)
    }

    /// Record `option_index` of the current question as the answer, replacing any earlier
    /// choice. Returns false when finished or the index is out of range.
    pub fn select(&mut self, option_index: usize) -> bool {
        let Some(index) = self.current_index() else {
            return false;
        };
        let Some(option) = self.questions[index].options.get(option_index) else {
            return false;
        };
        self.answers.insert(index, option.clone());
        log_debug(&format!(
            "QuizSession: question {} selected {:?}",
            index + 1,
            option
        ));
        true
    }

    /// Score the current question and move on. Rejected without a selection.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, GrammarError> {
        let Some(index) = self.current_index() else {
            return Ok(AdvanceOutcome::Finished);
        };
        let Some(chosen) = self.answers.get(&index) else {
            log_debug(&format!(
                "QuizSession: advance rejected, question {} unanswered",
                index + 1
            ));
            return Err(GrammarError::QuizIncompleteSelection { question: index });
        };

        if self.questions[index].is_correct(chosen) {
            self.score += 1;
        }

        if index + 1 < self.questions.len() {
            self.state = QuizState::Presenting(index + 1);
            Ok(AdvanceOutcome::Next(index + 1))
        } else {
            self.state = QuizState::Finished;
            log_debug(&format!(
                "QuizSession: finished with {} / {}",
                self.score,
                self.questions.len()
            ));
            Ok(AdvanceOutcome::Finished)
        }
    }

    pub fn review(&self) -> Vec<ReviewRow> {
        self.questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let chosen = self.answers.get(&index).cloned();
                let is_correct = chosen
                    .as_deref()
                    .is_some_and(|option| question.is_correct(option));
                ReviewRow {
                    prompt: question.text.clone(),
                    chosen,
                    correct_option: question.correct_option_text(),
                    is_correct,
                    explanation: question.explanation.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(text: &str, options: &[&str], correct: Value) -> Question {
        Question {
            text: text.to_string(),
            options: options.iter().map(|option| option.to_string()).collect(),
            correct_answer: correct,
            explanation: None,
        }
    }

    fn two_question_quiz() -> Vec<Question> {
        vec![
            question("Q1", &["A) yes", "B) no"], json!("A")),
            question("Q2", &["A) no", "B) yes"], json!("B")),
        ]
    }

    #[test]
    fn normalizes_letter_prefixes() {
        assert_eq!(normalize_letter("B) went"), "B");
        assert_eq!(normalize_letter("b) went"), "B");
        assert_eq!(normalize_letter("c. gone"), "C");
        assert_eq!(normalize_letter("  D) go"), "D");
    }

    #[test]
    fn normalization_is_idempotent_on_bare_letters() {
        for letter in ["A", "b", "Ж", "z"] {
            let once = normalize_letter(letter);
            assert_eq!(normalize_letter(&once), once);
        }
        assert_eq!(normalize_letter("b) went"), normalize_letter("B"));
    }

    #[test]
    fn normalizes_cyrillic_labels() {
        assert_eq!(normalize_letter("б) пошёл"), "Б");
        assert_eq!(normalize_letter("А. да"), "А");
    }

    #[test]
    fn falls_back_to_first_character() {
        assert_eq!(normalize_letter("went"), "W");
        assert_eq!(normalize_letter("1) one"), "1");
        assert_eq!(normalize_letter(""), "");
    }

    #[test]
    fn indented_answers_match_their_option() {
        assert_eq!(normalize_letter("  b"), "B");
        assert_eq!(answer_letter(&json!(" B")), "B");
        assert_eq!(normalize_letter("   "), "");
        let indented = question("She ___ home.", &["A) go", "B) went"], json!(" B"));
        assert!(indented.is_correct("B) went"));
        assert_eq!(indented.correct_option_text(), "B) went");
    }

    #[test]
    fn answer_letter_handles_full_option_text_and_non_strings() {
        assert_eq!(answer_letter(&json!("B) went")), "B");
        assert_eq!(answer_letter(&json!("b")), "B");
        assert_eq!(answer_letter(&json!(2)), "2");
        assert_eq!(answer_letter(&json!(true)), "TRUE");
        assert_eq!(answer_letter(&Value::Null), "");
    }

    #[test]
    fn full_marks_when_every_answer_is_correct() {
        let mut session = QuizSession::new(two_question_quiz());
        assert!(session.select(0));
        assert_eq!(session.advance(), Ok(AdvanceOutcome::Next(1)));
        assert!(session.select(1));
        assert_eq!(session.advance(), Ok(AdvanceOutcome::Finished));
        assert_eq!(session.score(), 2);
        assert!(session.review().iter().all(|row| row.is_correct));
    }

    #[test]
    fn advance_without_selection_keeps_the_index() {
        let mut session = QuizSession::new(two_question_quiz());
        for _ in 0..3 {
            assert_eq!(
                session.advance(),
                Err(GrammarError::QuizIncompleteSelection { question: 0 })
            );
            assert_eq!(session.state(), QuizState::Presenting(0));
        }
        session.select(0);
        session.advance().unwrap();
        assert_eq!(
            session.advance(),
            Err(GrammarError::QuizIncompleteSelection { question: 1 })
        );
        assert_eq!(session.current_index(), Some(1));
    }

    #[test]
    fn reselecting_replaces_the_previous_choice() {
        let mut session = QuizSession::new(two_question_quiz());
        session.select(1);
        session.select(0);
        assert_eq!(session.current_selection(), Some("A) yes"));
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn select_out_of_range_is_ignored() {
        let mut session = QuizSession::new(two_question_quiz());
        assert!(!session.select(5));
        assert_eq!(session.current_selection(), None);
    }

    #[test]
    fn two_question_walkthrough_scores_one_of_two() {
        let mut session = QuizSession::new(two_question_quiz());
        session.select(0);
        session.advance().unwrap();
        session.select(0);
        assert_eq!(session.advance(), Ok(AdvanceOutcome::Finished));

        assert_eq!(session.score(), 1);
        assert_eq!(session.len(), 2);
        let review = session.review();
        assert!(review[0].is_correct);
        assert!(!review[1].is_correct);
        assert_eq!(review[1].chosen_label(), "A) no");
        assert_eq!(review[1].correct_option, "B) yes");
    }

    #[test]
    fn full_option_text_answers_match_letters() {
        let questions = vec![question("Q", &["a) go", "b) went"], json!("B) went"))];
        let mut session = QuizSession::new(questions);
        session.select(1);
        session.advance().unwrap();
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn finished_session_ignores_further_input() {
        let mut session = QuizSession::new(vec![question("Q", &["A) x"], json!("A"))]);
        session.select(0);
        session.advance().unwrap();
        assert!(!session.select(0));
        assert_eq!(session.advance(), Ok(AdvanceOutcome::Finished));
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn empty_quiz_starts_finished() {
        let session = QuizSession::new(Vec::new());
        assert!(session.is_finished());
        assert_eq!(session.score(), 0);
        assert!(session.review().is_empty());
    }

    #[test]
    fn review_marks_missing_answers_and_falls_back_to_raw_answer() {
        let session = QuizSession::new(vec![question("Q", &["went", "gone"], json!("X"))]);
        let review = session.review();
        assert_eq!(review[0].chosen_label(), NO_ANSWER_MARKER);
        assert_eq!(review[0].correct_option, "X");
        assert!(!review[0].is_correct);
    }

    #[test]
    fn shuffled_session_still_scores_by_letter() {
        let mut session = QuizSession::shuffled(two_question_quiz());
        let first = session.current_question().unwrap().clone();
        let yes = first.options.iter().position(|o| o == "A) yes").unwrap();
        session.select(yes);
        session.advance().unwrap();
        let second = session.current_question().unwrap().clone();
        let yes = second.options.iter().position(|o| o == "B) yes").unwrap();
        session.select(yes);
        session.advance().unwrap();
        assert_eq!(session.score(), 2);
    }
}

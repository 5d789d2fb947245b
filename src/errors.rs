use thiserror::Error;

/// Failures surfaced by the grammar section. None of them escape the grammar view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The topic tree could not be fetched or parsed, even after the repair pass.
    #[error("catalog unavailable: {0}")]
    CatalogLoad(String),

    /// Advance was requested before an option was chosen for the current question.
    #[error("question {} has no selected answer", .question + 1)]
    QuizIncompleteSelection { question: usize },

    /// The file referenced by a content leaf could not be fetched or parsed.
    #[error("failed to load {path}: {reason}")]
    ContentTableLoad { path: String, reason: String },

    /// The file referenced by a content leaf is valid JSON of an unknown shape.
    #[error("format not recognized in {path}")]
    ContentTableFormat { path: String },
}

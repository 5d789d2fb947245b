use crate::errors::GrammarError;
use serde::Deserialize;
use serde_json::Value;

pub const COLUMN_TITLES: [&str; 4] = ["Base form", "Past simple", "Past participle", "Translation"];

/// One record of a word-forms table, e.g. an irregular verb.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormRecord {
    pub base: String,
    pub past: String,
    pub participle: String,
    #[serde(default)]
    pub translation: Option<String>,
}

impl FormRecord {
    fn fields(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.base.as_str()),
            Some(self.past.as_str()),
            Some(self.participle.as_str()),
            self.translation.as_deref(),
        ]
        .into_iter()
        .flatten()
    }

    fn matches(&self, needle_lowercase: &str) -> bool {
        self.fields()
            .any(|field| field.to_lowercase().contains(needle_lowercase))
    }
}

/// A loaded table plus its live filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTable {
    records: Vec<FormRecord>,
    filter: String,
}

impl ContentTable {
    /// Parse the fetched document. Unparseable JSON is a load error, any other shape a
    /// format error.
    pub fn parse(path: &str, text: &str) -> Result<Self, GrammarError> {
        let document: Value =
            serde_json::from_str(text).map_err(|err| GrammarError::ContentTableLoad {
                path: path.to_string(),
                reason: err.to_string(),
            })?;
        Self::from_value(path, document)
    }

    pub fn from_value(path: &str, document: Value) -> Result<Self, GrammarError> {
        let format_error = || GrammarError::ContentTableFormat {
            path: path.to_string(),
        };
        if !document.is_array() {
            return Err(format_error());
        }
        let mut records: Vec<FormRecord> =
            serde_json::from_value(document).map_err(|_| format_error())?;
        records.sort_by_cached_key(|record| record.base.to_lowercase());
        Ok(Self {
            records,
            filter: String::new(),
        })
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    #[cfg(test)]
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn push_filter_char(&mut self, ch: char) {
        self.filter.push(ch);
    }

    /// Drop the last filter character; false when the filter was already empty.
    pub fn pop_filter_char(&mut self) -> bool {
        self.filter.pop().is_some()
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn has_translations(&self) -> bool {
        self.records.iter().any(|record| record.translation.is_some())
    }

    /// Rows matching the filter, case-insensitive substring over every field. A filter of
    /// only whitespace shows every row.
    pub fn visible_rows(&self) -> Vec<&FormRecord> {
        if self.filter.trim().is_empty() {
            return self.records.iter().collect();
        }
        let needle = self.filter.to_lowercase();
        self.records
            .iter()
            .filter(|record| record.matches(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};

    const VERBS: &str = r#"[
        {"base": "see", "past": "saw", "participle": "seen"},
        {"base": "go", "past": "went", "participle": "gone"}
    ]"#;

    fn parse_error(text: &str) -> GrammarError {
        ContentTable::parse("verbs.json", text).unwrap_err()
    }

    #[test]
    fn rows_are_sorted_by_base_form() {
        let table = ContentTable::parse("verbs.json", VERBS).unwrap();
        let bases: Vec<&str> = table
            .visible_rows()
            .iter()
            .map(|record| record.base.as_str())
            .collect();
        assert_eq!(bases, vec!["go", "see"]);
    }

    #[test]
    fn filter_is_case_insensitive_and_resettable() {
        let mut table = ContentTable::parse("verbs.json", VERBS).unwrap();
        table.set_filter("see");
        assert_eq!(table.visible_rows().len(), 1);
        table.set_filter("SEE");
        assert_eq!(table.visible_rows().len(), 1);
        assert_eq!(table.visible_rows()[0].past, "saw");
        table.set_filter("");
        assert_eq!(table.visible_rows().len(), 2);
    }

    #[test]
    fn filter_matches_any_field_per_keystroke() {
        let mut table = ContentTable::parse("verbs.json", VERBS).unwrap();
        for ch in "wen".chars() {
            table.push_filter_char(ch);
        }
        assert_eq!(table.visible_rows().len(), 1);
        assert!(table.pop_filter_char());
        assert!(table.pop_filter_char());
        assert!(table.pop_filter_char());
        assert!(!table.pop_filter_char());
        assert_eq!(table.visible_rows().len(), 2);
    }

    #[test]
    fn filter_keeps_surrounding_spaces() {
        let text = r#"[
            {"base": "go", "past": "went", "participle": "gone"},
            {"base": "go on", "past": "went on", "participle": "gone on"}
        ]"#;
        let mut table = ContentTable::parse("verbs.json", text).unwrap();
        table.set_filter("go ");
        let bases: Vec<&str> = table
            .visible_rows()
            .iter()
            .map(|record| record.base.as_str())
            .collect();
        assert_eq!(bases, vec!["go on"]);
        table.set_filter("  ");
        assert_eq!(table.visible_rows().len(), 2);
    }

    #[test]
    fn filter_covers_translation() {
        let text = r#"[{"base": "go", "past": "went", "participle": "gone", "translation": "идти"}]"#;
        let mut table = ContentTable::parse("verbs.json", text).unwrap();
        assert!(table.has_translations());
        table.set_filter("ИДТИ");
        assert_eq!(table.visible_rows().len(), 1);
    }

    #[test]
    fn invalid_json_is_a_load_error() {
        let err = parse_error("[{\"base\": ");
        assert!(matches!(err, GrammarError::ContentTableLoad { .. }));
    }

    #[test]
    fn unknown_shapes_are_format_errors() {
        for text in [
            r#"{"base": "go"}"#,
            r#"[{"base": "go", "past": "went"}]"#,
            r#"[{"base": 1, "past": "went", "participle": "gone"}]"#,
        ] {
            let err = parse_error(text);
            assert_eq!(
                err,
                GrammarError::ContentTableFormat {
                    path: "verbs.json".to_string()
                }
            );
        }
    }

    #[test]
    fn parses_fixture_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_fixtures/irregular_verbs.json");
        let text = fs::read_to_string(&path).unwrap();
        let table = ContentTable::parse("irregular_verbs.json", &text).unwrap();
        assert!(table.total() >= 5);
    }
}

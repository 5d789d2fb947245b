use crate::{log_util::log_debug, quiz::Question};
use serde_json::{Map, Value};

/// Outcome of classifying a tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind<'a> {
    /// A mapping whose keys are child topics.
    Category(&'a Map<String, Value>),
    Leaf(Leaf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    Text { content: String },
    Quiz(QuizLeaf),
    File(FileLeaf),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuizLeaf {
    pub instructions: Option<String>,
    pub questions: Vec<Question>,
}

/// A leaf whose content lives in a separate JSON resource.
#[derive(Debug, Clone, PartialEq)]
pub struct FileLeaf {
    pub path: String,
    pub title: Option<String>,
}

impl<'a> NodeKind<'a> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

/// Classify a node: explicit tag, then a `questions` field, then a string `content`
/// field, then category. Shapes that fit none of these become empty text.
pub fn classify(node: &Value) -> NodeKind<'_> {
    let Some(object) = node.as_object() else {
        let content = node.as_str().unwrap_or_default().to_string();
        return NodeKind::Leaf(Leaf::Text { content });
    };

    if let Some(leaf) = object
        .get("type")
        .and_then(Value::as_str)
        .and_then(|tag| classify_tagged(tag, object))
    {
        return NodeKind::Leaf(leaf);
    }

    if let Some(questions) = object.get("questions") {
        if questions.is_array() || questions.is_object() {
            return NodeKind::Leaf(Leaf::Quiz(quiz_leaf(object)));
        }
    }

    if let Some(content) = object.get("content").and_then(Value::as_str) {
        return NodeKind::Leaf(Leaf::Text {
            content: content.to_string(),
        });
    }

    NodeKind::Category(object)
}

fn classify_tagged(tag: &str, object: &Map<String, Value>) -> Option<Leaf> {
    match tag.trim().to_lowercase().as_str() {
        "text" => Some(Leaf::Text {
            content: string_field(object, &["content"]).unwrap_or_default(),
        }),
        "quiz" | "grammar_test" => Some(Leaf::Quiz(quiz_leaf(object))),
        "content_from_file" => match string_field(object, &["file", "path"]) {
            Some(path) if !path.trim().is_empty() => Some(Leaf::File(FileLeaf {
                path: path.trim().to_string(),
                title: string_field(object, &["title"]),
            })),
            _ => Some(Leaf::Text {
                content: String::new(),
            }),
        },
        _ => None,
    }
}

fn quiz_leaf(object: &Map<String, Value>) -> QuizLeaf {
    let questions = object
        .get("questions")
        .map(ordered_values)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(position, value)| {
            let question = decode_question(value);
            if question.is_none() {
                log_debug(&format!(
                    "Classifier: skipped question {} with no fields: {}",
                    position + 1,
                    value
                ));
            }
            question
        })
        .collect();
    QuizLeaf {
        instructions: string_field(object, &["instructions"]).filter(|text| !text.trim().is_empty()),
        questions,
    }
}

fn decode_question(value: &Value) -> Option<Question> {
    let object = value.as_object()?;
    let options = object
        .get("options")
        .map(ordered_values)
        .unwrap_or_default()
        .into_iter()
        .map(display_string)
        .collect();
    Some(Question {
        text: string_field(object, &["text", "question"]).unwrap_or_default(),
        options,
        correct_answer: object
            .get("correct_answer")
            .or_else(|| object.get("answer"))
            .cloned()
            .unwrap_or(Value::Null),
        explanation: string_field(object, &["explanation"]).filter(|text| !text.trim().is_empty()),
    })
}

/// Sequence view of an array or keyed mapping. Integer-like keys come first in ascending
/// order, the remaining keys keep document order.
pub fn ordered_values(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => {
            let mut indexed: Vec<(u32, &Value)> = Vec::new();
            let mut named: Vec<&Value> = Vec::new();
            for (key, item) in map {
                match array_index(key) {
                    Some(index) => indexed.push((index, item)),
                    None => named.push(item),
                }
            }
            indexed.sort_by_key(|(index, _)| *index);
            indexed
                .into_iter()
                .map(|(_, item)| item)
                .chain(named)
                .collect()
        }
        _ => Vec::new(),
    }
}

fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|index| *index < u32::MAX)
}

fn string_field(object: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| object.get(*name).and_then(Value::as_str))
        .map(str::to_string)
}

fn display_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_tag_wins_over_structure() {
        let node = json!({ "type": "text", "content": "hello", "questions": [] });
        assert_eq!(
            classify(&node),
            NodeKind::Leaf(Leaf::Text {
                content: "hello".to_string()
            })
        );
    }

    #[test]
    fn tag_is_trimmed_and_case_insensitive() {
        let node = json!({ "type": "  Grammar_Test ", "questions": [
            { "text": "Q", "options": ["A) a"], "correct_answer": "A" }
        ]});
        match classify(&node) {
            NodeKind::Leaf(Leaf::Quiz(quiz)) => assert_eq!(quiz.questions.len(), 1),
            other => panic!("expected quiz, got {:?}", other),
        }
    }

    #[test]
    fn unknown_tag_falls_back_to_structure() {
        let node = json!({ "type": "video", "content": "watch this" });
        assert!(matches!(
            classify(&node),
            NodeKind::Leaf(Leaf::Text { .. })
        ));
    }

    #[test]
    fn untagged_questions_field_is_a_quiz() {
        let node = json!({ "instructions": "Pick one", "questions": [
            { "text": "Q1", "options": ["A) yes", "B) no"], "correct_answer": "A" }
        ]});
        match classify(&node) {
            NodeKind::Leaf(Leaf::Quiz(quiz)) => {
                assert_eq!(quiz.instructions.as_deref(), Some("Pick one"));
                assert_eq!(quiz.questions[0].options, vec!["A) yes", "B) no"]);
            }
            other => panic!("expected quiz, got {:?}", other),
        }
    }

    #[test]
    fn question_entries_without_fields_are_skipped() {
        let node = json!({ "questions": [
            "loose text",
            { "text": "Q1", "options": ["A) yes", "B) no"], "correct_answer": "A" },
            7
        ]});
        let NodeKind::Leaf(Leaf::Quiz(quiz)) = classify(&node) else {
            panic!("expected quiz");
        };
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].text, "Q1");
    }

    #[test]
    fn keyed_questions_are_ordered_like_array_indices() {
        let node = json!({ "questions": {
            "10": { "text": "third" },
            "extra": { "text": "fourth" },
            "2": { "text": "second" },
            "1": { "text": "first" }
        }});
        let NodeKind::Leaf(Leaf::Quiz(quiz)) = classify(&node) else {
            panic!("expected quiz");
        };
        let texts: Vec<&str> = quiz.questions.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third", "fourth"]);
    }

    #[test]
    fn question_fields_accept_fallback_names() {
        let node = json!({ "questions": [
            { "question": "Pick", "options": ["A) x", 2], "answer": 2, "explanation": "" }
        ]});
        let NodeKind::Leaf(Leaf::Quiz(quiz)) = classify(&node) else {
            panic!("expected quiz");
        };
        let question = &quiz.questions[0];
        assert_eq!(question.text, "Pick");
        assert_eq!(question.options, vec!["A) x", "2"]);
        assert_eq!(question.correct_answer, json!(2));
        assert!(question.explanation.is_none());
    }

    #[test]
    fn string_content_without_tag_is_text() {
        let node = json!({ "content": "Use -ed for regular verbs" });
        assert!(matches!(classify(&node), NodeKind::Leaf(Leaf::Text { .. })));
    }

    #[test]
    fn non_string_content_is_a_category() {
        let node = json!({ "content": { "type": "text", "content": "nested" } });
        assert!(matches!(classify(&node), NodeKind::Category(_)));
    }

    #[test]
    fn content_from_file_reads_path_and_title() {
        let node = json!({ "type": "content_from_file", "file": "verbs.json", "title": "Verbs" });
        assert_eq!(
            classify(&node),
            NodeKind::Leaf(Leaf::File(FileLeaf {
                path: "verbs.json".to_string(),
                title: Some("Verbs".to_string()),
            }))
        );
    }

    #[test]
    fn content_from_file_without_reference_is_empty_text() {
        let node = json!({ "type": "content_from_file" });
        assert_eq!(
            classify(&node),
            NodeKind::Leaf(Leaf::Text {
                content: String::new()
            })
        );
    }

    #[test]
    fn odd_shapes_never_panic() {
        assert!(classify(&json!("plain")).is_leaf());
        assert!(classify(&json!(42)).is_leaf());
        assert!(classify(&json!(null)).is_leaf());
        assert!(classify(&json!([1, 2])).is_leaf());
        assert!(!classify(&json!({})).is_leaf());
    }

    #[test]
    fn questions_field_with_scalar_value_is_not_a_quiz() {
        let node = json!({ "questions": "none yet", "content": "Read first" });
        assert!(matches!(classify(&node), NodeKind::Leaf(Leaf::Text { .. })));
    }
}

use crate::{errors::GrammarError, log_util::log_debug};
use serde_json::Value;

/// Parsed topic tree. Immutable after load; navigation only changes the path into it.
#[derive(Debug, Clone)]
pub struct TopicTree {
    root: Value,
}

impl TopicTree {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse a catalog document, retrying once with trailing commas stripped.
    pub fn parse(text: &str) -> Result<Self, GrammarError> {
        match serde_json::from_str::<Value>(text) {
            Ok(root) => Ok(Self::new(root)),
            Err(first) => {
                log_debug(&format!(
                    "TreeStore: initial parse failed ({}), retrying without trailing commas",
                    first
                ));
                let repaired = strip_trailing_commas(text);
                serde_json::from_str::<Value>(&repaired)
                    .map(Self::new)
                    .map_err(|err| GrammarError::CatalogLoad(err.to_string()))
            }
        }
    }

    #[cfg(test)]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Walk `path` from the root. `None` when any key is missing or the walk hits a non-object.
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.root, |node, key| node.as_object()?.get(key.as_ref()))
    }
}

/// Remove commas that are followed (after optional whitespace) by `}` or `]`.
/// String literals are copied verbatim so commas inside text are untouched.
pub fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut output = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (index, &ch) in chars.iter().enumerate() {
        if in_string {
            output.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                output.push(ch);
            }
            ',' => {
                let next = chars[index + 1..]
                    .iter()
                    .find(|candidate| !candidate.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    output.push(ch);
                }
            }
            _ => output.push(ch),
        }
    }

    output
}

/// Label shown when the path is empty and no label is configured.
pub const DEFAULT_ROOT_LABEL: &str = "📚 Grammar";

/// Ordered keys from the tree root to the displayed node.
///
/// Every mutator returns whether the path changed so callers can rebuild the view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationPath {
    keys: Vec<String>,
}

impl NavigationPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn last(&self) -> Option<&str> {
        self.keys.last().map(String::as_str)
    }

    /// Keys of the parent node, empty at the root.
    pub fn parent(&self) -> &[String] {
        match self.keys.split_last() {
            Some((_, parent)) => parent,
            None => &[],
        }
    }

    /// Append a child key. Callers only offer keys present in the current node.
    pub fn descend(&mut self, key: impl Into<String>) -> bool {
        self.keys.push(key.into());
        true
    }

    pub fn back(&mut self) -> bool {
        self.keys.pop().is_some()
    }

    pub fn reset(&mut self) -> bool {
        self.keys.clear();
        true
    }

    /// Swap the final key in place, so one back step skips the replaced node.
    pub fn replace_last(&mut self, key: impl Into<String>) -> bool {
        match self.keys.last_mut() {
            Some(last) => {
                *last = key.into();
                true
            }
            None => false,
        }
    }

    pub fn title<'a>(&'a self, root_label: &'a str) -> &'a str {
        self.last().unwrap_or(root_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descend_then_back_restores_the_path() {
        let mut path = NavigationPath::new();
        path.descend("Tenses");
        let before = path.clone();
        path.descend("Past Simple");
        assert_eq!(path.keys(), ["Tenses", "Past Simple"]);
        assert!(path.back());
        assert_eq!(path, before);
    }

    #[test]
    fn back_on_empty_path_is_a_no_op() {
        let mut path = NavigationPath::new();
        assert!(!path.back());
        assert!(path.is_empty());
    }

    #[test]
    fn replace_last_keeps_depth() {
        let mut path = NavigationPath::new();
        path.descend("Tenses");
        path.descend("Past Simple");
        assert!(path.replace_last("Practice: Past Simple"));
        assert_eq!(path.len(), 2);
        assert_eq!(path.last(), Some("Practice: Past Simple"));
        path.back();
        assert_eq!(path.keys(), ["Tenses"]);
    }

    #[test]
    fn replace_last_on_empty_path_is_a_no_op() {
        let mut path = NavigationPath::new();
        assert!(!path.replace_last("Practice: X"));
        assert!(path.is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut path = NavigationPath::new();
        path.descend("a");
        path.descend("b");
        path.reset();
        assert!(path.is_empty());
    }

    #[test]
    fn title_uses_last_segment_or_root_label() {
        let mut path = NavigationPath::new();
        assert_eq!(path.title(DEFAULT_ROOT_LABEL), DEFAULT_ROOT_LABEL);
        path.descend("Tenses");
        assert_eq!(path.title(DEFAULT_ROOT_LABEL), "Tenses");
    }

    #[test]
    fn parent_of_root_is_empty() {
        let mut path = NavigationPath::new();
        assert!(path.parent().is_empty());
        path.descend("a");
        path.descend("b");
        assert_eq!(path.parent(), ["a"]);
    }
}

/// Display block of a text leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextBlock {
    Paragraph(String),
    /// Consecutive `-` or `•` lines.
    Bullets(Vec<String>),
    Spacer,
}

/// Split leaf content into paragraphs, bullet lists and blank-line spacers.
pub fn segment(content: &str) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut bullets: Vec<String> = Vec::new();

    for line in content.lines() {
        if let Some(item) = bullet_item(line) {
            bullets.push(item.to_string());
            continue;
        }
        if !bullets.is_empty() {
            blocks.push(TextBlock::Bullets(std::mem::take(&mut bullets)));
        }
        if line.trim().is_empty() {
            blocks.push(TextBlock::Spacer);
        } else {
            blocks.push(TextBlock::Paragraph(line.to_string()));
        }
    }

    if !bullets.is_empty() {
        blocks.push(TextBlock::Bullets(bullets));
    }
    blocks
}

fn bullet_item(line: &str) -> Option<&str> {
    let rest = line.trim_start();
    let rest = rest.strip_prefix('-').or_else(|| rest.strip_prefix('•'))?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_consecutive_bullets() {
        let blocks = segment("Use it for:\n- habits\n• facts\n\nExample: I go.");
        assert_eq!(
            blocks,
            vec![
                TextBlock::Paragraph("Use it for:".to_string()),
                TextBlock::Bullets(vec!["habits".to_string(), "facts".to_string()]),
                TextBlock::Spacer,
                TextBlock::Paragraph("Example: I go.".to_string()),
            ]
        );
    }

    #[test]
    fn accepts_crlf_and_trailing_list() {
        let blocks = segment("Forms\r\n  - go\r\n  - went");
        assert_eq!(
            blocks,
            vec![
                TextBlock::Paragraph("Forms".to_string()),
                TextBlock::Bullets(vec!["go".to_string(), "went".to_string()]),
            ]
        );
    }

    #[test]
    fn hyphenated_words_are_not_bullets() {
        let blocks = segment("-ed endings\nwell-known");
        assert_eq!(
            blocks,
            vec![
                TextBlock::Paragraph("-ed endings".to_string()),
                TextBlock::Paragraph("well-known".to_string()),
            ]
        );
    }

    #[test]
    fn marker_without_text_is_an_empty_item() {
        let blocks = segment("Forms:\n- go\n-   \n• went");
        assert_eq!(
            blocks,
            vec![
                TextBlock::Paragraph("Forms:".to_string()),
                TextBlock::Bullets(vec!["go".to_string(), String::new(), "went".to_string()]),
            ]
        );
    }

    #[test]
    fn empty_content_has_no_blocks() {
        assert!(segment("").is_empty());
    }
}

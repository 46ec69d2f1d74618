//! Line classification for Markdown-style generated text.

/// What a single input line represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `# ` document title.
    Title,
    /// `## ` section heading.
    SectionHeading,
    /// `### ` subsection heading.
    SubHeading,
    /// `* ` or `- ` list item.
    Bullet,
    /// Any other non-blank line.
    Body,
    /// An empty or whitespace-only line.
    Blank,
}

/// A classified line with its markers removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub text: String,
}

/// Splits `input` on newlines and classifies each line.
#[must_use]
pub fn lex(input: &str) -> Vec<Line> {
    input.lines().map(classify).collect()
}

fn classify(raw: &str) -> Line {
    let line = raw.trim();
    if line.is_empty() {
        return Line {
            kind: LineKind::Blank,
            text: String::new(),
        };
    }

    let (kind, rest) = if let Some(rest) = line.strip_prefix("### ") {
        (LineKind::SubHeading, rest)
    } else if let Some(rest) = line.strip_prefix("## ") {
        (LineKind::SectionHeading, rest)
    } else if let Some(rest) = line.strip_prefix("# ") {
        (LineKind::Title, rest)
    } else if let Some(rest) = line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
        (LineKind::Bullet, rest)
    } else {
        (LineKind::Body, line)
    };

    let text = strip_emphasis(rest);
    if text.is_empty() {
        return Line {
            kind: LineKind::Blank,
            text,
        };
    }
    Line { kind, text }
}

fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<LineKind> {
        lex(input).into_iter().map(|line| line.kind).collect()
    }

    #[test]
    fn classifies_by_prefix() {
        assert_eq!(
            kinds("# Title\n## Section\n### Sub\n* one\n- two\nplain\n\n   "),
            vec![
                LineKind::Title,
                LineKind::SectionHeading,
                LineKind::SubHeading,
                LineKind::Bullet,
                LineKind::Bullet,
                LineKind::Body,
                LineKind::Blank,
                LineKind::Blank,
            ]
        );
    }

    #[test]
    fn markers_are_removed() {
        let lines = lex("## **Introduction**\n* **Key:** value");
        assert_eq!(lines[0].text, "Introduction");
        assert_eq!(lines[1].text, "Key: value");
    }

    #[test]
    fn prefix_needs_a_space() {
        assert_eq!(kinds("#hashtag\n*emphasis*\n-5 degrees"), vec![LineKind::Body; 3]);
    }

    #[test]
    fn heading_without_text_is_blank() {
        assert_eq!(kinds("## **  **"), vec![LineKind::Blank]);
    }

    #[test]
    fn indented_markers_are_recognised() {
        let lines = lex("   ## Methods\r\n  * item");
        assert_eq!(lines[0].kind, LineKind::SectionHeading);
        assert_eq!(lines[0].text, "Methods");
        assert_eq!(lines[1].kind, LineKind::Bullet);
    }
}

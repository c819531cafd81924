//! Reply sectionizer
//!
//! Splits a bot reply into alternating runs of prose and code by tracking
//! fenced code-block delimiters line by line. Blank lines never break or
//! toggle a section, and an unterminated fence simply classifies the rest of
//! the reply as code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opening or closing marker of a fenced code block.
const FENCE: &str = "```";

/// Content kind of a [`Section`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Text,
    Code,
}

impl SectionKind {
    /// The other kind, used when a fence delimiter is crossed.
    pub fn toggled(self) -> Self {
        match self {
            SectionKind::Text => SectionKind::Code,
            SectionKind::Code => SectionKind::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Text => "text",
            SectionKind::Code => "code",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A maximal run of reply lines sharing one content kind.
///
/// Every line of `content` keeps its original (untrimmed) text and is
/// terminated by `\n`, including the last one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub content: String,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            content: String::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: SectionKind::Text,
            content: content.into(),
        }
    }

    pub fn code(content: impl Into<String>) -> Self {
        Self {
            kind: SectionKind::Code,
            content: content.into(),
        }
    }

    pub fn is_code(&self) -> bool {
        self.kind == SectionKind::Code
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of lines held by this section.
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }

    fn push_line(&mut self, line: &str) {
        self.content.push_str(line);
        self.content.push('\n');
    }

    /// Render the section back to markdown.
    ///
    /// Text is emitted verbatim, code is wrapped in bare fences. Parsing the
    /// result yields this section again as long as the content itself holds
    /// no fence delimiters.
    pub fn to_markdown(&self) -> String {
        match self.kind {
            SectionKind::Text => self.content.clone(),
            SectionKind::Code => format!("{FENCE}\n{}{FENCE}\n", self.content),
        }
    }
}

/// Whether a line opens or closes a fenced code block.
///
/// Anything after the backticks (a language tag, for instance) is ignored.
pub fn is_fence_delimiter(line: &str) -> bool {
    line.trim().starts_with(FENCE)
}

/// Split a markdown reply into ordered text and code sections.
///
/// Never fails: empty input or input made only of blank lines produces a
/// single empty text section, and a missing closing fence leaves the
/// remaining lines in a trailing code section.
///
/// # Examples
///
/// ```
/// use netgpt::parser::{SectionKind, parse_sections};
///
/// let sections = parse_sections("intro\n```\ncode line\n```\noutro");
/// assert_eq!(sections.len(), 3);
/// assert_eq!(sections[1].kind, SectionKind::Code);
/// assert_eq!(sections[1].content, "code line\n");
/// ```
pub fn parse_sections(markdown: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut kind = SectionKind::Text;
    let mut current = Section::new(kind);

    for line in markdown.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with(FENCE) {
            kind = kind.toggled();
            continue;
        }
        if current.kind != kind {
            let closed = std::mem::replace(&mut current, Section::new(kind));
            // Only the initial section can still be empty here
            if !closed.is_empty() {
                sections.push(closed);
            }
        }
        current.push_line(line);
    }

    sections.push(current);
    sections
}

/// Render a section sequence back into markdown.
pub fn render_sections(sections: &[Section]) -> String {
    sections.iter().map(Section::to_markdown).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_is_one_section() {
        assert_eq!(
            parse_sections("hello\nworld"),
            vec![Section::text("hello\nworld\n")]
        );
    }

    #[test]
    fn test_fenced_block_only() {
        assert_eq!(
            parse_sections("```\nprint(1)\n```"),
            vec![Section::code("print(1)\n")]
        );
    }

    #[test]
    fn test_text_code_text() {
        assert_eq!(
            parse_sections("intro\n```\ncode line\n```\noutro"),
            vec![
                Section::text("intro\n"),
                Section::code("code line\n"),
                Section::text("outro\n"),
            ]
        );
    }

    #[test]
    fn test_unterminated_fence_keeps_trailing_code() {
        assert_eq!(
            parse_sections("```\nunterminated"),
            vec![Section::code("unterminated\n")]
        );
    }

    #[test]
    fn test_blank_input_yields_empty_text_section() {
        assert_eq!(parse_sections("\n\n"), vec![Section::text("")]);
        assert_eq!(parse_sections(""), vec![Section::text("")]);
        assert_eq!(parse_sections("   \n\t\n"), vec![Section::text("")]);
    }

    #[test]
    fn test_language_tag_is_discarded() {
        let sections = parse_sections("Run this:\n```python\nprint('hi')\n```");
        assert_eq!(
            sections,
            vec![Section::text("Run this:\n"), Section::code("print('hi')\n")]
        );
        assert!(!sections.iter().any(|s| s.content.contains("python")));
    }

    #[test]
    fn test_indented_fence_toggles() {
        let sections = parse_sections("a\n   ```json\n  {\"k\": 1}\n  ```\nb");
        assert_eq!(
            sections,
            vec![
                Section::text("a\n"),
                Section::code("  {\"k\": 1}\n"),
                Section::text("b\n"),
            ]
        );
    }

    #[test]
    fn test_blank_lines_do_not_break_sections() {
        assert_eq!(
            parse_sections("one\n\n\ntwo\n```\nx\n\ny\n```"),
            vec![Section::text("one\ntwo\n"), Section::code("x\ny\n")]
        );
    }

    #[test]
    fn test_untrimmed_lines_are_preserved() {
        assert_eq!(
            parse_sections("```\n    indented();\n\tTabbed  \n```"),
            vec![Section::code("    indented();\n\tTabbed  \n")]
        );
    }

    #[test]
    fn test_empty_fence_pair_merges_neighbours() {
        let sections = parse_sections("before\n```\n```\nafter");
        assert_eq!(sections, vec![Section::text("before\nafter\n")]);
    }

    #[test]
    fn test_fence_only_input() {
        assert_eq!(parse_sections("```"), vec![Section::text("")]);
        assert_eq!(parse_sections("```\n```"), vec![Section::text("")]);
    }

    #[test]
    fn test_windows_line_endings_keep_carriage_return() {
        let sections = parse_sections("a\r\n```\r\nb\r\n```\r\n");
        assert_eq!(sections, vec![Section::text("a\r\n"), Section::code("b\r\n")]);
    }

    #[test]
    fn test_no_adjacent_sections_share_kind() {
        let input = "a\n```\nb\n```\n```\nc\n```\nd\n\n```\ne\n```\n```\n```\nf";
        let sections = parse_sections(input);
        for pair in sections.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
    }

    #[test]
    fn test_content_reconstructs_kept_lines() {
        let input = "Intro line\n\n```bash\nshow ip route\n  show version\n```\n\nDone.\n";
        let expected: String = input
            .split('\n')
            .filter(|line| !line.trim().is_empty() && !is_fence_delimiter(line))
            .map(|line| format!("{line}\n"))
            .collect();
        let joined: String = parse_sections(input)
            .iter()
            .map(|s| s.content.as_str())
            .collect();
        assert_eq!(joined, expected);
    }

    #[test]
    fn test_reparsing_rendered_code_section() {
        let original = Section::code("interface Gi0/1\n  shutdown\n");
        assert_eq!(parse_sections(&original.to_markdown()), vec![original]);
    }

    #[test]
    fn test_render_then_parse_round_trips_sequence() {
        let sections = parse_sections("hi\n```\nx = 1\n```\nbye");
        assert_eq!(parse_sections(&render_sections(&sections)), sections);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&Section::code("x\n")).unwrap();
        assert_eq!(json, r#"{"kind":"code","content":"x\n"}"#);
    }
}

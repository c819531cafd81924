//! Reply parsing.
//!
//! This module turns the markdown body of a bot reply into typed sections
//! (prose vs. code) and provides the display helpers the UI and CLI use to
//! render them.

pub mod code;
pub mod output;
pub mod sections;

pub use code::format_code_content;
pub use output::{SectionsOutput, build_json_output};
pub use sections::{Section, SectionKind, is_fence_delimiter, parse_sections, render_sections};

use std::path::Path;

/// Read a markdown file and split it into sections.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn parse_file(path: &Path) -> std::io::Result<Vec<Section>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_sections(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Here you go:\n```\nshow run\n```\n").unwrap();

        let sections = parse_file(file.path()).unwrap();
        assert_eq!(
            sections,
            vec![Section::text("Here you go:\n"), Section::code("show run\n")]
        );
    }

    #[test]
    fn test_parse_missing_file() {
        assert!(parse_file(Path::new("/definitely/not/here.md")).is_err());
    }
}

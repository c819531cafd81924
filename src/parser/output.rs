//! JSON output types for sectionized replies

use super::sections::{Section, SectionKind};
use serde::{Deserialize, Serialize};

/// Root document produced by `netgpt parse --output json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsOutput {
    pub metadata: SectionsMetadata,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsMetadata {
    pub source: Option<String>,
    #[serde(rename = "sectionCount")]
    pub section_count: usize,
    #[serde(rename = "codeSectionCount")]
    pub code_section_count: usize,
    #[serde(rename = "lineCount")]
    pub line_count: usize,
}

/// Build the JSON output document for a parsed reply.
pub fn build_json_output(sections: Vec<Section>, source: Option<String>) -> SectionsOutput {
    let metadata = SectionsMetadata {
        source,
        section_count: sections.len(),
        code_section_count: sections
            .iter()
            .filter(|s| s.kind == SectionKind::Code)
            .count(),
        line_count: sections.iter().map(Section::line_count).sum(),
    };
    SectionsOutput { metadata, sections }
}

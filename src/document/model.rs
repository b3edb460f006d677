//! Section map and content blocks extracted from a CV template

use crate::config::SectionRole;
use crate::document::package::DocxPackage;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStyle {
    Plain,
    Bullet,
    Heading,
    /// Tables and other non-paragraph body elements, carried verbatim
    Embedded,
}

/// Raw formatting fragments needed to regenerate a paragraph with new text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockFormat {
    pub prefix: String,
    pub paragraph_props: Option<String>,
    pub run_props: Option<String>,
    /// Leading run formatted apart from the rest, such as a bold `Languages:` label
    pub label: Option<LabelRun>,
}

/// Text of a paragraph's first run and the run properties of the text after it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelRun {
    pub text: String,
    pub tail_props: Option<String>,
}

/// One paragraph (or opaque body element) of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    text: String,
    style: BlockStyle,
    style_id: Option<String>,
    leading: String,
    xml: String,
    format: BlockFormat,
    rewritten: bool,
}

impl ContentBlock {
    pub(crate) fn new(
        text: String,
        style: BlockStyle,
        style_id: Option<String>,
        leading: String,
        xml: String,
        format: BlockFormat,
    ) -> Self {
        Self {
            text,
            style,
            style_id,
            leading,
            xml,
            format,
            rewritten: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> BlockStyle {
        self.style
    }

    pub fn style_id(&self) -> Option<&str> {
        self.style_id.as_deref()
    }

    pub fn is_blank(&self) -> bool {
        self.style != BlockStyle::Embedded && self.text.trim().is_empty()
    }

    pub fn is_rewritten(&self) -> bool {
        self.rewritten
    }

    pub fn format(&self) -> &BlockFormat {
        &self.format
    }

    /// The block's WordprocessingML, including the whitespace that preceded it.
    pub fn xml(&self) -> String {
        format!("{}{}", self.leading, self.xml)
    }

    /// Copy of this block carrying `text`, keeping paragraph and first-run formatting.
    /// Embedded blocks cannot be rewritten and are returned unchanged.
    pub fn with_text(&self, text: &str) -> ContentBlock {
        if self.style == BlockStyle::Embedded {
            return self.clone();
        }
        ContentBlock {
            text: text.to_string(),
            style: self.style,
            style_id: self.style_id.clone(),
            leading: self.leading.clone(),
            xml: crate::document::writer::render_paragraph(&self.format, text),
            format: self.format.clone(),
            rewritten: true,
        }
    }
}

/// Ordered blocks under one heading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionContent {
    blocks: Vec<ContentBlock>,
}

impl SectionContent {
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut Vec<ContentBlock> {
        &mut self.blocks
    }

    pub(crate) fn push(&mut self, block: ContentBlock) {
        self.blocks.push(block);
    }

    pub fn bullets(&self) -> impl Iterator<Item = &ContentBlock> {
        self.blocks.iter().filter(|b| b.style == BlockStyle::Bullet)
    }

    pub fn bullet_count(&self) -> usize {
        self.bullets().count()
    }

    /// Non-blank paragraph text joined with spaces.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| b.style != BlockStyle::Embedded && !b.is_blank())
            .map(|b| b.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.is_blank())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub key: String,
    pub role: SectionRole,
    pub heading: ContentBlock,
    pub content: SectionContent,
}

impl Section {
    pub fn new(name: String, key: String, role: SectionRole, heading: ContentBlock) -> Self {
        Self {
            name,
            key,
            role,
            heading,
            content: SectionContent::default(),
        }
    }
}

/// Sections in document order, keyed by normalised heading text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionMap {
    sections: Vec<Section>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section, suffixing its key when the name is already taken.
    /// A renamed duplicate is demoted to a pass-through section.
    pub fn insert(&mut self, mut section: Section) -> &mut Section {
        section.key = normalize_key(&section.key);
        if self.get(&section.key).is_some() {
            let base = section.key.clone();
            let mut n = 2;
            while self.get(&format!("{} ({})", base, n)).is_some() {
                n += 1;
            }
            section.key = format!("{} ({})", base, n);
            section.role = SectionRole::Other;
        }
        self.sections.push(section);
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    pub fn get(&self, key: &str) -> Option<&Section> {
        let key = normalize_key(key);
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Section> {
        let key = normalize_key(key);
        self.sections.iter_mut().find(|s| s.key == key)
    }

    /// First section with the given role.
    pub fn by_role(&self, role: SectionRole) -> Option<&Section> {
        self.sections.iter().find(|s| s.role == role)
    }

    pub fn by_role_mut(&mut self, role: SectionRole) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.role == role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Section> {
        self.sections.last_mut()
    }
}

pub fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PersonalInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub links: Vec<String>,
}

/// A parsed template: package, section map, and the XML around the body content.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub(crate) source: PathBuf,
    pub(crate) package: DocxPackage,
    pub(crate) prologue: String,
    pub(crate) epilogue: String,
    pub(crate) preamble: Vec<ContentBlock>,
    pub(crate) sections: SectionMap,
    pub(crate) personal: PersonalInfo,
}

impl ExtractedDocument {
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn sections(&self) -> &SectionMap {
        &self.sections
    }

    pub fn personal(&self) -> &PersonalInfo {
        &self.personal
    }

    /// Blocks before the first recognised heading.
    pub fn preamble(&self) -> &[ContentBlock] {
        &self.preamble
    }

    pub fn package(&self) -> &DocxPackage {
        &self.package
    }

    /// Same document with a replacement section map.
    pub fn with_sections(&self, sections: SectionMap) -> ExtractedDocument {
        ExtractedDocument {
            sections,
            ..self.clone()
        }
    }

    /// Same document with a replacement preamble.
    pub fn with_preamble(&self, preamble: Vec<ContentBlock>) -> ExtractedDocument {
        ExtractedDocument {
            preamble,
            ..self.clone()
        }
    }

    /// Every block, headings included, in document order.
    pub fn blocks(&self) -> Vec<&ContentBlock> {
        let mut blocks: Vec<&ContentBlock> = self.preamble.iter().collect();
        for section in self.sections.iter() {
            blocks.push(&section.heading);
            blocks.extend(section.content.blocks());
        }
        blocks
    }

    /// All blocks moved into the preamble, for documents without a section structure.
    pub fn flattened(&self) -> ExtractedDocument {
        let preamble = self.blocks().into_iter().cloned().collect();
        ExtractedDocument {
            preamble,
            sections: SectionMap::new(),
            ..self.clone()
        }
    }

    /// Paragraph text of the whole document, one line per block.
    pub fn plain_text(&self) -> String {
        self.blocks()
            .iter()
            .map(|b| b.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Serialize for ContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ContentBlock", 3)?;
        state.serialize_field("style", &self.style)?;
        state.serialize_field("style_id", &self.style_id)?;
        state.serialize_field("text", &self.text)?;
        state.end()
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Section", 4)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("role", &self.role)?;
        state.serialize_field("blocks", self.content.blocks())?;
        state.end()
    }
}

impl std::fmt::Display for BlockStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockStyle::Plain => write!(f, "plain"),
            BlockStyle::Bullet => write!(f, "bullet"),
            BlockStyle::Heading => write!(f, "heading"),
            BlockStyle::Embedded => write!(f, "embedded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str, style: BlockStyle) -> ContentBlock {
        ContentBlock::new(
            text.to_string(),
            style,
            None,
            String::new(),
            format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text),
            BlockFormat {
                prefix: "w".to_string(),
                ..BlockFormat::default()
            },
        )
    }

    fn section(name: &str, role: SectionRole) -> Section {
        Section::new(name.to_string(), name.to_string(), role, block(name, BlockStyle::Heading))
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut map = SectionMap::new();
        map.insert(section("SKILLS", SectionRole::Skills));

        assert!(map.get("skills").is_some());
        assert!(map.get("Skills:").is_some());
        assert_eq!(map.keys(), vec!["skills"]);
    }

    #[test]
    fn test_duplicate_sections_get_suffixed_keys() {
        let mut map = SectionMap::new();
        map.insert(section("Skills", SectionRole::Skills));
        map.insert(section("SKILLS", SectionRole::Skills));
        map.insert(section("skills", SectionRole::Skills));

        assert_eq!(map.keys(), vec!["skills", "skills (2)", "skills (3)"]);
        assert_eq!(map.by_role(SectionRole::Skills).unwrap().key, "skills");
        assert_eq!(map.get("skills (2)").unwrap().role, SectionRole::Other);
    }

    #[test]
    fn test_with_text_marks_block_rewritten() {
        let original = block("Old text", BlockStyle::Bullet);
        let rewritten = original.with_text("New & improved");

        assert!(rewritten.is_rewritten());
        assert_eq!(rewritten.style(), BlockStyle::Bullet);
        assert!(rewritten.xml().contains("New &amp; improved"));
        assert!(!original.is_rewritten());
    }

    #[test]
    fn test_embedded_blocks_are_not_rewritten() {
        let table = block("cell", BlockStyle::Embedded);
        assert_eq!(table.with_text("other"), table);
    }

    #[test]
    fn test_section_content_text_and_bullets() {
        let content = SectionContent::new(vec![
            block("Generalist engineer.", BlockStyle::Plain),
            block("", BlockStyle::Plain),
            block("Python", BlockStyle::Bullet),
        ]);

        assert_eq!(content.text(), "Generalist engineer. Python");
        assert_eq!(content.bullet_count(), 1);
        assert!(!content.is_empty());
    }
}

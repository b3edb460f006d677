//! Section extraction from WordprocessingML
//!
//! Body paragraphs are scanned in order. A paragraph whose normalised text is
//! one of the configured heading aliases opens a recognised section. Once the
//! first section has been seen, a heading outside the vocabulary opens a
//! pass-through section when it sits at the same outline level as the heading
//! that opened the current section, or higher; deeper headings (job titles,
//! skill groups) stay inside it as heading blocks. Plain ALL CAPS lines only
//! split pass-through sections, so inside a recognised section items such as
//! "SQL" stay content. Everything before
//! the first section is the personal-info preamble. Each block keeps the exact
//! byte slice it was read from so untouched content is written back verbatim.

use crate::config::{SectionRole, SectionVocabulary};
use crate::document::model::{
    normalize_key, BlockFormat, BlockStyle, ContentBlock, ExtractedDocument, LabelRun, PersonalInfo, Section,
    SectionMap,
};
use crate::document::package::DocxPackage;
use crate::error::{Result, TailorError};
use log::{debug, info};
use regex::Regex;
use roxmltree::{Document, Node};
use std::path::Path;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub(crate) const BULLET_GLYPHS: &[char] = &['•', '▪', '◦', '‣', '-', '*', '–'];

pub struct SectionExtractor {
    vocabulary: SectionVocabulary,
    personal: PersonalInfoParser,
}

/// What a single body paragraph looks like before it is placed in a section.
struct ParagraphInfo {
    text: String,
    style_id: Option<String>,
    is_bullet: bool,
    /// Outline level for heading-styled paragraphs, 1 being the top
    level: Option<u8>,
}

/// The heading that opened the section currently being filled.
struct Opener {
    role: SectionRole,
    level: u8,
}

impl SectionExtractor {
    pub fn new(vocabulary: SectionVocabulary) -> Self {
        Self {
            vocabulary,
            personal: PersonalInfoParser::new(),
        }
    }

    /// Read the template at `path` into a section map. The file is closed before this returns.
    pub fn extract(&self, path: &Path) -> Result<ExtractedDocument> {
        info!("Extracting sections from {}", path.display());
        let package = DocxPackage::open(path)?;
        self.extract_package(package, path)
    }

    pub fn extract_bytes(&self, bytes: &[u8], source: &Path) -> Result<ExtractedDocument> {
        let package = DocxPackage::from_bytes(bytes)?;
        self.extract_package(package, source)
    }

    fn extract_package(&self, package: DocxPackage, source: &Path) -> Result<ExtractedDocument> {
        let xml = package.document_xml()?;
        let doc = Document::parse(&xml)?;

        let body = doc
            .root_element()
            .children()
            .find(|n| is_w(n, "body"))
            .ok_or_else(|| TailorError::UnreadableDocument("document has no body".to_string()))?;

        let mut cursor = body.first_child().map(|c| c.range().start).unwrap_or(xml.len());
        let prologue = xml[..cursor].to_string();

        let mut preamble: Vec<ContentBlock> = Vec::new();
        let mut sections = SectionMap::new();
        let mut opener: Option<Opener> = None;

        for node in body.children().filter(|n| n.is_element()) {
            if is_w(&node, "sectPr") {
                break;
            }

            let range = node.range();
            let leading = xml[cursor..range.start].to_string();
            let raw = xml[range.clone()].to_string();
            cursor = range.end;

            if !is_w(&node, "p") {
                let block = ContentBlock::new(
                    embedded_text(&node),
                    BlockStyle::Embedded,
                    None,
                    leading,
                    raw,
                    BlockFormat::default(),
                );
                push_block(&mut preamble, &mut sections, block);
                continue;
            }

            let info = self.inspect_paragraph(&node);
            let format = paragraph_format(&node, &xml, &raw);
            let normalized = normalize_key(&info.text);

            let recognised = if info.is_bullet || normalized.is_empty() {
                None
            } else {
                self.vocabulary.role_for(&normalized)
            };

            let opens_section = match (recognised, &opener) {
                (Some(_), _) => true,
                (None, Some(current)) => self.opens_unrecognised_section(&info, current),
                (None, None) => false,
            };

            if opens_section {
                let role = recognised.unwrap_or(SectionRole::Other);
                debug!("Section '{}' ({:?})", info.text.trim(), role);
                let level = info.level.unwrap_or(1);
                let heading = ContentBlock::new(
                    info.text.clone(),
                    BlockStyle::Heading,
                    info.style_id.clone(),
                    leading,
                    raw,
                    format,
                );
                let section = sections.insert(Section::new(info.text.trim().to_string(), normalized, role, heading));
                opener = Some(Opener {
                    role: section.role,
                    level,
                });
                continue;
            }

            let style = if info.level.is_some() {
                BlockStyle::Heading
            } else if info.is_bullet {
                BlockStyle::Bullet
            } else {
                BlockStyle::Plain
            };
            let block = ContentBlock::new(info.text, style, info.style_id, leading, raw, format);
            push_block(&mut preamble, &mut sections, block);
        }

        let epilogue = xml[cursor..].to_string();
        let personal = self.personal.parse(&preamble);

        info!(
            "Found {} section(s): {}",
            sections.len(),
            sections.keys().join(", ")
        );

        Ok(ExtractedDocument {
            source: source.to_path_buf(),
            package,
            prologue,
            epilogue,
            preamble,
            sections,
            personal,
        })
    }

    fn inspect_paragraph(&self, para: &Node) -> ParagraphInfo {
        let text = paragraph_text(para);
        let ppr = para.children().find(|n| is_w(n, "pPr"));

        let style_id = ppr
            .and_then(|ppr| ppr.children().find(|n| is_w(n, "pStyle")))
            .and_then(|ps| ps.attribute((W_NS, "val")))
            .map(str::to_string);
        let has_numbering = ppr.map_or(false, |ppr| ppr.children().any(|n| is_w(&n, "numPr")));
        // outlineLvl 9 is Word's "body text"
        let outline = ppr
            .and_then(|ppr| ppr.children().find(|n| is_w(n, "outlineLvl")))
            .and_then(|o| o.attribute((W_NS, "val")))
            .and_then(|v| v.parse::<u8>().ok())
            .filter(|&v| v < 9);

        let style_level = style_id.as_deref().and_then(|id| self.vocabulary.heading_level(id));
        let level = outline.map(|v| v + 1).or(style_level);
        let heading_styled = level.is_some();

        let list_styled = style_id
            .as_deref()
            .map_or(false, |id| id.contains("List") || id.contains("Bullet"));
        let glyph = text.trim_start().starts_with(BULLET_GLYPHS);
        let is_bullet = !heading_styled && (has_numbering || list_styled || glyph);

        ParagraphInfo {
            text,
            style_id,
            is_bullet,
            level,
        }
    }

    fn opens_unrecognised_section(&self, info: &ParagraphInfo, current: &Opener) -> bool {
        if info.is_bullet {
            return false;
        }
        let trimmed = info.text.trim();
        if trimmed.is_empty() {
            return false;
        }
        if let Some(level) = info.level {
            return level <= current.level;
        }

        let words = trimmed.split_whitespace().count();
        if words > self.vocabulary.max_heading_words || !is_all_caps(trimmed) {
            return false;
        }
        current.role == SectionRole::Other
    }
}

fn push_block(preamble: &mut Vec<ContentBlock>, sections: &mut SectionMap, block: ContentBlock) {
    match sections.last_mut() {
        Some(section) => section.content.push(block),
        None => preamble.push(block),
    }
}

fn is_w(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(W_NS)
}

fn is_all_caps(text: &str) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| !c.is_lowercase())
}

/// Visible text of a paragraph: runs, hyperlinks and fields, without text boxes.
pub(crate) fn paragraph_text(para: &Node) -> String {
    let mut text = String::new();
    collect_text(para, &mut text);
    text
}

fn collect_text(node: &Node, out: &mut String) {
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "t" => out.push_str(child.text().unwrap_or("")),
            "tab" => out.push('\t'),
            "br" | "cr" => out.push('\n'),
            "pPr" | "rPr" | "txbxContent" | "Fallback" | "delText" | "instrText" => {}
            _ => collect_text(&child, out),
        }
    }
}

fn embedded_text(node: &Node) -> String {
    node.descendants()
        .filter(|n| is_w(n, "p"))
        .map(|p| paragraph_text(&p))
        .filter(|t| !t.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn paragraph_format(para: &Node, xml: &str, raw: &str) -> BlockFormat {
    let paragraph_props = para
        .children()
        .find(|n| is_w(n, "pPr"))
        .map(|ppr| xml[ppr.range()].to_string());

    let text_runs: Vec<Node> = para
        .descendants()
        .filter(|n| is_w(n, "r"))
        .filter(|r| r.children().any(|c| is_w(&c, "t")))
        .collect();
    let props_of = |run: &Node| {
        run.children()
            .find(|c| is_w(c, "rPr"))
            .map(|rpr| xml[rpr.range()].to_string())
    };

    let run_props = text_runs.first().and_then(props_of);
    let label = match (text_runs.first(), text_runs.last()) {
        (Some(first), Some(last)) if text_runs.len() > 1 => {
            let text = paragraph_text(first);
            let tail_props = props_of(last);
            (!text.trim().is_empty() && tail_props != run_props).then_some(LabelRun { text, tail_props })
        }
        _ => None,
    };

    BlockFormat {
        prefix: element_prefix(raw),
        paragraph_props,
        run_props,
        label,
    }
}

/// Namespace prefix used by an element's start tag (`w` for `<w:p>`).
fn element_prefix(raw: &str) -> String {
    let tag = raw.trim_start_matches('<');
    let end = tag
        .find(|c: char| c == ':' || c == ' ' || c == '>' || c == '/')
        .unwrap_or(tag.len());
    if tag[end..].starts_with(':') {
        tag[..end].to_string()
    } else {
        String::new()
    }
}

/// Pattern-based contact detection over the preamble lines.
pub struct PersonalInfoParser {
    email_regex: Regex,
    phone_regex: Regex,
    link_regex: Regex,
}

impl Default for PersonalInfoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonalInfoParser {
    pub fn new() -> Self {
        let email_regex = Regex::new(r"[\w.+-]+@[\w-]+\.[\w.-]+").expect("Invalid email regex");
        let phone_regex = Regex::new(r"\+?\d[\d\s().-]{6,}\d").expect("Invalid phone regex");
        let link_regex = Regex::new(
            r"(?i)(?:https?://|www\.)[^\s|,;]+|\b(?:linkedin|github|gitlab)\.com/[^\s|,;]+",
        )
        .expect("Invalid link regex");

        Self {
            email_regex,
            phone_regex,
            link_regex,
        }
    }

    pub fn parse(&self, preamble: &[ContentBlock]) -> PersonalInfo {
        let mut info = PersonalInfo::default();
        let lines: Vec<&str> = preamble
            .iter()
            .flat_map(|b| b.text().lines())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        info.name = lines.iter().find(|l| self.looks_like_name(l)).map(|l| l.to_string());

        for line in &lines {
            if info.email.is_none() {
                info.email = self.email_regex.find(line).map(|m| m.as_str().to_string());
            }
            if info.phone.is_none() {
                info.phone = self
                    .phone_regex
                    .find_iter(line)
                    .map(|m| m.as_str().trim().to_string())
                    .find(|p| p.chars().filter(|c| c.is_ascii_digit()).count() >= 8);
            }
            for link in self.link_regex.find_iter(line) {
                let link = link.as_str().trim_end_matches(|c: char| c == ')' || c == '.').to_string();
                if !info.links.contains(&link) {
                    info.links.push(link);
                }
            }
        }

        info
    }

    fn looks_like_name(&self, line: &str) -> bool {
        line.split_whitespace().count() <= 6
            && !self.email_regex.is_match(line)
            && !self.link_regex.is_match(line)
            && !line.chars().any(|c| c.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str) -> ContentBlock {
        ContentBlock::new(
            text.to_string(),
            BlockStyle::Plain,
            None,
            String::new(),
            String::new(),
            BlockFormat::default(),
        )
    }

    #[test]
    fn test_personal_info_parsing() {
        let parser = PersonalInfoParser::new();
        let info = parser.parse(&[
            block("Jane Doe"),
            block("jane.doe@example.com | +49 151 2345 6789 | linkedin.com/in/janedoe"),
            block("https://github.com/janedoe"),
        ]);

        assert_eq!(info.name.as_deref(), Some("Jane Doe"));
        assert_eq!(info.email.as_deref(), Some("jane.doe@example.com"));
        assert_eq!(info.phone.as_deref(), Some("+49 151 2345 6789"));
        assert_eq!(
            info.links,
            vec!["linkedin.com/in/janedoe".to_string(), "https://github.com/janedoe".to_string()]
        );
    }

    #[test]
    fn test_personal_info_skips_contact_line_for_name() {
        let parser = PersonalInfoParser::new();
        let info = parser.parse(&[block("jane@example.com"), block("Jane Doe")]);
        assert_eq!(info.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_element_prefix() {
        assert_eq!(element_prefix("<w:p w14:paraId=\"1\">"), "w");
        assert_eq!(element_prefix("<p>"), "");
    }

    #[test]
    fn test_all_caps() {
        assert!(is_all_caps("WORK EXPERIENCE"));
        assert!(is_all_caps("C++ / SQL"));
        assert!(!is_all_caps("Work Experience"));
        assert!(!is_all_caps("—"));
    }

    #[test]
    fn test_paragraph_format_captures_label_run() {
        let xml = concat!(
            r#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Languages:</w:t></w:r>"#,
            r#"<w:r><w:rPr><w:sz w:val="22"/></w:rPr><w:t xml:space="preserve"> Python, SQL</w:t></w:r></w:p>"#
        );
        let doc = Document::parse(xml).unwrap();
        let format = paragraph_format(&doc.root_element(), xml, xml);

        assert_eq!(format.run_props.as_deref(), Some("<w:rPr><w:b/></w:rPr>"));
        assert_eq!(
            format.label,
            Some(LabelRun {
                text: "Languages:".to_string(),
                tail_props: Some(r#"<w:rPr><w:sz w:val="22"/></w:rPr>"#.to_string()),
            })
        );
    }

    #[test]
    fn test_paragraph_format_uniform_runs_have_no_label() {
        let xml = concat!(
            r#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            r#"<w:r><w:rPr><w:i/></w:rPr><w:t>Built </w:t></w:r>"#,
            r#"<w:r><w:rPr><w:i/></w:rPr><w:t>pipelines</w:t></w:r></w:p>"#
        );
        let doc = Document::parse(xml).unwrap();
        assert_eq!(paragraph_format(&doc.root_element(), xml, xml).label, None);
    }
}

//! Template rewriting: tailors Summary, Skills and Experience and writes a new document
//!
//! Only those three roles are ever mutated. Every other section, the preamble
//! and the personal info are copied through untouched. Service failures while
//! generating text are recovered per section by keeping the original content.

use crate::config::{RewriteConfig, SectionRole};
use crate::document::extractor::BULLET_GLYPHS;
use crate::document::model::{BlockStyle, ContentBlock, ExtractedDocument, PersonalInfo, Section, SectionMap};
use crate::document::writer::DocumentWriter;
use crate::error::{Result, TailorError};
use crate::llm::analyzer::RequirementsRecord;
use crate::llm::client::{generate_with_retry, strip_code_fences, GenerationOptions, GenerationRequest, TextGenerator};
use crate::llm::prompts::{PromptTemplates, WRITER_SYSTEM};
use crate::processing::matcher::KeywordMatcher;
use log::{debug, info, warn};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Keywords passed to the rephrase prompt.
const REPHRASE_KEYWORDS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionAction {
    Replaced,
    Reordered,
    Rephrased,
    Unchanged,
    /// Generation failed and the original content was kept
    FellBack,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionOutcome {
    pub role: SectionRole,
    pub section: Option<String>,
    pub action: SectionAction,
    pub detail: Option<String>,
}

impl SectionOutcome {
    fn new(role: SectionRole, section: &Section, action: SectionAction, detail: Option<String>) -> Self {
        Self {
            role,
            section: Some(section.name.clone()),
            action,
            detail,
        }
    }

    fn missing(role: SectionRole) -> Self {
        Self {
            role,
            section: None,
            action: SectionAction::Missing,
            detail: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RewriteReport {
    pub outcomes: Vec<SectionOutcome>,
    /// Requirement keywords found in the CV, in the casing the CV uses
    pub matched_keywords: Vec<String>,
    pub warnings: Vec<String>,
}

impl RewriteReport {
    pub fn outcome(&self, role: SectionRole) -> Option<&SectionOutcome> {
        self.outcomes.iter().find(|o| o.role == role)
    }

    pub fn has_fallbacks(&self) -> bool {
        self.outcomes.iter().any(|o| o.action == SectionAction::FellBack)
    }
}

/// The tailored section map plus the untouched personal info.
#[derive(Debug, Clone)]
pub struct RewriteResult {
    pub sections: SectionMap,
    pub personal: PersonalInfo,
    pub report: RewriteReport,
    pub output: PathBuf,
}

pub struct TemplateRewriter<'a, G: TextGenerator> {
    generator: Option<&'a G>,
    options: GenerationOptions,
    config: RewriteConfig,
    matcher: KeywordMatcher,
    prompts: PromptTemplates,
}

impl<'a, G: TextGenerator> TemplateRewriter<'a, G> {
    /// `generator` is `None` for offline runs: summaries are template-filled and nothing is rephrased.
    pub fn new(generator: Option<&'a G>, options: GenerationOptions, config: RewriteConfig) -> Self {
        let matcher = KeywordMatcher::new(config.match_policy, config.fuzzy_threshold);
        Self {
            generator,
            options,
            config,
            matcher,
            prompts: PromptTemplates::default(),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptTemplates) -> Self {
        self.prompts = prompts;
        self
    }

    /// Tailor `document` and write the result to `output`. The template file is never modified.
    pub async fn rewrite(
        &self,
        document: &ExtractedDocument,
        requirements: &RequirementsRecord,
        output: &Path,
    ) -> Result<RewriteResult> {
        let (sections, report) = self.rewrite_sections(document.sections(), requirements).await;

        let tailored = document.with_sections(sections.clone());
        DocumentWriter::write(&tailored, output)?;

        Ok(RewriteResult {
            sections,
            personal: document.personal().clone(),
            report,
            output: output.to_path_buf(),
        })
    }

    /// Produce the tailored section map. Never fails: a section whose rewrite
    /// cannot be completed keeps its original blocks.
    pub async fn rewrite_sections(
        &self,
        sections: &SectionMap,
        requirements: &RequirementsRecord,
    ) -> (SectionMap, RewriteReport) {
        let mut updated = sections.clone();
        let mut report = RewriteReport::default();

        if updated.is_empty() {
            report
                .warnings
                .push("No recognised sections; the document is copied unchanged".to_string());
            return (updated, report);
        }

        let cv_text = updated
            .iter()
            .map(|s| s.content.text())
            .collect::<Vec<_>>()
            .join("\n");
        report.matched_keywords = requirements
            .keywords()
            .iter()
            .filter(|k| self.matcher.matches(&cv_text, k))
            .map(|k| cv_casing(&cv_text, k))
            .collect();

        let top_skills: Vec<String> = report
            .matched_keywords
            .iter()
            .take(self.config.top_skills)
            .cloned()
            .collect();

        let outcome = match updated.by_role_mut(SectionRole::Summary) {
            Some(section) => self.rewrite_summary(section, requirements, &top_skills).await,
            None => SectionOutcome::missing(SectionRole::Summary),
        };
        report.outcomes.push(outcome);

        let outcome = match updated.by_role_mut(SectionRole::Skills) {
            Some(section) => self.reorder_skills(section, requirements.keywords()),
            None => SectionOutcome::missing(SectionRole::Skills),
        };
        report.outcomes.push(outcome);

        let outcome = match updated.by_role_mut(SectionRole::Experience) {
            Some(section) => self.rephrase_experience(section, requirements).await,
            None => SectionOutcome::missing(SectionRole::Experience),
        };
        report.outcomes.push(outcome);

        for outcome in &report.outcomes {
            if outcome.action == SectionAction::FellBack {
                report.warnings.push(format!(
                    "{} kept unchanged: {}",
                    outcome.section.as_deref().unwrap_or("section"),
                    outcome.detail.as_deref().unwrap_or("generation failed")
                ));
            }
        }

        (updated, report)
    }

    async fn rewrite_summary(
        &self,
        section: &mut Section,
        requirements: &RequirementsRecord,
        top_skills: &[String],
    ) -> SectionOutcome {
        let role = SectionRole::Summary;
        let Some(target) = section
            .content
            .blocks()
            .iter()
            .position(|b| b.style() == BlockStyle::Plain && !b.is_blank())
        else {
            return SectionOutcome::new(role, section, SectionAction::Unchanged, Some("no paragraph to replace".to_string()));
        };

        let original = section
            .content
            .blocks()
            .iter()
            .filter(|b| b.style() == BlockStyle::Plain && !b.is_blank())
            .map(|b| b.text().trim())
            .collect::<Vec<_>>()
            .join(" ");

        let generator = self.generator.filter(|_| self.config.generate_summary);
        let new_text = match generator {
            Some(generator) => {
                let prompt = self
                    .prompts
                    .render_summary(&original, requirements.summary_hint(), top_skills);
                match self.generate_text(generator, prompt).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Summary generation failed, keeping the original summary: {}", e);
                        return SectionOutcome::new(role, section, SectionAction::FellBack, Some(e.to_string()));
                    }
                }
            }
            None => match template_summary(requirements.summary_hint(), &original, top_skills) {
                Some(text) => text,
                None => {
                    return SectionOutcome::new(
                        role,
                        section,
                        SectionAction::Unchanged,
                        Some("no hint or matching skills".to_string()),
                    )
                }
            },
        };

        let blocks: Vec<ContentBlock> = section
            .content
            .blocks()
            .iter()
            .enumerate()
            .filter_map(|(i, block)| {
                if i == target {
                    Some(block.with_text(&new_text))
                } else if block.style() == BlockStyle::Plain && !block.is_blank() {
                    None
                } else {
                    Some(block.clone())
                }
            })
            .collect();
        *section.content.blocks_mut() = blocks;

        info!("Summary replaced ({} chars)", new_text.len());
        SectionOutcome::new(role, section, SectionAction::Replaced, None)
    }

    /// Stable promote/demote of skill items. Items only change slots; none is added or removed.
    fn reorder_skills(&self, section: &mut Section, keywords: &[String]) -> SectionOutcome {
        let role = SectionRole::Skills;
        let original = section.content.blocks().to_vec();

        let bullet_slots: Vec<usize> = original
            .iter()
            .enumerate()
            .filter(|(_, b)| b.style() == BlockStyle::Bullet)
            .map(|(i, _)| i)
            .collect();
        let slots = if bullet_slots.is_empty() {
            original
                .iter()
                .enumerate()
                .filter(|(_, b)| b.style() == BlockStyle::Plain && !b.is_blank())
                .map(|(i, _)| i)
                .collect()
        } else {
            bullet_slots
        };

        if slots.is_empty() || keywords.is_empty() {
            return SectionOutcome::new(role, section, SectionAction::Unchanged, None);
        }

        let texts: Vec<&str> = slots.iter().map(|&i| original[i].text()).collect();
        let order = self.matcher.promote_order(&texts, keywords);
        let promoted = texts.iter().filter(|t| self.matcher.matches_any(t, keywords)).count();

        let mut changed = false;
        let blocks = section.content.blocks_mut();
        for (slot_pos, &source_pos) in order.iter().enumerate() {
            if slot_pos != source_pos {
                changed = true;
            }
            blocks[slots[slot_pos]] = original[slots[source_pos]].clone();
        }

        let mut inline_changed = 0;
        if self.config.reorder_inline_lists {
            for &slot in &slots {
                if let Some(text) = self.reorder_inline_list(blocks[slot].text(), keywords) {
                    blocks[slot] = blocks[slot].with_text(&text);
                    inline_changed += 1;
                }
            }
        }

        if !changed && inline_changed == 0 {
            return SectionOutcome::new(role, section, SectionAction::Unchanged, None);
        }

        debug!("Skills: {} promoted item(s), {} inline list(s) reordered", promoted, inline_changed);
        let detail = format!("{} of {} item(s) promoted", promoted, slots.len());
        SectionOutcome::new(role, section, SectionAction::Reordered, Some(detail))
    }

    /// Reordered text for an inline list item, or `None` when the order would not change.
    fn reorder_inline_list(&self, text: &str, keywords: &[String]) -> Option<String> {
        let list = parse_inline_list(text)?;
        let order = self.matcher.promote_order(&list.entries, keywords);
        if order.iter().enumerate().all(|(i, &j)| i == j) {
            return None;
        }

        let joiner = match list.separator {
            ',' => ", ",
            ';' => "; ",
            '|' => " | ",
            _ => " • ",
        };
        let entries: Vec<&str> = order.iter().map(|&i| list.entries[i]).collect();
        Some(format!("{}{}{}", list.label, entries.join(joiner), list.suffix))
    }

    async fn rephrase_experience(&self, section: &mut Section, requirements: &RequirementsRecord) -> SectionOutcome {
        let role = SectionRole::Experience;
        let generator = match self.generator {
            Some(g) if self.config.rephrase_experience => g,
            _ => return SectionOutcome::new(role, section, SectionAction::Unchanged, Some("rephrasing not requested".to_string())),
        };
        if requirements.keywords().is_empty() {
            return SectionOutcome::new(role, section, SectionAction::Unchanged, Some("no keywords to target".to_string()));
        }

        let keywords: Vec<String> = requirements.keywords().iter().take(REPHRASE_KEYWORDS).cloned().collect();
        let weak: Vec<usize> = section
            .content
            .blocks()
            .iter()
            .enumerate()
            .filter(|(_, b)| b.style() == BlockStyle::Bullet && !b.is_blank())
            .filter(|(_, b)| self.matcher.hits(b.text(), requirements.keywords()) == 0)
            .map(|(i, _)| i)
            .take(self.config.max_rephrased_bullets)
            .collect();

        let mut rephrased = 0;
        let mut failures: Vec<String> = Vec::new();

        for index in weak {
            let original = section.content.blocks()[index].clone();
            let (glyph, body) = split_glyph(original.text());
            let prompt = self.prompts.render_rephrase(body, &keywords);

            match self.generate_text(generator, prompt).await {
                Ok(text) => {
                    let line = text.trim_start_matches(BULLET_GLYPHS).trim();
                    section.content.blocks_mut()[index] = original.with_text(&format!("{}{}", glyph, line));
                    rephrased += 1;
                }
                Err(e) => {
                    warn!("Keeping original bullet '{}': {}", body, e);
                    failures.push(e.to_string());
                }
            }
        }

        match (rephrased, failures.is_empty()) {
            (0, true) => SectionOutcome::new(role, section, SectionAction::Unchanged, Some("no weak bullets".to_string())),
            (0, false) => SectionOutcome::new(role, section, SectionAction::FellBack, Some(failures.join("; "))),
            (n, true) => SectionOutcome::new(role, section, SectionAction::Rephrased, Some(format!("{} bullet(s)", n))),
            (n, false) => SectionOutcome::new(
                role,
                section,
                SectionAction::Rephrased,
                Some(format!("{} bullet(s), {} kept after failures", n, failures.len())),
            ),
        }
    }

    async fn generate_text(&self, generator: &G, prompt: String) -> Result<String> {
        let request = GenerationRequest::new(WRITER_SYSTEM, prompt, &self.options);
        let reply = generate_with_retry(generator, &request).await?;
        let text = clean_generated(&reply);
        if text.is_empty() {
            return Err(TailorError::Service {
                message: "service returned empty text".to_string(),
                transient: false,
            });
        }
        Ok(text)
    }
}

/// Single-paragraph text from a generation reply: fences, wrapping quotes and line breaks removed.
fn clean_generated(reply: &str) -> String {
    strip_code_fences(reply)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '"' || c == '“' || c == '”')
        .trim()
        .to_string()
}

/// `"{hint} Key strengths include {skills}."`, with the original summary standing in for an empty hint.
pub fn template_summary(hint: &str, original: &str, skills: &[String]) -> Option<String> {
    let hint = hint.trim();
    let lead = if hint.is_empty() { original.trim() } else { hint };

    if skills.is_empty() {
        return (!hint.is_empty() && hint != original.trim()).then(|| as_sentence(hint));
    }

    let strengths = format!("Key strengths include {}.", join_human(skills));
    if lead.is_empty() {
        Some(strengths)
    } else {
        Some(format!("{} {}", as_sentence(lead), strengths))
    }
}

fn as_sentence(text: &str) -> String {
    if text.ends_with(['.', '!', '?']) {
        text.to_string()
    } else {
        format!("{}.", text)
    }
}

fn join_human(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// The keyword as the CV spells it, or the keyword itself when it only matched loosely.
fn cv_casing(cv_text: &str, keyword: &str) -> String {
    let pattern = format!(r"(?i)(?:^|[^\w])({})(?:$|[^\w])", regex::escape(keyword));
    Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(cv_text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| keyword.to_string())
}

/// Leading bullet glyph (with its spacing) and the remaining text.
fn split_glyph(text: &str) -> (&str, &str) {
    let trimmed = text.trim_start();
    match trimmed.strip_prefix(BULLET_GLYPHS) {
        Some(rest) => {
            let body = rest.trim_start();
            let prefix_len = text.len() - body.len();
            (&text[..prefix_len], body)
        }
        None => ("", text.trim()),
    }
}

#[derive(Debug, PartialEq)]
struct InlineList<'t> {
    label: &'t str,
    entries: Vec<&'t str>,
    separator: char,
    suffix: &'t str,
}

/// `Languages: Python, SQL, Docker` style items: at least three short entries after an optional label.
fn parse_inline_list(text: &str) -> Option<InlineList<'_>> {
    let text = text.trim_end();
    let (_, rest) = split_glyph(text);
    let offset = text.len() - rest.len();

    let body_start = match rest.find(':') {
        Some(i) if rest[..i].split_whitespace().count() <= 4 => {
            let after = &rest[i + 1..];
            offset + i + 1 + (after.len() - after.trim_start().len())
        }
        _ => offset,
    };
    let label = &text[..body_start];
    let body = &text[body_start..];
    let (body, suffix) = match body.strip_suffix('.') {
        Some(stripped) => (stripped, "."),
        None => (body, ""),
    };

    let separator = [',', ';', '|', '•']
        .into_iter()
        .find(|&c| split_top_level(body, c).map_or(false, |parts| parts.len() > 1))?;
    let entries: Vec<&str> = split_top_level(body, separator)?.into_iter().map(str::trim).collect();
    if entries.len() < 3 || entries.iter().any(|e| e.is_empty() || e.split_whitespace().count() > 4) {
        return None;
    }

    Some(InlineList {
        label,
        entries,
        separator,
        suffix,
    })
}

/// Split on `separator` outside brackets. `None` when the brackets do not balance.
fn split_top_level(text: &str, separator: char) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.checked_sub(1)?,
            c if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&text[start..]);
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::document::model::BlockFormat;

    struct Offline;

    impl TextGenerator for Offline {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            Err(TailorError::Service {
                message: "offline".to_string(),
                transient: false,
            })
        }
    }

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

    fn section(name: &str, role: SectionRole, blocks: Vec<ContentBlock>) -> Section {
        let mut section = Section::new(name.to_string(), name.to_string(), role, block(name, BlockStyle::Heading));
        for b in blocks {
            section.content.push(b);
        }
        section
    }

    fn scenario_sections() -> SectionMap {
        let mut map = SectionMap::new();
        map.insert(section(
            "Summary",
            SectionRole::Summary,
            vec![block("Generalist engineer.", BlockStyle::Plain)],
        ));
        map.insert(section(
            "Skills",
            SectionRole::Skills,
            vec![
                block("Python", BlockStyle::Bullet),
                block("SQL", BlockStyle::Bullet),
                block("Docker", BlockStyle::Bullet),
            ],
        ));
        map.insert(section(
            "Experience",
            SectionRole::Experience,
            vec![block("Built data pipelines", BlockStyle::Bullet)],
        ));
        map
    }

    fn texts(section: &Section) -> Vec<&str> {
        section.content.blocks().iter().map(|b| b.text()).collect()
    }

    #[tokio::test]
    async fn test_offline_scenario() {
        let rewriter = TemplateRewriter::<Offline>::new(
            None,
            GenerationOptions::from(&ServiceConfig::default()),
            RewriteConfig::default(),
        );
        let requirements = RequirementsRecord::new(&["docker", "kubernetes"], None, String::new(), "job".to_string());

        let (sections, report) = rewriter.rewrite_sections(&scenario_sections(), &requirements).await;

        assert_eq!(texts(sections.get("skills").unwrap()), vec!["Docker", "Python", "SQL"]);
        let summary = texts(sections.get("summary").unwrap())[0].to_string();
        assert_eq!(summary, "Generalist engineer. Key strengths include Docker.");
        assert_eq!(texts(sections.get("experience").unwrap()), vec!["Built data pipelines"]);
        assert_eq!(report.matched_keywords, vec!["Docker".to_string()]);
        assert_eq!(report.outcome(SectionRole::Skills).unwrap().action, SectionAction::Reordered);
    }

    #[tokio::test]
    async fn test_summary_generation_failure_keeps_original() {
        let generator = Offline;
        let rewriter = TemplateRewriter::new(
            Some(&generator),
            GenerationOptions::from(&ServiceConfig::default()),
            RewriteConfig {
                rephrase_experience: true,
                ..RewriteConfig::default()
            },
        );
        let requirements = RequirementsRecord::new(&["docker"], None, "hint".to_string(), "job".to_string());

        let (sections, report) = rewriter.rewrite_sections(&scenario_sections(), &requirements).await;

        assert_eq!(texts(sections.get("summary").unwrap()), vec!["Generalist engineer."]);
        assert_eq!(texts(sections.get("experience").unwrap()), vec!["Built data pipelines"]);
        assert_eq!(report.outcome(SectionRole::Summary).unwrap().action, SectionAction::FellBack);
        assert_eq!(report.outcome(SectionRole::Experience).unwrap().action, SectionAction::FellBack);
        assert!(report.has_fallbacks());
        assert_eq!(report.warnings.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_map_is_a_no_op() {
        let rewriter = TemplateRewriter::<Offline>::new(
            None,
            GenerationOptions::from(&ServiceConfig::default()),
            RewriteConfig::default(),
        );
        let requirements = RequirementsRecord::new(&["docker"], None, String::new(), "job".to_string());

        let (sections, report) = rewriter.rewrite_sections(&SectionMap::new(), &requirements).await;
        assert!(sections.is_empty());
        assert!(report.outcomes.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_template_summary() {
        let skills = vec!["Docker".to_string(), "Python".to_string(), "SQL".to_string()];
        assert_eq!(
            template_summary("Container platform engineer", "Old.", &skills).unwrap(),
            "Container platform engineer. Key strengths include Docker, Python and SQL."
        );
        assert_eq!(template_summary("", "Old", &[]), None);
        assert_eq!(template_summary("New focus!", "Old", &[]).unwrap(), "New focus!");
    }

    #[test]
    fn test_parse_inline_list() {
        let list = parse_inline_list("• Languages: Python, SQL, Docker.").unwrap();
        assert_eq!(list.label, "• Languages: ");
        assert_eq!(list.entries, vec!["Python", "SQL", "Docker"]);
        assert_eq!(list.suffix, ".");

        assert!(parse_inline_list("Python and SQL").is_none());
        assert!(parse_inline_list("Led a team, shipped a product on time every quarter, hired").is_none());
    }

    #[test]
    fn test_inline_list_respects_brackets() {
        let list = parse_inline_list("Python (Django, Flask), SQL, Docker").unwrap();
        assert_eq!(list.entries, vec!["Python (Django, Flask)", "SQL", "Docker"]);

        assert!(parse_inline_list("Python (Django, Flask, SQL, Docker").is_none());
        assert!(parse_inline_list("Python) Django, Flask, SQL").is_none());
        assert_eq!(split_top_level("a [b; c]; d", ';').unwrap(), vec!["a [b; c]", " d"]);
    }

    #[test]
    fn test_bracketed_entry_moves_whole() {
        let rewriter = TemplateRewriter::<Offline>::new(
            None,
            GenerationOptions::from(&ServiceConfig::default()),
            RewriteConfig::default(),
        );
        let keywords = vec!["flask".to_string()];

        assert!(rewriter
            .reorder_inline_list("Python (Django, Flask), SQL, Docker", &keywords)
            .is_none());
        assert_eq!(
            rewriter
                .reorder_inline_list("SQL, Docker, Python (Django, Flask)", &keywords)
                .unwrap(),
            "Python (Django, Flask), SQL, Docker"
        );
    }

    #[test]
    fn test_inline_list_reorder_keeps_every_entry() {
        let rewriter = TemplateRewriter::<Offline>::new(
            None,
            GenerationOptions::from(&ServiceConfig::default()),
            RewriteConfig::default(),
        );
        let keywords = vec!["docker".to_string()];

        assert_eq!(
            rewriter.reorder_inline_list("Tools: Python, SQL, Docker", &keywords).unwrap(),
            "Tools: Docker, Python, SQL"
        );
        assert!(rewriter.reorder_inline_list("Tools: Docker, Python, SQL", &keywords).is_none());
    }

    #[test]
    fn test_split_glyph_and_casing() {
        assert_eq!(split_glyph("• Built APIs"), ("• ", "Built APIs"));
        assert_eq!(split_glyph("Built APIs"), ("", "Built APIs"));
        assert_eq!(cv_casing("Skilled in PostgreSQL and C++", "postgresql"), "PostgreSQL");
        assert_eq!(cv_casing("Skilled in C++.", "c++"), "C++");
        assert_eq!(cv_casing("nothing here", "rust"), "rust");
    }
}

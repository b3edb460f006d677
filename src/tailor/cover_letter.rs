//! Cover letter tailoring: regenerates the letter body between greeting and closing

use crate::document::model::{BlockStyle, ContentBlock, ExtractedDocument};
use crate::document::writer::DocumentWriter;
use crate::error::Result;
use crate::llm::analyzer::RequirementsRecord;
use crate::llm::client::{generate_with_retry, strip_code_fences, GenerationOptions, GenerationRequest, TextGenerator};
use crate::llm::prompts::{PromptTemplates, COVER_LETTER_SYSTEM};
use crate::tailor::rewriter::SectionAction;
use log::{info, warn};
use serde::Serialize;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

const GREETINGS: &[&str] = &["dear ", "hello", "hi ", "hi,", "to whom", "good morning", "good afternoon"];
const CLOSINGS: &[&str] = &[
    "sincerely",
    "best regards",
    "kind regards",
    "warm regards",
    "regards",
    "yours",
    "thank you",
    "best wishes",
];
const HEADER_PREFIXES: &[&str] = &["name:", "address:", "phone:", "email:", "date:", "mobile:", "tel:", "website:"];
/// Leading lines this short are treated as letterhead when there is no greeting.
const HEADER_MAX_WORDS: usize = 6;

#[derive(Debug, Clone, Serialize)]
pub struct CoverLetterResult {
    pub output: PathBuf,
    pub action: SectionAction,
    pub detail: Option<String>,
    pub paragraphs: usize,
}

pub struct CoverLetterRewriter<'a, G: TextGenerator> {
    generator: Option<&'a G>,
    options: GenerationOptions,
    prompts: PromptTemplates,
}

impl<'a, G: TextGenerator> CoverLetterRewriter<'a, G> {
    pub fn new(generator: Option<&'a G>, options: GenerationOptions) -> Self {
        Self {
            generator,
            options,
            prompts: PromptTemplates::default(),
        }
    }

    /// Tailor the letter body and write the letter to `output`. Any generation
    /// failure writes the letter unchanged; header, greeting and closing are never touched.
    pub async fn rewrite(
        &self,
        document: &ExtractedDocument,
        requirements: &RequirementsRecord,
        output: &Path,
    ) -> Result<CoverLetterResult> {
        let letter = document.flattened();
        let blocks = letter.preamble();

        let (action, detail, new_blocks, paragraphs) = match self.tailor_blocks(blocks, requirements).await {
            Ok((new_blocks, paragraphs)) => (SectionAction::Replaced, None, Some(new_blocks), paragraphs),
            Err((action, reason)) => {
                if action == SectionAction::FellBack {
                    warn!("Cover letter kept unchanged: {}", reason);
                }
                (action, Some(reason), None, 0)
            }
        };

        let tailored = match new_blocks {
            Some(new_blocks) => letter.with_preamble(new_blocks),
            None => letter,
        };
        DocumentWriter::write(&tailored, output)?;

        Ok(CoverLetterResult {
            output: output.to_path_buf(),
            action,
            detail,
            paragraphs,
        })
    }

    async fn tailor_blocks(
        &self,
        blocks: &[ContentBlock],
        requirements: &RequirementsRecord,
    ) -> std::result::Result<(Vec<ContentBlock>, usize), (SectionAction, String)> {
        let Some(generator) = self.generator else {
            return Err((SectionAction::Unchanged, "no generation service (offline)".to_string()));
        };
        let Some(range) = find_body(blocks) else {
            return Err((SectionAction::Unchanged, "no letter body found".to_string()));
        };
        if blocks[range.clone()].iter().any(|b| b.style() == BlockStyle::Embedded) {
            return Err((SectionAction::Unchanged, "letter body contains tables or embedded content".to_string()));
        }

        let body = blocks[range.clone()]
            .iter()
            .filter(|b| !b.is_blank())
            .map(|b| b.text().trim())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = self
            .prompts
            .render_cover_letter(requirements.source_text(), &body, requirements.summary_hint());
        let request = GenerationRequest::new(COVER_LETTER_SYSTEM, prompt, &self.options);
        let reply = generate_with_retry(generator, &request)
            .await
            .map_err(|e| (SectionAction::FellBack, e.to_string()))?;

        let paragraphs = split_paragraphs(strip_code_fences(&reply));
        if paragraphs.is_empty() {
            return Err((SectionAction::FellBack, "service returned an empty letter body".to_string()));
        }

        let body_blocks = &blocks[range.clone()];
        let template = body_blocks.iter().find(|b| !b.is_blank()).unwrap_or(&body_blocks[0]);
        let spacer = body_blocks.iter().find(|b| b.is_blank());

        let mut rebuilt: Vec<ContentBlock> = blocks[..*range.start()].to_vec();
        for (i, paragraph) in paragraphs.iter().enumerate() {
            if i > 0 {
                if let Some(spacer) = spacer {
                    rebuilt.push(spacer.clone());
                }
            }
            rebuilt.push(template.with_text(paragraph));
        }
        rebuilt.extend_from_slice(&blocks[range.end() + 1..]);

        info!("Cover letter body rewritten into {} paragraph(s)", paragraphs.len());
        Ok((rebuilt, paragraphs.len()))
    }
}

/// Index range of the letter body: after the greeting and before the closing.
fn find_body(blocks: &[ContentBlock]) -> Option<RangeInclusive<usize>> {
    let lower: Vec<String> = blocks.iter().map(|b| b.text().trim().to_lowercase()).collect();
    let starts_with_any = |text: &str, markers: &[&str]| markers.iter().any(|m| text.starts_with(m));

    let greeting = lower.iter().position(|t| starts_with_any(t, GREETINGS));

    let start = match greeting {
        Some(g) => g + 1,
        None => lower
            .iter()
            .position(|t| {
                !t.is_empty()
                    && !starts_with_any(t, HEADER_PREFIXES)
                    && t.split_whitespace().count() > HEADER_MAX_WORDS
            })?,
    };

    let closing = lower
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, t)| starts_with_any(t, CLOSINGS))
        .map(|(i, _)| i);

    let end = match closing {
        Some(c) => c.checked_sub(1)?,
        None => lower
            .iter()
            .enumerate()
            .rev()
            .find(|(_, t)| !t.is_empty() && !starts_with_any(t, HEADER_PREFIXES))
            .map(|(i, _)| i)?,
    };

    // Trim spacer paragraphs off both ends
    let first = (start..=end).find(|&i| !lower[i].is_empty())?;
    let last = (first..=end).rev().find(|&i| !lower[i].is_empty())?;
    Some(first..=last)
}

fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|p| {
            p.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::BlockFormat;

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

    fn letter(lines: &[&str]) -> Vec<ContentBlock> {
        lines.iter().map(|l| block(l)).collect()
    }

    #[test]
    fn test_body_between_greeting_and_closing() {
        let blocks = letter(&[
            "Jane Doe",
            "jane@example.com",
            "",
            "Dear Hiring Manager,",
            "",
            "I am writing to apply for the platform role at your company.",
            "",
            "I have run Docker in production for years.",
            "",
            "Kind regards,",
            "Jane Doe",
        ]);
        assert_eq!(find_body(&blocks), Some(5..=7));
    }

    #[test]
    fn test_body_without_greeting_or_closing() {
        let blocks = letter(&[
            "Jane Doe",
            "Date: 1 March",
            "I am writing to apply for the platform role at your company.",
            "I have run Docker in production for many years now.",
            "",
        ]);
        assert_eq!(find_body(&blocks), Some(2..=3));
    }

    #[test]
    fn test_no_body() {
        assert_eq!(find_body(&letter(&["Dear Sir,", "Sincerely,"])), None);
        assert_eq!(find_body(&letter(&["Jane Doe"])), None);
    }

    #[test]
    fn test_split_paragraphs() {
        assert_eq!(
            split_paragraphs("First line\ncontinues.\n\n\n\nSecond."),
            vec!["First line continues.".to_string(), "Second.".to_string()]
        );
    }
}

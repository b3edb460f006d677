//! Report structures describing a tailoring run or a template inspection

use crate::document::model::{ContentBlock, ExtractedDocument, PersonalInfo, Section};
use crate::llm::analyzer::RequirementsRecord;
use crate::tailor::cover_letter::CoverLetterResult;
use crate::tailor::rewriter::{RewriteReport, RewriteResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub template: PathBuf,
    /// Model used for generation, `None` for offline runs
    pub model: Option<String>,
    pub tool_version: String,
}

impl ReportMetadata {
    pub fn new(template: PathBuf, model: Option<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            template,
            model,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// What the analysis extracted from the job description.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementsSummary {
    pub keywords: Vec<String>,
    pub seniority: Option<String>,
    pub summary_hint: String,
}

impl From<&RequirementsRecord> for RequirementsSummary {
    fn from(record: &RequirementsRecord) -> Self {
        Self {
            keywords: record.keywords().to_vec(),
            seniority: record.seniority().map(str::to_string),
            summary_hint: record.summary_hint().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TailoringReport {
    pub metadata: ReportMetadata,
    pub requirements: RequirementsSummary,
    pub rewrite: RewriteReport,
    pub output: PathBuf,
    pub cover_letter: Option<CoverLetterResult>,
}

impl TailoringReport {
    pub fn new(
        metadata: ReportMetadata,
        requirements: &RequirementsRecord,
        result: &RewriteResult,
        cover_letter: Option<CoverLetterResult>,
    ) -> Self {
        Self {
            metadata,
            requirements: RequirementsSummary::from(requirements),
            rewrite: result.report.clone(),
            output: result.output.clone(),
            cover_letter,
        }
    }
}

/// Everything the extractor recognised in a template.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub template: PathBuf,
    pub personal: PersonalInfo,
    pub preamble: Vec<ContentBlock>,
    pub sections: Vec<Section>,
}

impl From<&ExtractedDocument> for InspectionReport {
    fn from(document: &ExtractedDocument) -> Self {
        Self {
            template: document.source().to_path_buf(),
            personal: document.personal().clone(),
            preamble: document.preamble().to_vec(),
            sections: document.sections().iter().cloned().collect(),
        }
    }
}

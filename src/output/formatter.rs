//! Console and JSON rendering of reports

use crate::config::SectionRole;
use crate::document::model::{BlockStyle, ContentBlock};
use crate::error::Result;
use crate::output::report::{InspectionReport, TailoringReport};
use crate::tailor::batch::BatchSummary;
use crate::tailor::rewriter::SectionAction;
use colored::{Color, Colorize};
use std::path::Path;
use std::str::FromStr;

/// Longest block text shown in console inspection output
const PREVIEW_CHARS: usize = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}. Supported: console, json", s)),
        }
    }
}

pub trait OutputFormatter {
    fn format_tailoring(&self, report: &TailoringReport) -> Result<String>;
    fn format_inspection(&self, report: &InspectionReport) -> Result<String>;
    fn format_batch(&self, summary: &BatchSummary) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{}\n", title.blue().bold())
        } else {
            format!("\n{}\n", title)
        }
    }

    fn format_action(&self, action: SectionAction) -> String {
        let (label, color) = match action {
            SectionAction::Replaced => ("replaced", Color::Green),
            SectionAction::Reordered => ("reordered", Color::Green),
            SectionAction::Rephrased => ("rephrased", Color::Green),
            SectionAction::Unchanged => ("unchanged", Color::White),
            SectionAction::FellBack => ("kept (fallback)", Color::Yellow),
            SectionAction::Missing => ("not found", Color::BrightBlack),
        };
        self.colorize(label, color)
    }

    fn format_block(&self, block: &ContentBlock) -> String {
        let marker = match block.style() {
            BlockStyle::Heading => "#",
            BlockStyle::Bullet => "*",
            BlockStyle::Plain => " ",
            BlockStyle::Embedded => "=",
        };
        let text = if block.is_blank() {
            self.colorize("(empty)", Color::BrightBlack)
        } else {
            preview(block.text().trim())
        };
        match block.style_id() {
            Some(id) => format!("  {} {} {}\n", marker, text, self.colorize(&format!("[{}]", id), Color::BrightBlack)),
            None => format!("  {} {}\n", marker, text),
        }
    }
}

fn role_label(role: SectionRole) -> &'static str {
    match role {
        SectionRole::Summary => "Summary",
        SectionRole::Skills => "Skills",
        SectionRole::Experience => "Experience",
        SectionRole::Education => "Education",
        SectionRole::Projects => "Projects",
        SectionRole::Other => "Other",
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(PREVIEW_CHARS).collect::<String>())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_tailoring(&self, report: &TailoringReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("CV TAILORING REPORT"));
        output.push_str(&format!(
            "Generated: {} | Template: {}\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.template.display()
        ));
        output.push_str(&format!(
            "Mode: {}\n",
            match &report.metadata.model {
                Some(model) => format!("online ({})", model),
                None => "offline".to_string(),
            }
        ));

        output.push_str(&self.format_header("Job requirements"));
        if report.requirements.keywords.is_empty() {
            output.push_str(&format!("Keywords: {}\n", self.colorize("none found", Color::Yellow)));
        } else {
            output.push_str(&format!("Keywords: {}\n", report.requirements.keywords.join(", ")));
        }
        if let Some(seniority) = &report.requirements.seniority {
            output.push_str(&format!("Seniority: {}\n", seniority));
        }
        if !report.requirements.summary_hint.is_empty() {
            output.push_str(&format!(
                "Profile: {}\n",
                self.colorize(&report.requirements.summary_hint, Color::Cyan)
            ));
        }

        output.push_str(&self.format_header("Sections"));
        for outcome in &report.rewrite.outcomes {
            output.push_str(&format!(
                "{:<12} {}",
                role_label(outcome.role),
                self.format_action(outcome.action)
            ));
            if let Some(detail) = &outcome.detail {
                output.push_str(&format!(" - {}", detail));
            }
            output.push('\n');
        }
        if !report.rewrite.matched_keywords.is_empty() {
            output.push_str(&format!(
                "Matched in CV: {}\n",
                self.colorize(&report.rewrite.matched_keywords.join(", "), Color::Green)
            ));
        }

        if !report.rewrite.warnings.is_empty() {
            output.push_str(&self.format_header("Warnings"));
            for warning in &report.rewrite.warnings {
                output.push_str(&format!("{} {}\n", self.colorize("!", Color::Yellow), warning));
            }
        }

        output.push_str(&self.format_header("Output"));
        output.push_str(&format!("CV: {}\n", self.colorize(&report.output.display().to_string(), Color::Green)));
        if let Some(letter) = &report.cover_letter {
            output.push_str(&format!(
                "Cover letter: {} ({})\n",
                self.colorize(&letter.output.display().to_string(), Color::Green),
                self.format_action(letter.action)
            ));
        }

        Ok(output)
    }

    fn format_inspection(&self, report: &InspectionReport) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.format_header(&format!("TEMPLATE {}", report.template.display())));

        output.push_str(&self.format_header("Personal info"));
        let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        output.push_str(&format!("Name:  {}\n", field(&report.personal.name)));
        output.push_str(&format!("Email: {}\n", field(&report.personal.email)));
        output.push_str(&format!("Phone: {}\n", field(&report.personal.phone)));
        if !report.personal.links.is_empty() {
            output.push_str(&format!("Links: {}\n", report.personal.links.join(", ")));
        }

        output.push_str(&self.format_header(&format!("Preamble ({} blocks)", report.preamble.len())));
        for block in &report.preamble {
            output.push_str(&self.format_block(block));
        }

        if report.sections.is_empty() {
            output.push_str(&format!(
                "\n{}\n",
                self.colorize("No recognised section headings. Check the heading vocabulary in the config.", Color::Yellow)
            ));
        }
        for section in &report.sections {
            let title = format!("{} [{}] ({})", section.name, section.key, role_label(section.role));
            output.push_str(&self.format_header(&title));
            for block in section.content.blocks() {
                output.push_str(&self.format_block(block));
            }
        }

        Ok(output)
    }

    fn format_batch(&self, summary: &BatchSummary) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.format_header("BATCH SUMMARY"));
        output.push_str(&format!(
            "{} generated, {} skipped\n",
            self.colorize(&summary.generated.len().to_string(), Color::Green),
            self.colorize(&summary.skipped.len().to_string(), Color::Yellow)
        ));

        for job in &summary.generated {
            output.push_str(&format!("  {} {} -> {}\n", self.colorize("+", Color::Green), job.job, job.cv.display()));
            if let Some(letter) = &job.cover_letter {
                output.push_str(&format!("      cover letter -> {}\n", letter.output.display()));
            }
            for warning in &job.report.warnings {
                output.push_str(&format!("      {} {}\n", self.colorize("!", Color::Yellow), warning));
            }
        }
        for job in &summary.skipped {
            output.push_str(&format!("  {} {}: {}\n", self.colorize("-", Color::Red), job.job, job.reason));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_tailoring(&self, report: &TailoringReport) -> Result<String> {
        self.render(report)
    }

    fn format_inspection(&self, report: &InspectionReport) -> Result<String> {
        self.render(report)
    }

    fn format_batch(&self, summary: &BatchSummary) -> Result<String> {
        self.render(summary)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, true)
    }

    pub fn with_options(use_colors: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(pretty_json),
        }
    }

    pub fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::{ReportMetadata, RequirementsSummary};
    use crate::tailor::batch::SkippedJob;
    use crate::tailor::rewriter::{RewriteReport, SectionOutcome};
    use std::path::PathBuf;

    fn sample_report() -> TailoringReport {
        TailoringReport {
            metadata: ReportMetadata::new(PathBuf::from("cv.docx"), None),
            requirements: RequirementsSummary {
                keywords: vec!["docker".to_string(), "kubernetes".to_string()],
                seniority: Some("senior".to_string()),
                summary_hint: "Platform engineer".to_string(),
            },
            rewrite: RewriteReport {
                outcomes: vec![SectionOutcome {
                    role: SectionRole::Skills,
                    section: Some("Skills".to_string()),
                    action: SectionAction::Reordered,
                    detail: Some("1 of 3 item(s) promoted".to_string()),
                }],
                matched_keywords: vec!["Docker".to_string()],
                warnings: vec![],
            },
            output: PathBuf::from("out/CV.docx"),
            cover_letter: None,
        }
    }

    #[test]
    fn test_console_tailoring_report() {
        let text = ConsoleFormatter::new(false).format_tailoring(&sample_report()).unwrap();
        assert!(text.contains("Mode: offline"));
        assert!(text.contains("Keywords: docker, kubernetes"));
        assert!(text.contains("Skills       reordered - 1 of 3 item(s) promoted"));
        assert!(text.contains("CV: out/CV.docx"));
    }

    #[test]
    fn test_json_tailoring_report() {
        let text = JsonFormatter::new(false).format_tailoring(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["rewrite"]["outcomes"][0]["action"], "reordered");
        assert_eq!(value["rewrite"]["outcomes"][0]["role"], "skills");
        assert_eq!(value["metadata"]["model"], serde_json::Value::Null);
    }

    #[test]
    fn test_console_batch_summary() {
        let summary = BatchSummary {
            generated: vec![],
            skipped: vec![SkippedJob {
                job: "Dev at Acme".to_string(),
                reason: "Analysis service error: 503".to_string(),
            }],
        };
        let text = ReportGenerator::with_options(false, true)
            .formatter(OutputFormat::Console)
            .format_batch(&summary)
            .unwrap();
        assert!(text.contains("0 generated, 1 skipped"));
        assert!(text.contains("- Dev at Acme: Analysis service error: 503"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }
}

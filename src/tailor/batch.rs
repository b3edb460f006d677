//! Sequential batch tailoring over a list of job postings
//!
//! Each job gets a fresh extraction of the template, its own analysis and its
//! own output files. A job that fails is recorded as skipped and the batch
//! moves on.

use crate::config::Config;
use crate::document::extractor::SectionExtractor;
use crate::error::{Result, TailorError};
use crate::input::file_detector::FileType;
use crate::input::InputManager;
use crate::llm::analyzer::{JobAnalyzer, RequirementsRecord};
use crate::llm::client::{GenerationOptions, TextGenerator};
use crate::processing::catalog::SkillCatalog;
use crate::tailor::cover_letter::{CoverLetterResult, CoverLetterRewriter};
use crate::tailor::rewriter::{RewriteReport, TemplateRewriter};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const FORBIDDEN_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_file: Option<PathBuf>,
    /// Listing URL; turning it into text is left to external tooling
    #[serde(default)]
    pub url: Option<String>,
}

impl JobPosting {
    /// The description text, or `None` when the posting only carries a URL.
    pub async fn description_text(&self, input: &InputManager) -> Result<Option<String>> {
        if let Some(text) = self.description.as_deref().filter(|t| !t.trim().is_empty()) {
            return Ok(Some(text.to_string()));
        }
        match &self.description_file {
            Some(path) => Ok(Some(input.read_job_text(path).await?)),
            None => Ok(None),
        }
    }

    pub fn label(&self) -> String {
        if self.company.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} at {}", self.title, self.company)
        }
    }
}

/// Load jobs from a JSON manifest, or from a directory of `.txt`/`.md`/`.pdf` descriptions.
pub fn load_manifest(path: &Path) -> Result<Vec<JobPosting>> {
    if path.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && FileType::from_path(p).is_supported())
            .collect();
        files.sort();

        return Ok(files
            .into_iter()
            .map(|file| JobPosting {
                title: file
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default(),
                company: String::new(),
                description: None,
                description_file: Some(file),
                url: None,
            })
            .collect());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        TailorError::InvalidInput(format!("Cannot read manifest '{}': {}", path.display(), e))
    })?;
    let mut jobs: Vec<JobPosting> = serde_json::from_str(&content)?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for job in &mut jobs {
        if let Some(file) = &job.description_file {
            if file.is_relative() {
                job.description_file = Some(base.join(file));
            }
        }
    }

    Ok(jobs)
}

/// `{prefix}_{YYYY-MM-DD}_{company}_{title}.docx`, with path-hostile characters replaced.
pub fn output_file_name(prefix: &str, date: Option<NaiveDate>, company: &str, title: &str) -> String {
    let mut parts = vec![sanitize(prefix)];
    if let Some(date) = date {
        parts.push(date.format("%Y-%m-%d").to_string());
    }
    for part in [company, title] {
        let part = sanitize(part);
        if !part.is_empty() {
            parts.push(part);
        }
    }
    format!("{}.docx", parts.join("_"))
}

fn sanitize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Hands out output paths, never the same one twice within a run and never an existing file.
#[derive(Debug)]
pub struct OutputNamer {
    directory: PathBuf,
    date: Option<NaiveDate>,
    used: HashSet<PathBuf>,
}

impl OutputNamer {
    pub fn new(directory: PathBuf, date: Option<NaiveDate>) -> Self {
        Self {
            directory,
            date,
            used: HashSet::new(),
        }
    }

    pub fn next_path(&mut self, prefix: &str, job: &JobPosting) -> PathBuf {
        let name = output_file_name(prefix, self.date, &job.company, &job.title);
        let stem = name.trim_end_matches(".docx").to_string();

        let mut candidate = self.directory.join(&name);
        let mut n = 2;
        while self.used.contains(&candidate) || candidate.exists() {
            candidate = self.directory.join(format!("{}_{}.docx", stem, n));
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedJob {
    pub job: String,
    pub cv: PathBuf,
    pub cover_letter: Option<CoverLetterResult>,
    pub report: RewriteReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedJob {
    pub job: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub generated: Vec<GeneratedJob>,
    pub skipped: Vec<SkippedJob>,
}

pub struct BatchRunner<'a, G: TextGenerator> {
    config: &'a Config,
    generator: Option<&'a G>,
    catalog: SkillCatalog,
    input: InputManager,
    show_progress: bool,
}

impl<'a, G: TextGenerator> BatchRunner<'a, G> {
    /// Without a generator, jobs are analysed with the offline skill catalog.
    pub fn new(config: &'a Config, generator: Option<&'a G>) -> Result<Self> {
        Ok(Self {
            config,
            generator,
            catalog: SkillCatalog::new()?,
            input: InputManager::new(),
            show_progress: false,
        })
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub async fn run(
        &self,
        template: &Path,
        cover_letter: Option<&Path>,
        jobs: &[JobPosting],
        namer: &mut OutputNamer,
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let progress = if self.show_progress {
            let bar = ProgressBar::new(jobs.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        for job in jobs {
            let label = job.label();
            progress.set_message(label.clone());

            match self.process(template, cover_letter, job, namer).await {
                Ok(generated) => {
                    info!("Generated {}", generated.cv.display());
                    summary.generated.push(generated);
                }
                Err(e) => {
                    warn!("Skipping '{}': {}", label, e);
                    summary.skipped.push(SkippedJob {
                        job: label,
                        reason: e.to_string(),
                    });
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        summary
    }

    async fn process(
        &self,
        template: &Path,
        cover_letter: Option<&Path>,
        job: &JobPosting,
        namer: &mut OutputNamer,
    ) -> Result<GeneratedJob> {
        let job_text = job.description_text(&self.input).await?.ok_or_else(|| {
            TailorError::InvalidInput(format!(
                "'{}' has only a URL; provide its description text",
                job.label()
            ))
        })?;

        let options = GenerationOptions::from(&self.config.service);
        let requirements = match self.generator {
            Some(generator) => JobAnalyzer::new(generator, options.clone()).analyze(&job_text).await?,
            None => RequirementsRecord::from_catalog(&self.catalog, &job_text)?,
        };

        // Re-read per job so no state leaks between jobs. Both templates are
        // read before anything is written.
        let extractor = SectionExtractor::new(self.config.sections.clone());
        let document = extractor.extract(template)?;
        let letter_document = cover_letter.map(|path| extractor.extract(path)).transpose()?;

        let cv_path = namer.next_path(&self.config.output.cv_prefix, job);
        let rewriter = TemplateRewriter::new(self.generator, options.clone(), self.config.rewrite.clone());
        let result = rewriter.rewrite(&document, &requirements, &cv_path).await?;

        let letter = match letter_document {
            Some(letter_document) => {
                let letter_path = namer.next_path(&self.config.output.cover_letter_prefix, job);
                let letter_rewriter = CoverLetterRewriter::new(self.generator, options);
                match letter_rewriter.rewrite(&letter_document, &requirements, &letter_path).await {
                    Ok(letter) => Some(letter),
                    Err(e) => {
                        discard_output(&cv_path);
                        return Err(e);
                    }
                }
            }
            None => None,
        };

        Ok(GeneratedJob {
            job: job.label(),
            cv: result.output,
            cover_letter: letter,
            report: result.report,
        })
    }
}

/// Remove a file written earlier in a job that then failed, so skipped jobs leave nothing behind.
pub fn discard_output(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!("Could not remove partial output {}: {}", path.display(), e);
    }
}

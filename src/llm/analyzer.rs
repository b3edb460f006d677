//! Job description analysis: one service call, parsed into a requirements record

use crate::error::{Result, TailorError};
use crate::llm::client::{generate_with_retry, strip_code_fences, GenerationOptions, GenerationRequest, TextGenerator};
use crate::llm::prompts::{PromptTemplates, ANALYSIS_SYSTEM};
use crate::processing::catalog::SkillCatalog;
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Normalised output of analysing one job description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementsRecord {
    keywords: Vec<String>,
    seniority: Option<String>,
    summary_hint: String,
    source_text: String,
}

impl RequirementsRecord {
    /// Keywords are lower-cased, trimmed and deduplicated, keeping first-seen order.
    pub fn new<S: AsRef<str>>(
        keywords: &[S],
        seniority: Option<String>,
        summary_hint: String,
        source_text: String,
    ) -> Self {
        let mut normalized: Vec<String> = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let k = keyword
                .as_ref()
                .trim()
                .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
                .trim_end_matches('.')
                .trim()
                .to_lowercase();
            if !k.is_empty() && !normalized.contains(&k) {
                normalized.push(k);
            }
        }

        Self {
            keywords: normalized,
            seniority: seniority.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            summary_hint: summary_hint.trim().to_string(),
            source_text,
        }
    }

    /// Build a record from the offline skill catalog, without any service call.
    pub fn from_catalog(catalog: &SkillCatalog, job_text: &str) -> Result<Self> {
        validate_job_text(job_text)?;

        let skills: Vec<String> = catalog.scan(job_text).into_iter().map(|m| m.skill).collect();
        let hint = SkillCatalog::requirement_sentences(job_text)
            .into_iter()
            .next()
            .unwrap_or_default();

        info!("Offline analysis found {} catalog skill(s)", skills.len());
        Ok(Self::new(&skills, detect_seniority(job_text), hint, job_text.to_string()))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn seniority(&self) -> Option<&str> {
        self.seniority.as_deref()
    }

    pub fn summary_hint(&self) -> &str {
        &self.summary_hint
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisResponse {
    #[serde(default)]
    profile_summary: Option<String>,
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default)]
    keywords_to_emphasize: Vec<String>,
    #[serde(default)]
    seniority: Option<String>,
}

impl AnalysisResponse {
    fn has_content(&self) -> bool {
        !self.skills.is_empty()
            || !self.keywords_to_emphasize.is_empty()
            || self.profile_summary.as_deref().map_or(false, |s| !s.trim().is_empty())
    }
}

pub struct JobAnalyzer<'a, G: TextGenerator> {
    generator: &'a G,
    options: GenerationOptions,
    prompts: PromptTemplates,
}

impl<'a, G: TextGenerator> JobAnalyzer<'a, G> {
    pub fn new(generator: &'a G, options: GenerationOptions) -> Self {
        Self {
            generator,
            options,
            prompts: PromptTemplates::default(),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptTemplates) -> Self {
        self.prompts = prompts;
        self
    }

    /// Analyse `job_text`. Empty text is rejected before any call is made; a
    /// service failure that survives the single retry is returned to the caller.
    pub async fn analyze(&self, job_text: &str) -> Result<RequirementsRecord> {
        validate_job_text(job_text)?;

        info!("Analyzing job description ({} chars)", job_text.len());
        let request = GenerationRequest::new(ANALYSIS_SYSTEM, self.prompts.render_analysis(job_text), &self.options);

        let response = generate_with_retry(self.generator, &request)
            .await
            .map_err(|e| TailorError::AnalysisService(e.to_string()))?;

        let record = parse_response(&response, job_text);
        debug!("Requirements keywords: {:?}", record.keywords());
        Ok(record)
    }
}

fn validate_job_text(job_text: &str) -> Result<()> {
    if job_text.trim().is_empty() {
        return Err(TailorError::AnalysisService(
            "job description is empty; nothing to analyze".to_string(),
        ));
    }
    Ok(())
}

/// Parse a service reply: JSON first, then line-prefixed lists, then the whole reply as the hint.
pub fn parse_response(response: &str, job_text: &str) -> RequirementsRecord {
    if let Some(parsed) = parse_json(response) {
        let keywords: Vec<&String> = parsed.skills.iter().chain(parsed.keywords_to_emphasize.iter()).collect();
        return RequirementsRecord::new(
            &keywords,
            parsed.seniority,
            parsed.profile_summary.unwrap_or_default(),
            job_text.to_string(),
        );
    }

    if let Some(record) = parse_prefixed(response, job_text) {
        return record;
    }

    warn!("Analysis response did not match the expected shape; using it as a summary hint");
    RequirementsRecord::new::<&str>(&[], None, response.to_string(), job_text.to_string())
}

fn parse_json(response: &str) -> Option<AnalysisResponse> {
    let stripped = strip_code_fences(response);
    let candidate = serde_json::from_str::<AnalysisResponse>(stripped).ok().or_else(|| {
        // JSON embedded in surrounding prose
        let start = stripped.find('{')?;
        let end = stripped.rfind('}')?;
        if end <= start {
            return None;
        }
        serde_json::from_str::<AnalysisResponse>(&stripped[start..=end]).ok()
    })?;

    candidate.has_content().then_some(candidate)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Skills,
    Keywords,
    Seniority,
    Summary,
}

fn parse_prefixed(response: &str, job_text: &str) -> Option<RequirementsRecord> {
    let prefix = Regex::new(r"(?i)^[\s#*]*(skills|keywords|seniority|summary)[\s*]*:\s*(.*)$")
        .expect("Invalid prefix regex");

    let mut skills: Vec<String> = Vec::new();
    let mut keywords: Vec<String> = Vec::new();
    let mut seniority: Vec<String> = Vec::new();
    let mut summary: Vec<String> = Vec::new();
    let mut current: Option<Field> = None;
    let mut seen = false;

    for line in response.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(caps) = prefix.captures(trimmed) {
            seen = true;
            let field = match caps[1].to_lowercase().as_str() {
                "skills" => Field::Skills,
                "keywords" => Field::Keywords,
                "seniority" => Field::Seniority,
                _ => Field::Summary,
            };
            current = Some(field);
            let rest = caps[2].trim_start_matches('*').trim();
            if !rest.is_empty() {
                push_value(field, rest, &mut skills, &mut keywords, &mut seniority, &mut summary);
            }
            continue;
        }

        let Some(field) = current else { continue };
        let item = trimmed.trim_start_matches(['-', '*', '•']).trim();
        let is_item = item.len() != trimmed.len();
        match field {
            Field::Skills | Field::Keywords if is_item || !item.contains(' ') || item.contains(',') => {
                push_value(field, item, &mut skills, &mut keywords, &mut seniority, &mut summary)
            }
            Field::Skills | Field::Keywords => {}
            _ => push_value(field, item, &mut skills, &mut keywords, &mut seniority, &mut summary),
        }
    }

    if !seen {
        return None;
    }

    let all_keywords: Vec<&String> = skills.iter().chain(keywords.iter()).collect();
    let seniority = (!seniority.is_empty()).then(|| seniority.join(" "));
    Some(RequirementsRecord::new(
        &all_keywords,
        seniority,
        summary.join(" "),
        job_text.to_string(),
    ))
}

fn push_value(
    field: Field,
    value: &str,
    skills: &mut Vec<String>,
    keywords: &mut Vec<String>,
    seniority: &mut Vec<String>,
    summary: &mut Vec<String>,
) {
    let list_items = |v: &str| -> Vec<String> {
        v.split([',', ';'])
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };
    match field {
        Field::Skills => skills.extend(list_items(value)),
        Field::Keywords => keywords.extend(list_items(value)),
        Field::Seniority => seniority.push(value.to_string()),
        Field::Summary => summary.push(value.to_string()),
    }
}

fn detect_seniority(job_text: &str) -> Option<String> {
    let lower = job_text.to_lowercase();
    ["principal", "lead", "senior", "mid-level", "junior", "intern"]
        .iter()
        .find(|level| {
            lower
                .split(|c: char| !c.is_alphanumeric() && c != '-')
                .any(|word| word == **level)
        })
        .map(|level| level.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<VecDeque<Result<String>>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TextGenerator for Scripted {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TailorError::Service {
                    message: "no reply scripted".to_string(),
                    transient: false,
                }))
        }
    }

    fn options() -> GenerationOptions {
        GenerationOptions::from(&ServiceConfig::default())
    }

    #[test]
    fn test_parse_json_response() {
        let reply = r#"```json
{
  "profile_summary": "Platform engineer for container infrastructure",
  "skills": ["Docker", "Kubernetes", "docker "],
  "keywords_to_emphasize": ["CI/CD", "kubernetes"],
  "seniority": "senior"
}
```"#;
        let record = parse_response(reply, "job");

        assert_eq!(record.keywords(), &["docker", "kubernetes", "ci/cd"]);
        assert_eq!(record.seniority(), Some("senior"));
        assert_eq!(record.summary_hint(), "Platform engineer for container infrastructure");
        assert_eq!(record.source_text(), "job");
    }

    #[test]
    fn test_parse_json_inside_prose() {
        let reply = "Here is the analysis: {\"skills\": [\"Rust\"]} Hope it helps.";
        assert_eq!(parse_response(reply, "job").keywords(), &["rust"]);
    }

    #[test]
    fn test_parse_prefixed_response() {
        let reply = "SKILLS: Docker, Kubernetes\nKEYWORDS:\n- Terraform\n- AWS\nSENIORITY: Senior\nSUMMARY: Builds platforms.\nLoves automation.";
        let record = parse_response(reply, "job");

        assert_eq!(record.keywords(), &["docker", "kubernetes", "terraform", "aws"]);
        assert_eq!(record.seniority(), Some("Senior"));
        assert_eq!(record.summary_hint(), "Builds platforms. Loves automation.");
    }

    #[test]
    fn test_unexpected_shape_becomes_hint() {
        let record = parse_response("We want someone who ships.", "job");
        assert!(record.keywords().is_empty());
        assert_eq!(record.summary_hint(), "We want someone who ships.");
    }

    #[tokio::test]
    async fn test_empty_job_text_makes_no_call() {
        let generator = Scripted::new(vec![Ok("{}".to_string())]);
        let analyzer = JobAnalyzer::new(&generator, options());

        let result = analyzer.analyze("   \n ").await;
        assert!(matches!(result, Err(TailorError::AnalysisService(_))));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_service_failure_after_retry_is_analysis_error() {
        let transient = || TailorError::Service {
            message: "503".to_string(),
            transient: true,
        };
        let generator = Scripted::new(vec![Err(transient()), Err(transient())]);
        let analyzer = JobAnalyzer::new(&generator, options());

        let result = analyzer.analyze("Docker engineer").await;
        assert!(matches!(result, Err(TailorError::AnalysisService(_))));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_analyze_succeeds_after_one_transient_failure() {
        let generator = Scripted::new(vec![
            Err(TailorError::Service {
                message: "timeout".to_string(),
                transient: true,
            }),
            Ok(r#"{"skills": ["Docker"], "profile_summary": "Container work"}"#.to_string()),
        ]);
        let analyzer = JobAnalyzer::new(&generator, options());

        let record = analyzer.analyze("Docker engineer").await.unwrap();
        assert_eq!(record.keywords(), &["docker"]);
        assert_eq!(record.source_text(), "Docker engineer");
    }

    #[test]
    fn test_offline_record_from_catalog() {
        let catalog = SkillCatalog::new().unwrap();
        let record = RequirementsRecord::from_catalog(
            &catalog,
            "Senior engineer. You must have experience with Docker and Kubernetes.",
        )
        .unwrap();

        assert_eq!(record.keywords(), &["docker", "kubernetes"]);
        assert_eq!(record.seniority(), Some("senior"));
        assert_eq!(record.summary_hint(), "You must have experience with Docker and Kubernetes");
        assert!(RequirementsRecord::from_catalog(&catalog, "").is_err());
    }
}

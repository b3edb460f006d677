//! Configuration management for the CV tailor

use crate::error::{Result, TailorError};
use crate::processing::matcher::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub sections: SectionVocabulary,
    pub rewrite: RewriteConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

/// Which words count as section headings, and how headings are recognised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionVocabulary {
    pub rules: Vec<HeadingRule>,
    /// Paragraph style ids starting with one of these are headings
    pub heading_styles: Vec<String>,
    pub max_heading_words: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingRule {
    pub role: SectionRole,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionRole {
    Summary,
    Skills,
    Experience,
    Education,
    Projects,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    pub match_policy: MatchPolicy,
    pub fuzzy_threshold: f64,
    pub top_skills: usize,
    pub generate_summary: bool,
    pub rephrase_experience: bool,
    pub max_rephrased_bullets: usize,
    pub reorder_inline_lists: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub cv_prefix: String,
    pub cover_letter_prefix: String,
    pub include_date: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.5,
            max_tokens: 1000,
            timeout_secs: 60,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl Default for SectionVocabulary {
    fn default() -> Self {
        let rule = |role, aliases: &[&str]| HeadingRule {
            role,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        };

        Self {
            rules: vec![
                rule(
                    SectionRole::Summary,
                    &["summary", "profile", "professional summary", "profile summary", "about me", "objective", "career objective"],
                ),
                rule(
                    SectionRole::Skills,
                    &["skills", "technical skills", "key skills", "core skills", "core competencies", "competencies", "expertise", "skill set"],
                ),
                rule(
                    SectionRole::Experience,
                    &["experience", "work experience", "professional experience", "employment", "employment history", "work history"],
                ),
                rule(
                    SectionRole::Education,
                    &["education", "academic background", "qualifications", "education and training"],
                ),
                rule(
                    SectionRole::Projects,
                    &["projects", "personal projects", "selected projects", "portfolio"],
                ),
            ],
            heading_styles: vec!["Heading".to_string()],
            max_heading_words: 4,
        }
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            match_policy: MatchPolicy::Token,
            fuzzy_threshold: 0.9,
            top_skills: 3,
            generate_summary: true,
            rephrase_experience: false,
            max_rephrased_bullets: 5,
            reorder_inline_lists: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("tailored"),
            cv_prefix: "CV".to_string(),
            cover_letter_prefix: "CoverLetter".to_string(),
            include_date: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            sections: SectionVocabulary::default(),
            rewrite: RewriteConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl SectionVocabulary {
    /// Look up the role for an already-normalised heading text.
    pub fn role_for(&self, normalized: &str) -> Option<SectionRole> {
        self.rules
            .iter()
            .find(|rule| rule.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(normalized)))
            .map(|rule| rule.role)
    }

    /// Outline level of a heading style id: `Heading2` is 2, a bare `Heading` is 1,
    /// and a style outside `heading_styles` is `None`.
    pub fn heading_level(&self, style_id: &str) -> Option<u8> {
        let prefix = self
            .heading_styles
            .iter()
            .find(|prefix| style_id.starts_with(prefix.as_str()))?;
        let digits: String = style_id[prefix.len()..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        Some(digits.parse::<u8>().ok().filter(|&n| n > 0).unwrap_or(1))
    }
}

impl Config {
    /// Load the default config file, creating it on first use
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| TailorError::Configuration(format!("Failed to parse config '{}': {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| TailorError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-tailor")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.service.temperature) {
            return Err(TailorError::Configuration(format!(
                "service.temperature must be between 0 and 2, got {}",
                self.service.temperature
            )));
        }
        if self.service.max_tokens == 0 {
            return Err(TailorError::Configuration("service.max_tokens must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.rewrite.fuzzy_threshold) {
            return Err(TailorError::Configuration(format!(
                "rewrite.fuzzy_threshold must be between 0 and 1, got {}",
                self.rewrite.fuzzy_threshold
            )));
        }
        if self.sections.rules.iter().all(|r| r.aliases.is_empty()) {
            return Err(TailorError::Configuration("sections.rules defines no heading aliases".to_string()));
        }
        Ok(())
    }

    /// Set a single value using a dotted key such as `service.model`. A rejected
    /// value leaves the config unchanged.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |e: String| TailorError::Configuration(format!("Invalid value for {}: {}", key, e));
        let mut updated = self.clone();

        match key {
            "service.endpoint" => updated.service.endpoint = value.to_string(),
            "service.model" => updated.service.model = value.to_string(),
            "service.temperature" => updated.service.temperature = value.parse().map_err(|e| invalid(format!("{}", e)))?,
            "service.max_tokens" => updated.service.max_tokens = value.parse().map_err(|e| invalid(format!("{}", e)))?,
            "service.timeout_secs" => updated.service.timeout_secs = value.parse().map_err(|e| invalid(format!("{}", e)))?,
            "service.api_key_env" => updated.service.api_key_env = value.to_string(),
            "rewrite.match_policy" => updated.rewrite.match_policy = value.parse().map_err(invalid)?,
            "rewrite.fuzzy_threshold" => updated.rewrite.fuzzy_threshold = value.parse().map_err(|e| invalid(format!("{}", e)))?,
            "rewrite.top_skills" => updated.rewrite.top_skills = value.parse().map_err(|e| invalid(format!("{}", e)))?,
            "rewrite.generate_summary" => updated.rewrite.generate_summary = value.parse().map_err(|e| invalid(format!("{}", e)))?,
            "rewrite.rephrase_experience" => updated.rewrite.rephrase_experience = value.parse().map_err(|e| invalid(format!("{}", e)))?,
            "rewrite.max_rephrased_bullets" => updated.rewrite.max_rephrased_bullets = value.parse().map_err(|e| invalid(format!("{}", e)))?,
            "rewrite.reorder_inline_lists" => updated.rewrite.reorder_inline_lists = value.parse().map_err(|e| invalid(format!("{}", e)))?,
            "output.directory" => updated.output.directory = PathBuf::from(value),
            "output.cv_prefix" => updated.output.cv_prefix = value.to_string(),
            "output.cover_letter_prefix" => updated.output.cover_letter_prefix = value.to_string(),
            "output.include_date" => updated.output.include_date = value.parse().map_err(|e| invalid(format!("{}", e)))?,
            _ => return Err(TailorError::Configuration(format!("Unknown configuration key: {}", key))),
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

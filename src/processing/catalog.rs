//! Offline skill catalog: finds well-known skills in a job description without calling the service

use crate::error::{Result, TailorError};
use aho_corasick::{AhoCorasick, MatchKind};
use std::collections::HashMap;

/// Categorised skill vocabulary with a case-insensitive multi-pattern matcher
pub struct SkillCatalog {
    matcher: AhoCorasick,
    skills: Vec<String>,
    categories: HashMap<String, &'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogMatch {
    pub skill: String,
    pub category: &'static str,
    pub first_position: usize,
}

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Programming Languages",
        &[
            "python", "java", "javascript", "typescript", "c++", "c#", "ruby", "php", "swift", "kotlin",
            "golang", "rust", "scala", "perl", "matlab", "bash", "powershell", "sql", "html", "css", "dart",
        ],
    ),
    (
        "Frameworks & Libraries",
        &[
            "react", "angular", "vue", "django", "flask", "fastapi", "spring", "express", "node.js",
            "tensorflow", "pytorch", "scikit-learn", "pandas", "numpy", "laravel", "rails", "asp.net",
            "flutter", ".net", "entity framework",
        ],
    ),
    (
        "Databases",
        &[
            "mysql", "postgresql", "mongodb", "sqlite", "oracle", "sql server", "cassandra", "redis",
            "elasticsearch", "dynamodb", "mariadb", "neo4j", "firebase",
        ],
    ),
    (
        "Cloud & DevOps",
        &[
            "aws", "azure", "gcp", "google cloud", "docker", "kubernetes", "jenkins", "terraform",
            "ansible", "github actions", "gitlab ci", "heroku", "lambda", "ec2", "ci/cd", "linux",
        ],
    ),
    (
        "Tools & Platforms",
        &[
            "git", "github", "gitlab", "bitbucket", "jira", "confluence", "figma", "postman", "grafana",
            "datadog", "sentry", "tableau", "power bi", "excel", "sap", "salesforce",
        ],
    ),
    (
        "Methodologies",
        &["agile", "scrum", "kanban", "tdd", "bdd", "devops", "pair programming", "itil", "prince2"],
    ),
    (
        "Soft Skills",
        &[
            "communication", "teamwork", "leadership", "problem solving", "critical thinking",
            "time management", "adaptability", "stakeholder management", "mentoring", "presentation",
        ],
    ),
];

const REQUIREMENT_MARKERS: &[&str] = &["required", "must", "should", "need", "essential", "experience with", "you have"];

impl SkillCatalog {
    pub fn new() -> Result<Self> {
        Self::with_custom_skills(Vec::new())
    }

    /// Catalog with extra skills filed under "Custom"
    pub fn with_custom_skills(additional_skills: Vec<String>) -> Result<Self> {
        let mut categories = HashMap::new();
        for (category, skills) in CATEGORIES {
            for skill in *skills {
                categories.insert(skill.to_string(), *category);
            }
        }
        for skill in additional_skills {
            categories.entry(skill.to_lowercase()).or_insert("Custom");
        }

        let mut skills: Vec<String> = categories.keys().cloned().collect();
        // Longest first so "google cloud" wins over shorter overlaps
        skills.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&skills)
            .map_err(|e| TailorError::Configuration(format!("Failed to build skill catalog: {}", e)))?;

        Ok(Self {
            matcher,
            skills,
            categories,
        })
    }

    /// Catalog skills present in `text`, ordered by first occurrence.
    pub fn scan(&self, text: &str) -> Vec<CatalogMatch> {
        let mut found: Vec<CatalogMatch> = Vec::new();

        for mat in self.matcher.find_iter(text) {
            if !is_word_bounded(text, mat.start(), mat.end()) {
                continue;
            }
            let skill = &self.skills[mat.pattern().as_usize()];
            if found.iter().any(|m| &m.skill == skill) {
                continue;
            }
            found.push(CatalogMatch {
                skill: skill.clone(),
                category: self.categories.get(skill).copied().unwrap_or("Custom"),
                first_position: mat.start(),
            });
        }

        found
    }

    /// Sentences that read like stated requirements.
    pub fn requirement_sentences(text: &str) -> Vec<String> {
        text.split(|c| c == '.' || c == '\n' || c == ';')
            .map(str::trim)
            .filter(|s| s.split_whitespace().count() >= 3)
            .filter(|s| {
                let lower = s.to_lowercase();
                REQUIREMENT_MARKERS.iter().any(|m| lower.contains(m))
            })
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    !before.map_or(false, is_word) && !after.map_or(false, is_word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_finds_skills_in_order() {
        let catalog = SkillCatalog::new().unwrap();
        let found = catalog.scan("We run Kubernetes on AWS. Docker and Python experience required.");
        let skills: Vec<&str> = found.iter().map(|m| m.skill.as_str()).collect();

        assert_eq!(skills, vec!["kubernetes", "aws", "docker", "python"]);
        assert_eq!(found[0].category, "Cloud & DevOps");
    }

    #[test]
    fn test_scan_respects_word_boundaries() {
        let catalog = SkillCatalog::new().unwrap();
        let found = catalog.scan("JavaScript developers and Rustaceans welcome");
        let skills: Vec<&str> = found.iter().map(|m| m.skill.as_str()).collect();

        assert!(skills.contains(&"javascript"));
        assert!(!skills.contains(&"java"));
        assert!(!skills.contains(&"rust"));
    }

    #[test]
    fn test_custom_skills() {
        let catalog = SkillCatalog::with_custom_skills(vec!["Bazel".to_string()]).unwrap();
        let found = catalog.scan("Build tooling with bazel");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, "Custom");
    }

    #[test]
    fn test_requirement_sentences() {
        let text = "About us: we are great. You must have 5 years of Rust. Nice office";
        let sentences = SkillCatalog::requirement_sentences(text);
        assert_eq!(sentences, vec!["You must have 5 years of Rust".to_string()]);
    }
}

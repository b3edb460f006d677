//! Fixed prompt templates for job analysis and section rewriting

/// System messages sent alongside each prompt kind.
pub const ANALYSIS_SYSTEM: &str =
    "You are an expert CV tailoring assistant that provides structured JSON responses.";
pub const WRITER_SYSTEM: &str =
    "You are an expert CV writer. You reply with the requested text only, without commentary or quotes.";
pub const COVER_LETTER_SYSTEM: &str = "You are an expert cover letter writing assistant.";

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub analysis: String,
    pub summary: String,
    pub rephrase: String,
    pub cover_letter: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            analysis: ANALYSIS_TEMPLATE.to_string(),
            summary: SUMMARY_TEMPLATE.to_string(),
            rephrase: REPHRASE_TEMPLATE.to_string(),
            cover_letter: COVER_LETTER_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn render_analysis(&self, job: &str) -> String {
        self.analysis.replace("{job}", job.trim())
    }

    pub fn render_summary(&self, current_summary: &str, hint: &str, skills: &[String]) -> String {
        self.summary
            .replace("{summary}", current_summary.trim())
            .replace("{hint}", hint.trim())
            .replace("{skills}", &skills.join(", "))
    }

    pub fn render_rephrase(&self, bullet: &str, keywords: &[String]) -> String {
        self.rephrase
            .replace("{bullet}", bullet.trim())
            .replace("{keywords}", &keywords.join(", "))
    }

    pub fn render_cover_letter(&self, job: &str, body: &str, hint: &str) -> String {
        self.cover_letter
            .replace("{job}", job.trim())
            .replace("{body}", body.trim())
            .replace("{hint}", hint.trim())
    }
}

const ANALYSIS_TEMPLATE: &str = r#"Analyze the job description below and extract what a CV should emphasize for it.

JOB DESCRIPTION:
{job}

Respond with a JSON object of exactly this shape:
{
    "profile_summary": "One or two sentences describing the ideal candidate profile",
    "skills": ["skill1", "skill2", "skill3"],
    "keywords_to_emphasize": ["keyword1", "keyword2", "keyword3"],
    "seniority": "junior | mid | senior | lead, with a few words of evidence"
}

List the most important skills first. Use short skill names (e.g. "Docker", "PostgreSQL"), not sentences."#;

const SUMMARY_TEMPLATE: &str = r#"Rewrite the professional summary of a CV for a specific job.

CURRENT SUMMARY:
{summary}

WHAT THE EMPLOYER LOOKS FOR:
{hint}

SKILLS TO MENTION (most important first):
{skills}

Write a single paragraph of two to four sentences. Mention the listed skills by name.
Do not invent employers, degrees or years of experience that the current summary does not state."#;

const REPHRASE_TEMPLATE: &str = r#"Rephrase this CV bullet point so it speaks to the keywords below where the facts allow it.

BULLET:
{bullet}

KEYWORDS:
{keywords}

Keep the same facts, numbers and approximate length. Return one line without a leading bullet symbol."#;

const COVER_LETTER_TEMPLATE: &str = r#"Tailor the body of a cover letter to a specific job while keeping its structure and tone.

JOB DESCRIPTION:
{job}

CURRENT COVER LETTER BODY:
{body}

WHAT THE EMPLOYER LOOKS FOR:
{hint}

Rewrite the body to:
1. Address specific requirements mentioned in the job description
2. Highlight relevant skills and experiences already present in the letter
3. Maintain a professional tone similar to the original
4. Keep approximately the same length as the original

Return only the body paragraphs separated by blank lines, without greeting or closing."#;

//! Keyword matching policies used to decide which CV content is relevant to a job

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strsim::jaro_winkler;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Case-insensitive substring containment
    Substring,
    /// Every token of the keyword appears as a token of the text
    Token,
    /// Token match, but tokens are compared with Jaro-Winkler similarity
    Fuzzy,
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "substring" => Ok(MatchPolicy::Substring),
            "token" => Ok(MatchPolicy::Token),
            "fuzzy" => Ok(MatchPolicy::Fuzzy),
            _ => Err(format!("unknown match policy '{}'. Supported: substring, token, fuzzy", s)),
        }
    }
}

/// Matches free text against a requirements keyword set.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    policy: MatchPolicy,
    fuzzy_threshold: f64,
}

impl KeywordMatcher {
    pub fn new(policy: MatchPolicy, fuzzy_threshold: f64) -> Self {
        Self {
            policy,
            fuzzy_threshold,
        }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn matches(&self, text: &str, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return false;
        }

        match self.policy {
            MatchPolicy::Substring => text.to_lowercase().contains(&keyword.to_lowercase()),
            MatchPolicy::Token => {
                let keyword_tokens = tokenize(keyword);
                // "c++" and "c#" lose their symbols under word segmentation
                if keyword_tokens.is_empty() || has_symbol_suffix(keyword) {
                    return text.to_lowercase().contains(&keyword.to_lowercase());
                }
                contains_sequence(&tokenize(text), &keyword_tokens, |a, b| a == b)
            }
            MatchPolicy::Fuzzy => {
                let keyword_tokens = tokenize(keyword);
                if keyword_tokens.is_empty() || has_symbol_suffix(keyword) {
                    return text.to_lowercase().contains(&keyword.to_lowercase());
                }
                let threshold = self.fuzzy_threshold;
                contains_sequence(&tokenize(text), &keyword_tokens, |a, b| {
                    a == b || jaro_winkler(a, b) >= threshold
                })
            }
        }
    }

    /// Number of distinct keywords matching the text.
    pub fn hits<S: AsRef<str>>(&self, text: &str, keywords: &[S]) -> usize {
        keywords.iter().filter(|k| self.matches(text, k.as_ref())).count()
    }

    pub fn matches_any<S: AsRef<str>>(&self, text: &str, keywords: &[S]) -> bool {
        keywords.iter().any(|k| self.matches(text, k.as_ref()))
    }

    /// Stable partition: items matching any keyword first, each group in original order.
    /// Returns the permutation as indices into `items`.
    pub fn promote_order<T: AsRef<str>, S: AsRef<str>>(&self, items: &[T], keywords: &[S]) -> Vec<usize> {
        let (mut promoted, demoted): (Vec<usize>, Vec<usize>) = (0..items.len())
            .partition(|&i| self.matches_any(items[i].as_ref(), keywords));
        promoted.extend(demoted);
        promoted
    }
}

/// Lower-cased word tokens, split on Unicode word boundaries.
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

fn has_symbol_suffix(keyword: &str) -> bool {
    keyword.contains('+') || keyword.contains('#')
}

fn contains_sequence<F>(haystack: &[String], needle: &[String], eq: F) -> bool
where
    F: Fn(&str, &str) -> bool,
{
    if needle.len() > haystack.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|window| window.iter().zip(needle).all(|(a, b)| eq(a, b)))
}

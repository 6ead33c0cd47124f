//! Quality checks - keyword and word-count heuristics over raw answers.
//!
//! Each check kind maps to a pure predicate over the raw answer text. The
//! table is data-driven: adding a kind means adding an enum variant and its
//! predicate, nothing else. All matching is case-insensitive; short
//! function words ("by", "in", "k", ...) match whole tokens only, longer
//! keywords and phrases match as substrings (so "month" still matches
//! "months").

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::QuestionId;

static MONTHS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ]
});

static TIMEFRAME_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "month", "week", "day", "start", "launch", "timeline", "by", "in", "when",
    ]
});

static URGENCY_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "urgent",
        "immediate",
        "asap",
        "soon",
        "quick",
        "now",
        "this month",
        "this week",
        "next month",
        "next week",
        "start",
        "launch",
        "by",
        "within",
    ]
});

static BUDGET_WORDS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["budget", "thousand", "k", "scale", "spend", "invest"]);

static CADENCE_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "daily",
        "weekly",
        "monthly",
        "sometimes",
        "often",
        "never",
        "facebook",
        "instagram",
        "google",
        "website",
    ]
});

static OUTCOME_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "work", "result", "help", "customer", "traffic", "sale", "lead",
    ]
});

/// The closed set of quality-check kinds a component may configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityCheckKind {
    MustBeDetailed,
    #[serde(alias = "must_be_specific_number_or_range")]
    MustBeSpecificRange,
    MustBeSpecificLocation,
    MustBeMeasurable,
    MustBeSpecificDateOrTimeframe,
    MustBeUrgentForQuickWins,
    MustExplainFrequencyAndPlatforms,
    MustExplainResults,
    MustInventoryContent,
    MustAssessBaseline,
}

impl QualityCheckKind {
    /// Runs the check against a raw answer.
    ///
    /// A question with no raw answer at all fails every check; callers
    /// handle that case before invoking the predicate.
    pub fn passes(&self, raw_answer: &str) -> bool {
        let lowered = raw_answer.to_lowercase();
        let words = word_count(raw_answer);
        match self {
            QualityCheckKind::MustBeDetailed => words >= 10,
            QualityCheckKind::MustBeSpecificRange => {
                lowered.chars().any(|c| c.is_ascii_digit())
                    || lowered.contains('$')
                    || lowered.contains('€')
                    || lowered.contains('£')
                    || contains_any(&lowered, &BUDGET_WORDS)
            }
            QualityCheckKind::MustBeSpecificLocation => words >= 3,
            QualityCheckKind::MustBeMeasurable
            | QualityCheckKind::MustInventoryContent
            | QualityCheckKind::MustAssessBaseline => words >= 5,
            QualityCheckKind::MustBeSpecificDateOrTimeframe => {
                contains_any(&lowered, &MONTHS) || contains_any(&lowered, &TIMEFRAME_WORDS)
            }
            QualityCheckKind::MustBeUrgentForQuickWins => {
                contains_any(&lowered, &URGENCY_WORDS) || contains_any(&lowered, &MONTHS)
            }
            QualityCheckKind::MustExplainFrequencyAndPlatforms => {
                contains_any(&lowered, &CADENCE_WORDS)
            }
            QualityCheckKind::MustExplainResults => contains_any(&lowered, &OUTCOME_WORDS),
        }
    }

    /// Human-readable reason for a failing check, shown in the upgrade flow.
    pub fn failure_reason(&self, raw_answer: &str) -> String {
        let words = word_count(raw_answer);
        match self {
            QualityCheckKind::MustBeDetailed => {
                format!("Answer too short ({words} words, need 10+)")
            }
            QualityCheckKind::MustBeSpecificRange => {
                "Answer does not include specific numbers or budget range".to_string()
            }
            QualityCheckKind::MustBeSpecificLocation => {
                "Answer does not name a specific location".to_string()
            }
            QualityCheckKind::MustBeMeasurable => {
                format!("Answer needs more detail ({words} words, need 5+)")
            }
            QualityCheckKind::MustBeSpecificDateOrTimeframe => {
                "Answer does not mention a date or timeframe".to_string()
            }
            QualityCheckKind::MustBeUrgentForQuickWins => {
                "Answer does not indicate urgency or specific timeframe".to_string()
            }
            QualityCheckKind::MustExplainFrequencyAndPlatforms => {
                "Answer does not mention posting frequency or platforms".to_string()
            }
            QualityCheckKind::MustExplainResults => {
                "Answer does not describe outcomes".to_string()
            }
            QualityCheckKind::MustInventoryContent | QualityCheckKind::MustAssessBaseline => {
                format!("Answer needs more detail ({words} words, need 5+)")
            }
        }
    }
}

/// A failed quality check surfaced to the upgrade flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityIssue {
    /// Question whose answer failed the check.
    pub field: QuestionId,
    /// The check that failed.
    pub check: QualityCheckKind,
    /// Human-readable explanation.
    pub reason: String,
}

impl QualityIssue {
    /// Creates an issue for a failing check.
    pub fn failing(field: QuestionId, check: QualityCheckKind, raw_answer: &str) -> Self {
        Self {
            reason: check.failure_reason(raw_answer),
            field,
            check,
        }
    }

    /// Creates an issue for a question with no answer at all.
    pub fn missing(field: QuestionId, check: QualityCheckKind) -> Self {
        Self {
            field,
            check,
            reason: "Missing answer".to_string(),
        }
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Function words that would match nearly anything as substrings.
const TOKEN_ONLY: [&str; 6] = ["by", "in", "k", "day", "now", "when"];

/// Keyword matching: function words match whole tokens only, everything
/// else matches as a substring.
fn contains_any(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| {
        if TOKEN_ONLY.contains(kw) {
            lowered
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| token == *kw)
        } else {
            lowered.contains(kw)
        }
    })
}

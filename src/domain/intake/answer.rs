//! Extracted answers and value normalization.
//!
//! The oracle hands back loosely-shaped values (string, number, array, or
//! null). They are coerced into the `NormalizedValue` union here, before
//! anything downstream sees them; the unlock and progress math only ever
//! asks "absent or not".

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Confidence;

use super::question::{Question, QuestionType};

/// Canonical form of an extracted answer.
///
/// `Absent` is treated identically to "not yet answered" everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NormalizedValue {
    /// No usable answer yet.
    Absent,
    /// Cleaned free text.
    Text(String),
    /// A single matched option value.
    Choice(String),
    /// Matched option values of a multi-select question.
    Choices(Vec<String>),
}

impl NormalizedValue {
    /// True when this value counts as "not yet answered".
    pub fn is_absent(&self) -> bool {
        match self {
            NormalizedValue::Absent => true,
            NormalizedValue::Text(s) | NormalizedValue::Choice(s) => s.trim().is_empty(),
            NormalizedValue::Choices(v) => v.is_empty(),
        }
    }

    /// Renders the value for prompts and report requests.
    pub fn display(&self) -> String {
        match self {
            NormalizedValue::Absent => String::new(),
            NormalizedValue::Text(s) | NormalizedValue::Choice(s) => s.clone(),
            NormalizedValue::Choices(v) => v.join(", "),
        }
    }

    /// Coerces a raw oracle value into the union for the given question.
    ///
    /// Null and empty values become `Absent`; numbers are stringified;
    /// select answers go through option matching.
    pub fn from_raw(value: &serde_json::Value, question: &Question) -> Self {
        match value {
            serde_json::Value::Null => NormalizedValue::Absent,
            serde_json::Value::String(s) => Self::from_text(s, question),
            serde_json::Value::Number(n) => Self::from_text(&n.to_string(), question),
            serde_json::Value::Array(items) => {
                let values: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        serde_json::Value::String(s) if !s.trim().is_empty() => {
                            Some(s.trim().to_string())
                        }
                        serde_json::Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect();
                if values.is_empty() {
                    NormalizedValue::Absent
                } else {
                    NormalizedValue::Choices(values)
                }
            }
            _ => NormalizedValue::Absent,
        }
    }

    fn from_text(raw: &str, question: &Question) -> Self {
        let answer = raw.trim();
        if answer.is_empty() {
            return NormalizedValue::Absent;
        }
        match question.question_type {
            QuestionType::Select => NormalizedValue::Choice(match_option(answer, question)),
            QuestionType::SelectMultiple => {
                NormalizedValue::Choices(split_multi(answer, question))
            }
            QuestionType::Text | QuestionType::Textarea => {
                NormalizedValue::Text(answer.to_string())
            }
        }
    }
}

/// Matches a select answer against the question's options.
///
/// Exact value/label match wins, then a case-insensitive partial match in
/// either direction; an unmatched answer is kept verbatim.
fn match_option(answer: &str, question: &Question) -> String {
    if let Some(exact) = question
        .options
        .iter()
        .find(|opt| opt.value == answer || opt.label() == answer)
    {
        return exact.value.clone();
    }

    let lowered = answer.to_lowercase();
    if let Some(partial) = question.options.iter().find(|opt| {
        let value = opt.value.to_lowercase();
        let label = opt.label().to_lowercase();
        value.contains(&lowered)
            || lowered.contains(&value)
            || label.contains(&lowered)
            || lowered.contains(&label)
    }) {
        return partial.value.clone();
    }

    answer.to_string()
}

/// Splits a multi-select text answer into option values.
///
/// Accepts a JSON-encoded array or comma-separated text; each element goes
/// through single-option matching.
fn split_multi(answer: &str, question: &Question) -> Vec<String> {
    if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(answer) {
        return items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| match_option(s.trim(), question))
            .filter(|s| !s.is_empty())
            .collect();
    }

    answer
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match_option(s, question))
        .collect()
}

/// One extracted answer for a (session, question) pair.
///
/// Confidence is metadata only: it never gates whether the answer counts
/// as present, but it feeds the answer-quality score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Verbatim span from the conversation that produced this answer.
    pub raw_answer: String,
    /// Canonical value; `Absent` behaves as "not answered".
    pub normalized_value: NormalizedValue,
    /// Extraction confidence.
    pub confidence: Confidence,
}

impl Answer {
    /// Creates a new answer.
    pub fn new(
        raw_answer: impl Into<String>,
        normalized_value: NormalizedValue,
        confidence: Confidence,
    ) -> Self {
        Self {
            raw_answer: raw_answer.into(),
            normalized_value,
            confidence,
        }
    }

    /// True when the answer carries a usable value.
    pub fn is_answered(&self) -> bool {
        !self.normalized_value.is_absent()
    }

    /// Word count of the raw answer (whitespace-delimited).
    pub fn word_count(&self) -> usize {
        self.raw_answer.split_whitespace().count()
    }
}

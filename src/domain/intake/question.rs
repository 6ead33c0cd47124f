//! Static question configuration.
//!
//! Questions are loaded once per funnel from the catalog and never mutated
//! at runtime.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::QuestionId;

/// How a question expects to be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Single choice from a fixed option list.
    Select,
    /// Multiple choices from a fixed option list.
    SelectMultiple,
    /// Short free text.
    Text,
    /// Long free text.
    Textarea,
}

impl QuestionType {
    /// True for the option-backed question types.
    pub fn has_options(&self) -> bool {
        matches!(self, QuestionType::Select | QuestionType::SelectMultiple)
    }
}

/// One selectable option of a select-type question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Canonical stored value.
    pub value: String,
    /// Display label; defaults to the value when the catalog omits it.
    #[serde(default)]
    pub label: Option<String>,
}

impl QuestionOption {
    /// Creates an option whose label equals its value.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
        }
    }

    /// Creates an option with a distinct display label.
    pub fn labeled(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: Some(label.into()),
        }
    }

    /// Returns the display label, falling back to the value.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

/// Static per-funnel question configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique key within the funnel.
    pub id: QuestionId,
    /// Prompt text shown to (and paraphrased by) the assistant.
    pub question_template: String,
    /// Answer shape.
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Options for select-type questions.
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    /// Whether the question counts toward required completion.
    #[serde(default)]
    pub required: bool,
    /// Example answer format, forwarded to the extraction oracle.
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Why the question matters, forwarded to the extraction oracle.
    #[serde(default)]
    pub why_matters: Option<String>,
}

impl Question {
    /// Creates a free-text question.
    pub fn text(id: QuestionId, template: impl Into<String>, required: bool) -> Self {
        Self {
            id,
            question_template: template.into(),
            question_type: QuestionType::Text,
            options: Vec::new(),
            required,
            placeholder: None,
            why_matters: None,
        }
    }

    /// Creates a single-select question.
    pub fn select(
        id: QuestionId,
        template: impl Into<String>,
        options: Vec<QuestionOption>,
        required: bool,
    ) -> Self {
        Self {
            id,
            question_template: template.into(),
            question_type: QuestionType::Select,
            options,
            required,
            placeholder: None,
            why_matters: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qid(s: &str) -> QuestionId {
        QuestionId::new(s).unwrap()
    }

    #[test]
    fn option_label_falls_back_to_value() {
        let plain = QuestionOption::plain("$1,000-3,000");
        assert_eq!(plain.label(), "$1,000-3,000");

        let labeled = QuestionOption::labeled("1k_3k", "$1,000-3,000");
        assert_eq!(labeled.label(), "$1,000-3,000");
    }

    #[test]
    fn question_type_deserializes_snake_case() {
        let t: QuestionType = serde_json::from_str("\"select_multiple\"").unwrap();
        assert_eq!(t, QuestionType::SelectMultiple);
        assert!(t.has_options());
    }

    #[test]
    fn question_deserializes_from_catalog_json() {
        let json = r#"{
            "id": "budget",
            "question_template": "What monthly budget could you commit?",
            "type": "select",
            "options": [{"value": "$500-1,000"}, {"value": "$1,000-3,000"}],
            "required": true,
            "placeholder": "$1,000-3,000"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.id, qid("budget"));
        assert_eq!(q.question_type, QuestionType::Select);
        assert_eq!(q.options.len(), 2);
        assert!(q.required);
        assert!(q.why_matters.is_none());
    }

    #[test]
    fn optional_fields_default() {
        let json = r#"{
            "id": "geography",
            "question_template": "Where are your customers?",
            "type": "text"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert!(!q.required);
        assert!(q.options.is_empty());
    }
}

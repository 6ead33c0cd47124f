//! Funnel catalog loading.
//!
//! A catalog is the static definition of every funnel: its question
//! schema, report components with requirement blocks, and the system
//! prompt template. Loaded once at startup from JSON and shared by
//! reference; nothing here mutates at runtime.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::domain::foundation::{ComponentId, FunnelId, QuestionId};
use crate::domain::intake::Question;
use crate::domain::unlock::ReportComponent;

use super::error::CatalogError;

/// All funnels known to this deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct FunnelCatalog {
    pub funnels: Vec<FunnelDefinition>,
    /// Upfront multiple-choice intake shown before the conversation.
    #[serde(default)]
    pub bubble_questions: Vec<Question>,
}

/// One funnel: a conversation persona plus its question schema and
/// unlockable report components.
#[derive(Debug, Clone, Deserialize)]
pub struct FunnelDefinition {
    pub id: FunnelId,
    pub label: String,
    /// System prompt with `{business_type}`, `{geography}` and
    /// `{marketing_maturity}` placeholders.
    pub system_prompt_template: String,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub components: Vec<ReportComponent>,
}

impl FunnelCatalog {
    /// Load and validate a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and validate a catalog from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Look up a funnel by id.
    pub fn funnel(&self, id: &FunnelId) -> Option<&FunnelDefinition> {
        self.funnels.iter().find(|f| &f.id == id)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.funnels.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for funnel in &self.funnels {
            if !seen.insert(&funnel.id) {
                return Err(CatalogError::DuplicateFunnel(funnel.id.to_string()));
            }
            funnel.validate()?;
        }
        Ok(())
    }
}

impl FunnelDefinition {
    /// Look up a question by id.
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    /// Look up a component by id.
    pub fn component(&self, id: &ComponentId) -> Option<&ReportComponent> {
        self.components.iter().find(|c| &c.id == id)
    }

    /// Every requirement block may only reference questions declared in
    /// this funnel and components declared earlier-or-later in it.
    fn validate(&self) -> Result<(), CatalogError> {
        let question_ids: HashSet<&QuestionId> = self.questions.iter().map(|q| &q.id).collect();
        let component_ids: HashSet<&ComponentId> = self.components.iter().map(|c| &c.id).collect();

        for component in &self.components {
            for question in component.requirements.all_required_questions() {
                if !question_ids.contains(&question) {
                    return Err(CatalogError::UnknownQuestion {
                        funnel: self.id.to_string(),
                        component: component.id.to_string(),
                        question: question.to_string(),
                    });
                }
            }
            for question in component.requirements.quality_checks.keys() {
                if !question_ids.contains(question) {
                    return Err(CatalogError::UnknownQuestion {
                        funnel: self.id.to_string(),
                        component: component.id.to_string(),
                        question: question.to_string(),
                    });
                }
            }
            for dependency in &component.requirements.dependencies {
                if !component_ids.contains(dependency) {
                    return Err(CatalogError::UnknownDependency {
                        funnel: self.id.to_string(),
                        component: component.id.to_string(),
                        dependency: dependency.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID_CATALOG: &str = r#"{
        "funnels": [
            {
                "id": "local_visibility",
                "label": "Local Visibility",
                "system_prompt_template": "You help a {business_type} in {geography}.",
                "questions": [
                    {"id": "budget", "question_template": "What is your monthly budget?", "type": "text", "required": true},
                    {"id": "timeline", "question_template": "When do you want to start?", "type": "text", "required": true}
                ],
                "components": [
                    {
                        "id": "quick_wins",
                        "name": "Quick Wins",
                        "description": "Fast, low-cost actions",
                        "requirements": {
                            "required_fields": ["budget"],
                            "unlock_after_question_ids": ["timeline"],
                            "min_questions_required": 1,
                            "quality_checks": {"budget": "must_be_specific_range"}
                        }
                    }
                ]
            }
        ],
        "bubble_questions": [
            {"id": "business_type", "question_template": "What kind of business?", "type": "select", "required": true,
             "options": [{"value": "bakery", "label": "Bakery"}]}
        ]
    }"#;

    #[test]
    fn parses_valid_catalog() {
        let catalog = FunnelCatalog::from_json(VALID_CATALOG).unwrap();
        assert_eq!(catalog.funnels.len(), 1);
        assert_eq!(catalog.bubble_questions.len(), 1);

        let funnel = catalog
            .funnel(&FunnelId::new("local_visibility").unwrap())
            .unwrap();
        assert_eq!(funnel.label, "Local Visibility");
        assert_eq!(funnel.questions.len(), 2);
        assert!(funnel
            .component(&ComponentId::new("quick_wins").unwrap())
            .is_some());
    }

    #[test]
    fn rejects_empty_catalog() {
        let result = FunnelCatalog::from_json(r#"{"funnels": []}"#);
        assert!(matches!(result, Err(CatalogError::Empty)));
    }

    #[test]
    fn rejects_component_referencing_unknown_question() {
        let raw = VALID_CATALOG.replace("\"budget\"]", "\"no_such_question\"]");
        let result = FunnelCatalog::from_json(&raw);
        assert!(matches!(result, Err(CatalogError::UnknownQuestion { .. })));
    }

    #[test]
    fn rejects_unknown_dependency() {
        let raw = VALID_CATALOG.replace(
            "\"quality_checks\": {\"budget\": \"must_be_specific_range\"}",
            "\"quality_checks\": {}, \"dependencies\": [\"no_such_component\"]",
        );
        let result = FunnelCatalog::from_json(&raw);
        assert!(matches!(result, Err(CatalogError::UnknownDependency { .. })));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID_CATALOG.as_bytes()).unwrap();

        let catalog = FunnelCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.funnels.len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = FunnelCatalog::load("/nonexistent/funnels.json");
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}

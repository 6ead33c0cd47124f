//! Report component configuration.
//!
//! A component is a unit of deliverable report content. Its requirement
//! block is static per-funnel configuration, loaded once and never mutated
//! at runtime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ComponentId, QuestionId};

use super::quality::QualityCheckKind;

/// The requirement block deciding when a component unlocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRequirements {
    /// Question ids whose answers must be present.
    #[serde(default)]
    pub required_fields: Vec<QuestionId>,
    /// Alternate/overlapping set of question ids counted toward unlock.
    #[serde(default)]
    pub unlock_after_question_ids: Vec<QuestionId>,
    /// Floor on how many of the above must be satisfied.
    #[serde(default = "default_min_questions")]
    pub min_questions_required: u32,
    /// Overall progress percentage floor.
    #[serde(default)]
    pub min_unlock_at_progress: u8,
    /// Per-question quality checks; all must pass (AND).
    #[serde(default)]
    pub quality_checks: BTreeMap<QuestionId, QualityCheckKind>,
    /// Components that must already be unlocked.
    #[serde(default)]
    pub dependencies: Vec<ComponentId>,
}

fn default_min_questions() -> u32 {
    1
}

impl Default for ComponentRequirements {
    fn default() -> Self {
        Self {
            required_fields: Vec::new(),
            unlock_after_question_ids: Vec::new(),
            min_questions_required: default_min_questions(),
            min_unlock_at_progress: 0,
            quality_checks: BTreeMap::new(),
            dependencies: Vec::new(),
        }
    }
}

impl ComponentRequirements {
    /// Union of `required_fields` and `unlock_after_question_ids`,
    /// first-occurrence order, deduplicated. This is the question set the
    /// upgrade flow works through.
    pub fn all_required_questions(&self) -> Vec<QuestionId> {
        let mut seen = Vec::new();
        for id in self
            .required_fields
            .iter()
            .chain(self.unlock_after_question_ids.iter())
        {
            if !seen.contains(id) {
                seen.push(id.clone());
            }
        }
        seen
    }

    /// The partial-unlock floor: 60% of the minimum, rounded down.
    pub fn partial_threshold(&self) -> u32 {
        (0.6 * self.min_questions_required as f64).floor() as u32
    }
}

/// A distinct report section that can be locked, partial, or unlocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportComponent {
    /// Unique key within the funnel.
    pub id: ComponentId,
    /// Display name (e.g. "Content Strategy").
    pub name: String,
    /// Short description shown to callers.
    #[serde(default)]
    pub description: String,
    /// When this component unlocks.
    #[serde(default)]
    pub requirements: ComponentRequirements,
}

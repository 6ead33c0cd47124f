//! Component Unlock Engine.
//!
//! Classifies every report component as unlocked, partial, or locked from
//! the current answer set and progress snapshot. Components are evaluated
//! in declared order; a dependency only counts if it unlocked earlier in
//! the same pass, so catalogs must declare dependencies before dependents.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ComponentId, QuestionId};
use crate::domain::intake::AnswerSet;
use crate::domain::progress::Progress;

use super::component::ReportComponent;
use super::quality::QualityIssue;

/// Classification of a single component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    Unlocked,
    Partial,
    Locked,
}

/// The three-way partition over all components of a funnel.
///
/// Every component id lands in exactly one of the three sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnlockStatus {
    pub unlocked: Vec<ComponentId>,
    pub partial: Vec<ComponentId>,
    pub locked: Vec<ComponentId>,
}

impl UnlockStatus {
    /// True when the component is fully unlocked.
    pub fn is_unlocked(&self, id: &ComponentId) -> bool {
        self.unlocked.contains(id)
    }

    /// Returns the state of a component, if it was evaluated.
    pub fn state_of(&self, id: &ComponentId) -> Option<ComponentState> {
        if self.unlocked.contains(id) {
            Some(ComponentState::Unlocked)
        } else if self.partial.contains(id) {
            Some(ComponentState::Partial)
        } else if self.locked.contains(id) {
            Some(ComponentState::Locked)
        } else {
            None
        }
    }
}

/// Evaluates all components in declared order.
pub fn evaluate_components(
    answers: &AnswerSet,
    components: &[ReportComponent],
    progress: &Progress,
) -> UnlockStatus {
    let mut status = UnlockStatus::default();
    let mut unlocked_so_far: HashSet<ComponentId> = HashSet::new();

    for component in components {
        match classify(component, answers, progress, &unlocked_so_far) {
            ComponentState::Unlocked => {
                unlocked_so_far.insert(component.id.clone());
                status.unlocked.push(component.id.clone());
            }
            ComponentState::Partial => status.partial.push(component.id.clone()),
            ComponentState::Locked => status.locked.push(component.id.clone()),
        }
    }

    status
}

/// Re-runs a component's quality checks, collecting every failure.
///
/// Used by the upgrade flow to explain why an otherwise-satisfied
/// component is still locked.
pub fn failing_quality_checks(
    component: &ReportComponent,
    answers: &AnswerSet,
) -> Vec<QualityIssue> {
    component
        .requirements
        .quality_checks
        .iter()
        .filter_map(|(question_id, check)| {
            match answers.get(question_id).map(|a| a.raw_answer.as_str()) {
                None | Some("") => Some(QualityIssue::missing(question_id.clone(), *check)),
                Some(raw) if !check.passes(raw) => {
                    Some(QualityIssue::failing(question_id.clone(), *check, raw))
                }
                Some(_) => None,
            }
        })
        .collect()
}

fn classify(
    component: &ReportComponent,
    answers: &AnswerSet,
    progress: &Progress,
    unlocked_so_far: &HashSet<ComponentId>,
) -> ComponentState {
    let reqs = &component.requirements;

    // The progress gate is absolute: below the floor a component can be
    // neither unlocked nor partial this turn.
    let progress_met = progress.percentage.value() >= reqs.min_unlock_at_progress;

    let dependencies_met = reqs
        .dependencies
        .iter()
        .all(|dep| unlocked_so_far.contains(dep));

    // The observed tie-break: the two question sets are counted
    // independently and the larger count wins.
    let fields_present = count_answered(answers, &reqs.required_fields);
    let questions_answered = count_answered(answers, &reqs.unlock_after_question_ids);
    let questions_met = fields_present.max(questions_answered) as u32;

    let quality_met = failing_quality_checks(component, answers).is_empty();

    if progress_met
        && dependencies_met
        && questions_met >= reqs.min_questions_required
        && quality_met
    {
        ComponentState::Unlocked
    } else if progress_met && questions_met >= reqs.partial_threshold() {
        // "Almost there" regardless of the quality gate.
        ComponentState::Partial
    } else {
        ComponentState::Locked
    }
}

fn count_answered(answers: &AnswerSet, question_ids: &[QuestionId]) -> usize {
    answers.count_answered(question_ids.iter())
}

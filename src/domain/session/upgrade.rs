//! Upgrade mode - the focused sub-conversation targeting one component.
//!
//! Entered when the user asks to unlock a specific non-unlocked component;
//! exited only when that component unlocks (or every originally-missing
//! question is answered). Never abandoned automatically.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ComponentId, QuestionId};
use crate::domain::intake::AnswerSet;
use crate::domain::unlock::QualityIssue;

/// Transient sub-state attached to a session while an upgrade runs.
///
/// Presence on the session means active; clearing it deactivates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeMode {
    /// The component the user wants unlocked.
    pub target_component: ComponentId,
    /// Questions still missing when the upgrade started, in order.
    pub questions_needed: Vec<QuestionId>,
    /// Quality failures when every question was already answered.
    #[serde(default)]
    pub quality_issues: Vec<QualityIssue>,
}

impl UpgradeMode {
    /// Starts an upgrade chasing missing questions.
    pub fn for_missing_questions(
        target_component: ComponentId,
        questions_needed: Vec<QuestionId>,
    ) -> Self {
        Self {
            target_component,
            questions_needed,
            quality_issues: Vec::new(),
        }
    }

    /// Starts an upgrade chasing better answers only.
    pub fn for_quality_issues(
        target_component: ComponentId,
        quality_issues: Vec<QualityIssue>,
    ) -> Self {
        Self {
            target_component,
            questions_needed: Vec::new(),
            quality_issues,
        }
    }

    /// True when this upgrade has no countable question list (quality-only).
    pub fn is_quality_only(&self) -> bool {
        self.questions_needed.is_empty()
    }

    /// True when every originally-missing question now has an answer.
    ///
    /// Quality-only upgrades never complete this way; they wait for the
    /// unlock itself.
    pub fn all_questions_answered(&self, answers: &AnswerSet) -> bool {
        !self.is_quality_only()
            && self
                .questions_needed
                .iter()
                .all(|id| answers.is_answered(id))
    }

    /// Interim progress over the original question list.
    pub fn progress_against(&self, answers: &AnswerSet) -> UpgradeProgress {
        UpgradeProgress {
            answered: answers.count_answered(self.questions_needed.iter()) as u32,
            total: self.questions_needed.len() as u32,
        }
    }
}

/// `answered / total` over the upgrade's original question list.
///
/// Quality-only upgrades report 0/0, meaning "in progress, no countable
/// total".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeProgress {
    pub answered: u32,
    pub total: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Confidence;
    use crate::domain::intake::{Answer, NormalizedValue};
    use crate::domain::unlock::QualityCheckKind;

    fn qid(s: &str) -> QuestionId {
        QuestionId::new(s).unwrap()
    }

    fn cid(s: &str) -> ComponentId {
        ComponentId::new(s).unwrap()
    }

    fn answered(set: &mut AnswerSet, id: &str) {
        set.upsert(
            qid(id),
            Answer::new(
                "a perfectly reasonable answer",
                NormalizedValue::Text("a perfectly reasonable answer".to_string()),
                Confidence::Certain,
            ),
        );
    }

    #[test]
    fn missing_question_upgrade_tracks_progress() {
        let upgrade =
            UpgradeMode::for_missing_questions(cid("c"), vec![qid("budget"), qid("timeline")]);

        let mut answers = AnswerSet::new();
        assert_eq!(
            upgrade.progress_against(&answers),
            UpgradeProgress { answered: 0, total: 2 }
        );

        answered(&mut answers, "budget");
        assert_eq!(
            upgrade.progress_against(&answers),
            UpgradeProgress { answered: 1, total: 2 }
        );
        assert!(!upgrade.all_questions_answered(&answers));

        answered(&mut answers, "timeline");
        assert!(upgrade.all_questions_answered(&answers));
    }

    #[test]
    fn quality_only_upgrade_reports_zero_over_zero() {
        let upgrade = UpgradeMode::for_quality_issues(
            cid("c"),
            vec![QualityIssue::missing(
                qid("budget"),
                QualityCheckKind::MustBeSpecificRange,
            )],
        );

        assert!(upgrade.is_quality_only());
        let progress = upgrade.progress_against(&AnswerSet::new());
        assert_eq!(progress, UpgradeProgress { answered: 0, total: 0 });
    }

    #[test]
    fn quality_only_upgrade_never_completes_by_answer_count() {
        let upgrade = UpgradeMode::for_quality_issues(cid("c"), Vec::new());
        let mut answers = AnswerSet::new();
        answered(&mut answers, "anything");
        assert!(!upgrade.all_questions_answered(&answers));
    }
}

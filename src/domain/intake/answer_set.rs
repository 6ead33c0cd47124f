//! The per-session collection of extracted answers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::QuestionId;

use super::answer::Answer;

/// All extracted answers of a session, keyed by question id.
///
/// Upserts are overwrite-by-question-id: the latest extraction wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: BTreeMap<QuestionId, Answer>,
}

impl AnswerSet {
    /// Creates an empty answer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the answer for a question.
    pub fn upsert(&mut self, question_id: QuestionId, answer: Answer) {
        self.answers.insert(question_id, answer);
    }

    /// Returns the stored answer, if any.
    pub fn get(&self, question_id: &QuestionId) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    /// True when the question has a non-absent normalized value.
    pub fn is_answered(&self, question_id: &QuestionId) -> bool {
        self.answers
            .get(question_id)
            .is_some_and(Answer::is_answered)
    }

    /// Counts the answered questions among the given ids.
    pub fn count_answered<'a, I>(&self, question_ids: I) -> usize
    where
        I: IntoIterator<Item = &'a QuestionId>,
    {
        question_ids
            .into_iter()
            .filter(|id| self.is_answered(id))
            .count()
    }

    /// Iterates over all stored answers.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &Answer)> {
        self.answers.iter()
    }

    /// Number of stored answers, answered or not.
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// True when no answers are stored.
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl FromIterator<(QuestionId, Answer)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (QuestionId, Answer)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Confidence;
    use crate::domain::intake::NormalizedValue;

    fn qid(s: &str) -> QuestionId {
        QuestionId::new(s).unwrap()
    }

    fn answered(raw: &str) -> Answer {
        Answer::new(
            raw,
            NormalizedValue::Text(raw.to_string()),
            Confidence::Certain,
        )
    }

    #[test]
    fn upsert_overwrites_by_question_id() {
        let mut set = AnswerSet::new();
        set.upsert(qid("budget"), answered("around 1k"));
        set.upsert(qid("budget"), answered("$2,000 per month"));

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&qid("budget")).unwrap().raw_answer, "$2,000 per month");
    }

    #[test]
    fn absent_answer_does_not_count_as_answered() {
        let mut set = AnswerSet::new();
        set.upsert(
            qid("timeline"),
            Answer::new("", NormalizedValue::Absent, Confidence::NotMentioned),
        );

        assert!(!set.is_answered(&qid("timeline")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn count_answered_filters_missing_and_absent() {
        let mut set = AnswerSet::new();
        set.upsert(qid("budget"), answered("$1,000"));
        set.upsert(
            qid("timeline"),
            Answer::new("", NormalizedValue::Absent, Confidence::NotMentioned),
        );

        let ids = [qid("budget"), qid("timeline"), qid("geography")];
        assert_eq!(set.count_answered(ids.iter()), 1);
    }
}

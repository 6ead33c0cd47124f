//! Progress Calculator - completion percentage and answer-quality scoring.
//!
//! Turns the current answer set plus the question schema into a progress
//! snapshot. Pure domain logic, no I/O.
//!
//! The percentage is answered-over-total, modulated by an answer-quality
//! score and clamped by a safety floor: a session with fewer than three
//! answered questions never reports more than 30%, and completion demands
//! at least eight answered questions no matter how the percentages shake
//! out.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Percentage;
use crate::domain::intake::{Answer, AnswerSet, Question};

/// Below this many answered questions the percentage is clamped to 30.
const MIN_ANSWERS_FOR_FULL_SCALE: usize = 3;

/// Absolute floor of answered questions before a session can complete.
const MIN_ANSWERS_FOR_COMPLETION: usize = 8;

/// Final percentage required for completion.
const COMPLETION_PERCENTAGE: u8 = 80;

/// Markers of vague language that cost quality points.
const VAGUE_MARKERS: [&str; 4] = ["not sure", "i guess", "idk", "dunno"];

/// Words that signal the answer carries an example.
const EXEMPLIFYING_WORDS: [&str; 2] = ["like", "example"];

/// Snapshot of how far an intake session has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Questions with a non-absent normalized value.
    pub questions_answered: u32,
    /// All configured questions, required or not.
    pub questions_total: u32,
    /// Answered questions among the required set.
    pub required_answered: u32,
    /// Required questions configured.
    pub required_total: u32,
    /// Quality-modulated completion percentage.
    pub percentage: Percentage,
    /// Mean per-answer quality score (50-100; 50 when nothing is answered).
    pub quality_score: u8,
    /// Whether the session has collected enough to generate the full report.
    pub is_complete: bool,
}

impl Progress {
    /// A zeroed snapshot for a fresh session over the given schema.
    pub fn empty(questions: &[Question]) -> Self {
        Self {
            questions_answered: 0,
            questions_total: questions.len() as u32,
            required_answered: 0,
            required_total: questions.iter().filter(|q| q.required).count() as u32,
            percentage: Percentage::ZERO,
            quality_score: 50,
            is_complete: false,
        }
    }
}

/// Computes the progress snapshot for the current answer set.
pub fn compute_progress(answers: &AnswerSet, questions: &[Question]) -> Progress {
    let total = questions.len();
    let answered = questions
        .iter()
        .filter(|q| answers.is_answered(&q.id))
        .count();

    let required: Vec<_> = questions.iter().filter(|q| q.required).collect();
    let required_answered = required
        .iter()
        .filter(|q| answers.is_answered(&q.id))
        .count();

    let base = if total == 0 {
        0.0
    } else {
        answered as f64 / total as f64 * 100.0
    };

    let quality = quality_score(answers, questions);

    // Quality modulates the raw percentage before the safety floor.
    let mut percentage = if quality < 50.0 {
        base * (quality / 100.0)
    } else if quality >= 80.0 {
        (base * 1.05).min(100.0)
    } else {
        base
    };

    // A couple of high-quality answers must not read as near-complete.
    if answered < MIN_ANSWERS_FOR_FULL_SCALE {
        percentage = percentage.min(30.0);
    }

    let percentage = Percentage::from_f64(percentage);
    let quality_score = quality.round().clamp(0.0, 100.0) as u8;

    let is_complete = answered >= MIN_ANSWERS_FOR_COMPLETION
        && required_answered == required.len()
        && percentage.value() >= COMPLETION_PERCENTAGE;

    Progress {
        questions_answered: answered as u32,
        questions_total: total as u32,
        required_answered: required_answered as u32,
        required_total: required.len() as u32,
        percentage,
        quality_score,
        is_complete,
    }
}

/// Mean per-answer quality over the answered questions; 50 with no answers.
fn quality_score(answers: &AnswerSet, questions: &[Question]) -> f64 {
    let scores: Vec<f64> = questions
        .iter()
        .filter_map(|q| answers.get(&q.id))
        .filter(|a| a.is_answered())
        .map(answer_score)
        .collect();

    if scores.is_empty() {
        50.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// Scores one answer on [50, 100], starting from 100.
fn answer_score(answer: &Answer) -> f64 {
    let raw = answer.raw_answer.trim();
    let lowered = raw.to_lowercase();
    let words = answer.word_count();

    let mut score: f64 = 100.0;

    if words < 5 {
        score -= 10.0;
    }
    if VAGUE_MARKERS.iter().any(|m| lowered.contains(m)) {
        score -= 5.0;
    }
    if words == 1 && raw.len() < 12 {
        score -= 8.0;
    }
    if words > 20 {
        score += 5.0;
    }
    if raw.chars().any(|c| c.is_ascii_digit())
        || EXEMPLIFYING_WORDS.iter().any(|m| lowered.contains(m))
    {
        score += 3.0;
    }
    if answer.confidence.is_high() {
        score += 5.0;
    }

    score.clamp(50.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Confidence, QuestionId};
    use crate::domain::intake::NormalizedValue;

    fn qid(s: &str) -> QuestionId {
        QuestionId::new(s).unwrap()
    }

    fn schema(required: &[&str], optional: &[&str]) -> Vec<Question> {
        required
            .iter()
            .map(|id| Question::text(qid(id), format!("Tell me about {id}"), true))
            .chain(
                optional
                    .iter()
                    .map(|id| Question::text(qid(id), format!("Tell me about {id}"), false)),
            )
            .collect()
    }

    fn answer(raw: &str, confidence: Confidence) -> Answer {
        Answer::new(
            raw,
            NormalizedValue::Text(raw.to_string()),
            confidence,
        )
    }

    fn detailed(set: &mut AnswerSet, id: &str) {
        set.upsert(
            qid(id),
            answer(
                "we have been running a local bakery for seven years now",
                Confidence::Certain,
            ),
        );
    }

    #[test]
    fn empty_schema_reports_zero_and_incomplete() {
        let progress = compute_progress(&AnswerSet::new(), &[]);
        assert_eq!(progress.percentage, Percentage::ZERO);
        assert!(!progress.is_complete);
        assert_eq!(progress.questions_total, 0);
    }

    #[test]
    fn no_answers_defaults_quality_to_50() {
        let questions = schema(&["budget"], &[]);
        let progress = compute_progress(&AnswerSet::new(), &questions);
        assert_eq!(progress.quality_score, 50);
        assert_eq!(progress.percentage, Percentage::ZERO);
    }

    #[test]
    fn fewer_than_three_answers_clamps_to_30() {
        // Two detailed certain answers out of three questions; the sparse
        // clamp should still hold the percentage at 30.
        let questions = schema(&["budget", "geography"], &["timeline"]);
        let mut answers = AnswerSet::new();
        answers.upsert(
            qid("budget"),
            answer("we could spend two thousand dollars each month", Confidence::Certain),
        );
        answers.upsert(
            qid("geography"),
            answer("mostly families living on the north side here", Confidence::Certain),
        );

        let progress = compute_progress(&answers, &questions);
        assert_eq!(progress.questions_answered, 2);
        assert_eq!(progress.required_answered, 2);
        assert_eq!(progress.required_total, 2);
        assert!(progress.percentage.value() <= 30);
        assert!(!progress.is_complete);
    }

    #[test]
    fn high_quality_answers_get_percentage_bonus() {
        // All three answered with long, high-confidence answers.
        let questions = schema(&["budget", "geography"], &["timeline"]);
        let mut answers = AnswerSet::new();
        let long = "we plan to invest around two thousand dollars every month starting january";
        for id in ["budget", "geography", "timeline"] {
            answers.upsert(qid(id), answer(long, Confidence::Strong));
        }

        let progress = compute_progress(&answers, &questions);
        assert!(progress.quality_score >= 80);
        // 100 * 1.05 capped at 100.
        assert_eq!(progress.percentage, Percentage::HUNDRED);
        // Only 3 answered; the 8-answer floor keeps it incomplete.
        assert!(!progress.is_complete);
    }

    #[test]
    fn all_required_but_under_eight_total_is_incomplete() {
        let ids = ["a", "b", "c", "d", "e"];
        let questions = schema(&ids, &[]);
        let mut answers = AnswerSet::new();
        for id in ids {
            detailed(&mut answers, id);
        }

        let progress = compute_progress(&answers, &questions);
        assert_eq!(progress.required_answered, progress.required_total);
        assert!(progress.percentage.value() >= 80);
        assert!(!progress.is_complete);
    }

    #[test]
    fn eight_answers_all_required_and_high_percentage_completes() {
        let ids = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let questions = schema(&ids[..4], &ids[4..]);
        let mut answers = AnswerSet::new();
        for id in ids {
            detailed(&mut answers, id);
        }

        let progress = compute_progress(&answers, &questions);
        assert_eq!(progress.questions_answered, 8);
        assert!(progress.percentage.value() >= 80);
        assert!(progress.is_complete);
    }

    #[test]
    fn missing_required_answer_blocks_completion() {
        let ids = ["a", "b", "c", "d", "e", "f", "g", "h", "i"];
        let questions = schema(&ids[..2], &ids[2..]);
        let mut answers = AnswerSet::new();
        // Answer everything except required "a".
        for id in &ids[1..] {
            detailed(&mut answers, id);
        }

        let progress = compute_progress(&answers, &questions);
        assert_eq!(progress.questions_answered, 8);
        assert!(progress.required_answered < progress.required_total);
        assert!(!progress.is_complete);
    }

    #[test]
    fn vague_short_answers_lower_quality() {
        let questions = schema(&["a", "b", "c"], &[]);
        let mut answers = AnswerSet::new();
        for id in ["a", "b", "c"] {
            answers.upsert(qid(id), answer("idk", Confidence::Weak));
        }

        let progress = compute_progress(&answers, &questions);
        // 100 - 10 (short) - 5 (vague) - 8 (single short word) = 77.
        assert_eq!(progress.quality_score, 77);
    }

    #[test]
    fn per_answer_score_clamps_at_50() {
        let a = answer("idk", Confidence::NotMentioned);
        assert!(answer_score(&a) >= 50.0);
    }

    #[test]
    fn digit_and_confidence_bonuses_apply() {
        // 21 words, a digit, high confidence: 100 + 5 + 3 + 5 clamped to 100.
        let long = "our budget sits at roughly 2000 dollars per month and \
                    we would stretch it further if the early results justify the spend";
        let a = answer(long, Confidence::Certain);
        assert!(a.word_count() > 20);
        assert_eq!(answer_score(&a), 100.0);
    }

    #[test]
    fn empty_progress_matches_fresh_session() {
        let questions = schema(&["a", "b"], &["c"]);
        let fresh = Progress::empty(&questions);
        let computed = compute_progress(&AnswerSet::new(), &questions);
        assert_eq!(fresh, computed);
    }
}

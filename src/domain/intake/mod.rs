//! Intake module - Question schema and extracted answers.
//!
//! The question schema is static per-funnel configuration; answers are
//! written by the extraction pipeline with overwrite-by-question semantics.

mod answer;
mod answer_set;
mod question;

pub use answer::{Answer, NormalizedValue};
pub use answer_set::AnswerSet;
pub use question::{Question, QuestionOption, QuestionType};

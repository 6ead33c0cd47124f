//! Extraction oracle port - Interface for the conversational LLM.
//!
//! One oracle serves two calls per turn: generating the assistant's reply
//! and extracting structured answers from the full conversation so far.
//! Extraction is stateless - every call re-reads the whole history, so a
//! correction in turn nine overwrites what turn three established.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::conversation::Turn;
use crate::domain::foundation::{Confidence, DomainError, ErrorCode, QuestionId};
use crate::domain::intake::Question;

/// Reserved extraction key for the user's name. Never a funnel question
/// id; the orchestrator routes it onto the session instead of the
/// answer set.
pub const USER_NAME_KEY: &str = "user_name";

/// Answers extracted in one oracle pass, keyed by question id.
pub type ExtractionResult = BTreeMap<QuestionId, ExtractedField>;

/// Port for the conversational reply/extraction model.
///
/// Implementations connect to an external LLM service. Both calls take
/// the full turn history; the oracle holds no state between calls.
#[async_trait]
pub trait ExtractionOracle: Send + Sync {
    /// Generate the assistant's next conversational reply.
    ///
    /// `system_context` carries the funnel's interpolated system prompt
    /// plus any upgrade instructions for this turn.
    ///
    /// # Errors
    ///
    /// - `Timeout` / `Unavailable` on transport failure
    async fn generate_reply(
        &self,
        history: &[Turn],
        system_context: &str,
    ) -> Result<String, OracleError>;

    /// Extract answers to `questions` from the full history.
    ///
    /// Questions the conversation never touched must be omitted or
    /// reported with zero confidence; the caller filters both.
    ///
    /// # Errors
    ///
    /// - `Timeout` / `Unavailable` on transport failure
    /// - `ParseFailed` when the response is not usable JSON even after repair
    async fn extract(
        &self,
        history: &[Turn],
        questions: &[Question],
    ) -> Result<ExtractionResult, OracleError>;
}

/// One extracted answer as the oracle reports it, before coercion
/// against the question schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    /// Verbatim (or near-verbatim) user phrasing.
    pub raw_answer: String,
    /// Oracle's normalized value; coerced against the question type
    /// before it reaches the answer set.
    #[serde(default)]
    pub normalized_value: serde_json::Value,
    /// How directly the conversation supports this answer.
    #[serde(default)]
    pub confidence: Confidence,
}

/// Errors from oracle calls.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The call exceeded the configured deadline.
    #[error("oracle call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Transport or service failure (network, 5xx, rate limit).
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// The oracle answered but the payload could not be parsed.
    #[error("oracle response unparseable: {0}")]
    ParseFailed(String),
}

impl OracleError {
    /// Transient failures degrade the turn instead of failing it:
    /// the caller substitutes a canned reply or an empty extraction.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable(_))
    }
}

impl From<OracleError> for DomainError {
    fn from(err: OracleError) -> Self {
        let code = match &err {
            OracleError::Timeout { .. } => ErrorCode::OracleTimeout,
            OracleError::Unavailable(_) => ErrorCode::OracleUnavailable,
            OracleError::ParseFailed(_) => ErrorCode::OracleParseFailed,
        };
        DomainError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_oracle_is_object_safe() {
        fn _accepts_dyn(_oracle: &dyn ExtractionOracle) {}
    }

    #[test]
    fn transport_errors_are_transient_parse_errors_are_not() {
        assert!(OracleError::Timeout { seconds: 60 }.is_transient());
        assert!(OracleError::Unavailable("503".into()).is_transient());
        assert!(!OracleError::ParseFailed("bad json".into()).is_transient());
    }

    #[test]
    fn oracle_errors_map_to_their_domain_codes() {
        let err: DomainError = OracleError::Timeout { seconds: 60 }.into();
        assert_eq!(err.code, ErrorCode::OracleTimeout);
        let err: DomainError = OracleError::ParseFailed("extra text".into()).into();
        assert_eq!(err.code, ErrorCode::OracleParseFailed);
    }

    #[test]
    fn extracted_field_defaults_missing_confidence_to_not_mentioned() {
        let field: ExtractedField =
            serde_json::from_str(r#"{"raw_answer": "a bakery"}"#).unwrap();
        assert_eq!(field.confidence, Confidence::NotMentioned);
        assert!(field.normalized_value.is_null());
    }
}

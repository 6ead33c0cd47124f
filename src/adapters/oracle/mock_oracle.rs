//! Mock extraction oracle for testing.
//!
//! Configurable to return scripted replies and extraction maps, or to
//! inject errors, without calling a real LLM API. Both queues are
//! consumed in order; an exhausted queue yields a bland default so
//! multi-turn tests don't have to script every call.
//!
//! # Example
//!
//! ```ignore
//! let oracle = MockOracle::new()
//!     .with_reply("Great! What's your monthly budget?")
//!     .with_extraction(extraction);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::conversation::Turn;
use crate::domain::foundation::{Confidence, QuestionId};
use crate::domain::intake::Question;
use crate::ports::{ExtractedField, ExtractionOracle, ExtractionResult, OracleError};

/// One scripted outcome for either side of the port.
enum Scripted<T> {
    Ok(T),
    Err(MockOracleError),
}

/// Cloneable error shapes for injection.
#[derive(Debug, Clone)]
pub enum MockOracleError {
    Timeout { seconds: u64 },
    Unavailable(String),
    ParseFailed(String),
}

impl From<MockOracleError> for OracleError {
    fn from(err: MockOracleError) -> Self {
        match err {
            MockOracleError::Timeout { seconds } => OracleError::Timeout { seconds },
            MockOracleError::Unavailable(msg) => OracleError::Unavailable(msg),
            MockOracleError::ParseFailed(msg) => OracleError::ParseFailed(msg),
        }
    }
}

/// Mock oracle for orchestration tests.
#[derive(Default)]
pub struct MockOracle {
    replies: Mutex<VecDeque<Scripted<String>>>,
    extractions: Mutex<VecDeque<Scripted<ExtractionResult>>>,
    reply_calls: Arc<Mutex<Vec<(Vec<Turn>, String)>>>,
    extract_calls: Arc<Mutex<Vec<Vec<Turn>>>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a scripted conversational reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Scripted::Ok(reply.into()));
        self
    }

    /// Queues an error for the next reply call.
    pub fn with_reply_error(self, error: MockOracleError) -> Self {
        self.replies.lock().unwrap().push_back(Scripted::Err(error));
        self
    }

    /// Queues a scripted extraction map.
    pub fn with_extraction(self, extraction: ExtractionResult) -> Self {
        self.extractions
            .lock()
            .unwrap()
            .push_back(Scripted::Ok(extraction));
        self
    }

    /// Queues an extraction that yields nothing new.
    pub fn with_empty_extraction(self) -> Self {
        self.with_extraction(ExtractionResult::new())
    }

    /// Queues an error for the next extraction call.
    pub fn with_extraction_error(self, error: MockOracleError) -> Self {
        self.extractions
            .lock()
            .unwrap()
            .push_back(Scripted::Err(error));
        self
    }

    /// Number of reply calls made so far.
    pub fn reply_call_count(&self) -> usize {
        self.reply_calls.lock().unwrap().len()
    }

    /// System contexts passed to each reply call, in order.
    pub fn reply_contexts(&self) -> Vec<String> {
        self.reply_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, context)| context.clone())
            .collect()
    }

    /// Number of extraction calls made so far.
    pub fn extract_call_count(&self) -> usize {
        self.extract_calls.lock().unwrap().len()
    }

    /// The history passed to the most recent extraction call.
    pub fn last_extract_history(&self) -> Option<Vec<Turn>> {
        self.extract_calls.lock().unwrap().last().cloned()
    }
}

/// Builds one extracted field for scripting.
pub fn extracted(raw: &str, normalized: serde_json::Value, confidence: Confidence) -> ExtractedField {
    ExtractedField {
        raw_answer: raw.to_string(),
        normalized_value: normalized,
        confidence,
    }
}

/// Builds an extraction map from `(question_id, field)` pairs. Panics on
/// an invalid id, which is fine for test scripting.
pub fn extraction_of(fields: &[(&str, ExtractedField)]) -> ExtractionResult {
    fields
        .iter()
        .map(|(id, field)| (QuestionId::new(*id).unwrap(), field.clone()))
        .collect()
}

#[async_trait]
impl ExtractionOracle for MockOracle {
    async fn generate_reply(
        &self,
        history: &[Turn],
        system_context: &str,
    ) -> Result<String, OracleError> {
        self.reply_calls
            .lock()
            .unwrap()
            .push((history.to_vec(), system_context.to_string()));

        match self.replies.lock().unwrap().pop_front() {
            Some(Scripted::Ok(reply)) => Ok(reply),
            Some(Scripted::Err(err)) => Err(err.into()),
            None => Ok("Tell me more about your business.".to_string()),
        }
    }

    async fn extract(
        &self,
        history: &[Turn],
        _questions: &[Question],
    ) -> Result<ExtractionResult, OracleError> {
        self.extract_calls.lock().unwrap().push(history.to_vec());

        match self.extractions.lock().unwrap().pop_front() {
            Some(Scripted::Ok(extraction)) => Ok(extraction),
            Some(Scripted::Err(err)) => Err(err.into()),
            None => Ok(ExtractionResult::new()),
        }
    }
}

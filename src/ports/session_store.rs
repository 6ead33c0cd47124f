//! Session store port.
//!
//! Persists the three pieces of per-session state: the session aggregate,
//! the extracted answer set, and the turn history. Implementations handle
//! the actual storage.

use async_trait::async_trait;

use crate::domain::conversation::Turn;
use crate::domain::foundation::{DomainError, QuestionId, SessionId};
use crate::domain::intake::{Answer, AnswerSet};
use crate::domain::session::{Session, SessionPatch};

/// Storage port for sessions, answers, and turn history.
///
/// Implementations must keep the three stores consistent per session id;
/// answers and history for an unknown session are errors, not empties.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a freshly created session.
    ///
    /// # Errors
    ///
    /// - `STORE_ERROR` on persistence failure
    async fn create_session(&self, session: &Session) -> Result<(), DomainError>;

    /// Load a session by id. Returns `None` if unknown.
    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Apply a partial update to a stored session.
    ///
    /// # Errors
    ///
    /// - `SESSION_NOT_FOUND` if the session doesn't exist
    async fn update_session(&self, id: &SessionId, patch: SessionPatch)
        -> Result<(), DomainError>;

    /// Load the extracted answer set for a session.
    ///
    /// # Errors
    ///
    /// - `SESSION_NOT_FOUND` if the session doesn't exist
    async fn get_answers(&self, id: &SessionId) -> Result<AnswerSet, DomainError>;

    /// Insert or overwrite one extracted answer.
    ///
    /// # Errors
    ///
    /// - `SESSION_NOT_FOUND` if the session doesn't exist
    async fn upsert_answer(
        &self,
        id: &SessionId,
        question_id: QuestionId,
        answer: Answer,
    ) -> Result<(), DomainError>;

    /// Append one turn to the session's history.
    ///
    /// # Errors
    ///
    /// - `SESSION_NOT_FOUND` if the session doesn't exist
    async fn append_turn(&self, id: &SessionId, turn: Turn) -> Result<(), DomainError>;

    /// Load the full turn history in append order.
    ///
    /// # Errors
    ///
    /// - `SESSION_NOT_FOUND` if the session doesn't exist
    async fn get_history(&self, id: &SessionId) -> Result<Vec<Turn>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SessionStore) {}
    }
}

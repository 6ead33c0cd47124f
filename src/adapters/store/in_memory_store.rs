//! In-memory session store.
//!
//! Backs the store port with a `tokio::sync::RwLock`ed map. Suitable for
//! tests and single-process embedding; one record holds the session
//! aggregate, its answer set, and its turn history together so the three
//! stay consistent per id.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::conversation::Turn;
use crate::domain::foundation::{DomainError, QuestionId, SessionId};
use crate::domain::intake::{Answer, AnswerSet};
use crate::domain::session::{Session, SessionPatch};
use crate::ports::SessionStore;

#[derive(Debug, Clone)]
struct SessionRecord {
    session: Session,
    answers: AnswerSet,
    history: Vec<Turn>,
}

/// In-memory implementation of the session store port.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<SessionId, SessionRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn session_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn create_session(&self, session: &Session) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        records.insert(
            session.id,
            SessionRecord {
                session: session.clone(),
                answers: AnswerSet::new(),
                history: Vec::new(),
            },
        );
        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(id).map(|r| r.session.clone()))
    }

    async fn update_session(
        &self,
        id: &SessionId,
        patch: SessionPatch,
    ) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| DomainError::session_not_found(id))?;
        record.session.apply(patch);
        Ok(())
    }

    async fn get_answers(&self, id: &SessionId) -> Result<AnswerSet, DomainError> {
        let records = self.records.read().await;
        records
            .get(id)
            .map(|r| r.answers.clone())
            .ok_or_else(|| DomainError::session_not_found(id))
    }

    async fn upsert_answer(
        &self,
        id: &SessionId,
        question_id: QuestionId,
        answer: Answer,
    ) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| DomainError::session_not_found(id))?;
        record.answers.upsert(question_id, answer);
        Ok(())
    }

    async fn append_turn(&self, id: &SessionId, turn: Turn) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| DomainError::session_not_found(id))?;
        record.history.push(turn);
        Ok(())
    }

    async fn get_history(&self, id: &SessionId) -> Result<Vec<Turn>, DomainError> {
        let records = self.records.read().await;
        records
            .get(id)
            .map(|r| r.history.clone())
            .ok_or_else(|| DomainError::session_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Confidence, ErrorCode, FunnelId};
    use crate::domain::intake::NormalizedValue;
    use crate::domain::progress::Progress;
    use std::collections::BTreeMap;

    fn new_session() -> Session {
        Session::new(
            FunnelId::new("local_visibility").unwrap(),
            BTreeMap::new(),
            Progress::empty(&[]),
        )
    }

    #[tokio::test]
    async fn round_trips_a_session() {
        let store = InMemoryStore::new();
        let session = new_session();
        store.create_session(&session).await.unwrap();

        let loaded = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, session.id);
        assert!(store.get_session(&SessionId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn patch_applies_and_bumps_updated_at() {
        let store = InMemoryStore::new();
        let session = new_session();
        store.create_session(&session).await.unwrap();

        store
            .update_session(&session.id, SessionPatch::new().user_name("Maria"))
            .await
            .unwrap();

        let loaded = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.user_name.as_deref(), Some("Maria"));
        assert!(!loaded.updated_at.is_before(&session.updated_at));
    }

    #[tokio::test]
    async fn answers_upsert_by_question_id() {
        let store = InMemoryStore::new();
        let session = new_session();
        store.create_session(&session).await.unwrap();

        let budget = QuestionId::new("budget").unwrap();
        store
            .upsert_answer(
                &session.id,
                budget.clone(),
                Answer::new(
                    "500",
                    NormalizedValue::Text("500".to_string()),
                    Confidence::Partial,
                ),
            )
            .await
            .unwrap();
        store
            .upsert_answer(
                &session.id,
                budget.clone(),
                Answer::new(
                    "actually $800 a month",
                    NormalizedValue::Text("$800/month".to_string()),
                    Confidence::Certain,
                ),
            )
            .await
            .unwrap();

        let answers = store.get_answers(&session.id).await.unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(
            answers.get(&budget).unwrap().normalized_value.display(),
            "$800/month"
        );
    }

    #[tokio::test]
    async fn history_preserves_append_order() {
        let store = InMemoryStore::new();
        let session = new_session();
        store.create_session(&session).await.unwrap();

        store
            .append_turn(&session.id, Turn::user("hello"))
            .await
            .unwrap();
        store
            .append_turn(&session.id, Turn::assistant("hi there"))
            .await
            .unwrap();

        let history = store.get_history(&session.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "hello");
        assert_eq!(history[1].content, "hi there");
    }

    #[tokio::test]
    async fn unknown_session_errors_carry_the_not_found_code() {
        let store = InMemoryStore::new();
        let missing = SessionId::new();

        let err = store.get_answers(&missing).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionNotFound);

        let err = store
            .append_turn(&missing, Turn::user("hello"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionNotFound);
    }
}

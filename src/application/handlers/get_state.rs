//! GetState query handler.
//!
//! Read-only snapshot of a session: conversation, answers, and freshly
//! recomputed progress and unlock status. Takes no lock; a concurrent
//! turn may land between reads, which is acceptable for a debug/render
//! surface.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::config::FunnelCatalog;
use crate::domain::conversation::Turn;
use crate::domain::foundation::{DomainError, FunnelId, SessionId};
use crate::domain::intake::AnswerSet;
use crate::domain::progress::{compute_progress, Progress};
use crate::domain::session::UpgradeMode;
use crate::domain::unlock::{evaluate_components, UnlockStatus};
use crate::ports::SessionStore;

use super::ComponentDefinition;

/// Errors that can occur when reading session state.
#[derive(Debug, Error)]
pub enum GetStateError {
    /// Session was not found.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// The session references a funnel missing from the catalog.
    #[error("Funnel not found: {0}")]
    FunnelNotFound(FunnelId),

    /// Store error during reads.
    #[error("Store error: {0}")]
    Store(#[from] DomainError),
}

/// Full read-model of one session.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub session_id: SessionId,
    pub funnel_id: FunnelId,
    pub bubble_answers: BTreeMap<String, String>,
    pub user_name: Option<String>,
    pub conversation: Vec<Turn>,
    pub answers: AnswerSet,
    pub progress: Progress,
    pub unlock: UnlockStatus,
    pub is_complete: bool,
    pub upgrade_mode: Option<UpgradeMode>,
    pub component_definitions: Vec<ComponentDefinition>,
}

/// Handler for GetState queries.
pub struct GetStateHandler<S>
where
    S: SessionStore,
{
    catalog: Arc<FunnelCatalog>,
    store: Arc<S>,
}

impl<S> GetStateHandler<S>
where
    S: SessionStore,
{
    pub fn new(catalog: Arc<FunnelCatalog>, store: Arc<S>) -> Self {
        Self { catalog, store }
    }

    /// Handles a state query.
    pub async fn handle(&self, session_id: SessionId) -> Result<StateSnapshot, GetStateError> {
        let session = self
            .store
            .get_session(&session_id)
            .await?
            .ok_or(GetStateError::SessionNotFound(session_id))?;
        let funnel = self
            .catalog
            .funnel(&session.funnel_id)
            .ok_or_else(|| GetStateError::FunnelNotFound(session.funnel_id.clone()))?;

        let conversation = self.store.get_history(&session_id).await?;
        let answers = self.store.get_answers(&session_id).await?;
        let progress = compute_progress(&answers, &funnel.questions);
        let unlock = evaluate_components(&answers, &funnel.components, &progress);

        Ok(StateSnapshot {
            session_id,
            funnel_id: session.funnel_id,
            bubble_answers: session.bubble_answers,
            user_name: session.user_name,
            conversation,
            answers,
            progress,
            unlock,
            is_complete: session.is_complete,
            upgrade_mode: session.upgrade_mode,
            component_definitions: funnel
                .components
                .iter()
                .map(ComponentDefinition::from_component)
                .collect(),
        })
    }
}

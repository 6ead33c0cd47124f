//! StartConversation command handler.
//!
//! Creates a session for a funnel from the bubble-intake answers and asks
//! the oracle for the opening greeting turn.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;

use crate::config::FunnelCatalog;
use crate::domain::conversation::{
    build_system_context, fallback_greeting, opening_instruction, Turn,
};
use crate::domain::foundation::{DomainError, FunnelId, SessionId};
use crate::domain::progress::Progress;
use crate::domain::session::Session;
use crate::ports::{ExtractionOracle, SessionStore};

use super::ComponentDefinition;

/// Command to start a new intake conversation.
#[derive(Debug, Clone)]
pub struct StartConversationCommand {
    /// The funnel the user selected.
    pub funnel_id: FunnelId,
    /// Upfront multiple-choice answers, keyed by bubble question id.
    pub bubble_answers: BTreeMap<String, String>,
}

/// Errors that can occur when starting a conversation.
#[derive(Debug, Error)]
pub enum StartConversationError {
    /// The requested funnel is not in the catalog.
    #[error("Funnel not found: {0}")]
    FunnelNotFound(FunnelId),

    /// Store error during persistence.
    #[error("Store error: {0}")]
    Store(#[from] DomainError),
}

/// Result of starting a conversation.
#[derive(Debug, Clone)]
pub struct StartConversationResult {
    pub session_id: SessionId,
    /// The assistant's greeting turn.
    pub first_message: String,
    pub progress: Progress,
    /// Components of the selected funnel, for callers to render.
    pub component_definitions: Vec<ComponentDefinition>,
}

/// Handler for StartConversation commands.
pub struct StartConversationHandler<S, O>
where
    S: SessionStore,
    O: ExtractionOracle,
{
    catalog: Arc<FunnelCatalog>,
    store: Arc<S>,
    oracle: Arc<O>,
    oracle_timeout: Duration,
}

impl<S, O> StartConversationHandler<S, O>
where
    S: SessionStore,
    O: ExtractionOracle,
{
    pub fn new(
        catalog: Arc<FunnelCatalog>,
        store: Arc<S>,
        oracle: Arc<O>,
        oracle_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            store,
            oracle,
            oracle_timeout,
        }
    }

    /// Handles a start conversation command.
    pub async fn handle(
        &self,
        cmd: StartConversationCommand,
    ) -> Result<StartConversationResult, StartConversationError> {
        let funnel = self
            .catalog
            .funnel(&cmd.funnel_id)
            .ok_or_else(|| StartConversationError::FunnelNotFound(cmd.funnel_id.clone()))?;

        let session = Session::new(
            funnel.id.clone(),
            cmd.bubble_answers,
            Progress::empty(&funnel.questions),
        );
        let session_id = session.id;
        self.store.create_session(&session).await?;

        // The persona greets and asks for the user's name before any
        // intake questions; an unreachable oracle degrades to a canned
        // greeting rather than failing session creation.
        let system_context = format!(
            "{}\n\n{}",
            build_system_context(&funnel.system_prompt_template, &session.bubble_answers),
            opening_instruction(),
        );
        let first_message = match timeout(
            self.oracle_timeout,
            self.oracle.generate_reply(&[], &system_context),
        )
        .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                tracing::warn!(session_id = %session_id, error = %err, "greeting degraded");
                fallback_greeting()
            }
            Err(_) => {
                tracing::warn!(session_id = %session_id, "greeting timed out");
                fallback_greeting()
            }
        };

        self.store
            .append_turn(&session_id, Turn::assistant(&first_message))
            .await?;

        tracing::info!(session_id = %session_id, funnel = %funnel.id, "conversation started");

        Ok(StartConversationResult {
            session_id,
            first_message,
            progress: session.progress,
            component_definitions: funnel
                .components
                .iter()
                .map(ComponentDefinition::from_component)
                .collect(),
        })
    }
}

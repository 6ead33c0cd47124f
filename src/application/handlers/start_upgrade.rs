//! StartUpgrade command handler - the upgrade flow controller entry.
//!
//! Computes what stands between the session and the targeted component
//! (missing questions, or quality issues when everything is answered),
//! activates upgrade mode on the session, and has the oracle open the
//! focused sub-conversation. Re-entry for a different component simply
//! overwrites: last request wins.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;

use crate::application::SessionLocks;
use crate::config::FunnelCatalog;
use crate::domain::conversation::{
    build_system_context, degraded_turn_reply, missing_questions_prompt, quality_issues_prompt,
    Turn,
};
use crate::domain::foundation::{ComponentId, DomainError, FunnelId, SessionId};
use crate::domain::progress::compute_progress;
use crate::domain::session::{SessionPatch, UpgradeMode};
use crate::domain::unlock::{evaluate_components, failing_quality_checks};
use crate::ports::{ExtractionOracle, SessionStore};

/// Command to start (or redirect) an upgrade toward one component.
#[derive(Debug, Clone)]
pub struct StartUpgradeCommand {
    pub session_id: SessionId,
    /// The component the user wants unlocked.
    pub component_id: ComponentId,
}

/// Errors that can occur when starting an upgrade.
#[derive(Debug, Error)]
pub enum StartUpgradeError {
    /// Session was not found.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// The session references a funnel missing from the catalog.
    #[error("Funnel not found: {0}")]
    FunnelNotFound(FunnelId),

    /// The requested component is not configured for this funnel.
    #[error("Component not found: {0}")]
    ComponentNotFound(ComponentId),

    /// Store error during persistence.
    #[error("Store error: {0}")]
    Store(#[from] DomainError),
}

/// Result of an upgrade request.
#[derive(Debug, Clone, PartialEq)]
pub enum StartUpgradeResult {
    /// Nothing to do; the component is already unlocked.
    AlreadyUnlocked { component_id: ComponentId },
    /// Upgrade mode is active; the assistant has opened the sub-flow.
    Started {
        mode: UpgradeMode,
        /// The assistant's opening message for the sub-flow.
        assistant_message: String,
    },
}

/// Handler for StartUpgrade commands.
pub struct StartUpgradeHandler<S, O>
where
    S: SessionStore,
    O: ExtractionOracle,
{
    catalog: Arc<FunnelCatalog>,
    locks: Arc<SessionLocks>,
    store: Arc<S>,
    oracle: Arc<O>,
    oracle_timeout: Duration,
}

impl<S, O> StartUpgradeHandler<S, O>
where
    S: SessionStore,
    O: ExtractionOracle,
{
    pub fn new(
        catalog: Arc<FunnelCatalog>,
        locks: Arc<SessionLocks>,
        store: Arc<S>,
        oracle: Arc<O>,
        oracle_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            locks,
            store,
            oracle,
            oracle_timeout,
        }
    }

    /// Handles an upgrade request.
    pub async fn handle(
        &self,
        cmd: StartUpgradeCommand,
    ) -> Result<StartUpgradeResult, StartUpgradeError> {
        let _turn_guard = self.locks.acquire(cmd.session_id).await;

        let session = self
            .store
            .get_session(&cmd.session_id)
            .await?
            .ok_or(StartUpgradeError::SessionNotFound(cmd.session_id))?;
        let funnel = self
            .catalog
            .funnel(&session.funnel_id)
            .ok_or_else(|| StartUpgradeError::FunnelNotFound(session.funnel_id.clone()))?;
        let component = funnel
            .component(&cmd.component_id)
            .ok_or_else(|| StartUpgradeError::ComponentNotFound(cmd.component_id.clone()))?;

        let answers = self.store.get_answers(&cmd.session_id).await?;

        let missing: Vec<_> = component
            .requirements
            .all_required_questions()
            .into_iter()
            .filter(|id| !answers.is_answered(id))
            .collect();

        let (mode, prompt) = if missing.is_empty() {
            let progress = compute_progress(&answers, &funnel.questions);
            let unlock = evaluate_components(&answers, &funnel.components, &progress);
            if unlock.is_unlocked(&component.id) {
                return Ok(StartUpgradeResult::AlreadyUnlocked {
                    component_id: component.id.clone(),
                });
            }

            // Every question is answered; the blockers are quality.
            let issues = failing_quality_checks(component, &answers);
            let prompt = quality_issues_prompt(&component.name, &issues, &funnel.questions);
            (
                UpgradeMode::for_quality_issues(component.id.clone(), issues),
                prompt,
            )
        } else {
            let missing_questions: Vec<_> = missing
                .iter()
                .filter_map(|id| funnel.question(id))
                .collect();
            let prompt = missing_questions_prompt(&component.name, &missing_questions);
            (
                UpgradeMode::for_missing_questions(component.id.clone(), missing),
                prompt,
            )
        };

        tracing::info!(
            session_id = %cmd.session_id,
            component = %component.id,
            questions_needed = mode.questions_needed.len(),
            quality_only = mode.is_quality_only(),
            "upgrade started"
        );

        self.store
            .update_session(&cmd.session_id, SessionPatch::new().upgrade_mode(mode.clone()))
            .await?;

        let system_context = format!(
            "{}\n\n{}",
            build_system_context(&funnel.system_prompt_template, &session.bubble_answers),
            prompt,
        );
        let history = self.store.get_history(&cmd.session_id).await?;
        let assistant_message = match timeout(
            self.oracle_timeout,
            self.oracle.generate_reply(&history, &system_context),
        )
        .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                tracing::warn!(session_id = %cmd.session_id, error = %err, "upgrade opener degraded");
                degraded_turn_reply()
            }
            Err(_) => {
                tracing::warn!(session_id = %cmd.session_id, "upgrade opener timed out");
                degraded_turn_reply()
            }
        };

        self.store
            .append_turn(&cmd.session_id, Turn::assistant(&assistant_message))
            .await?;

        Ok(StartUpgradeResult::Started {
            mode,
            assistant_message,
        })
    }
}

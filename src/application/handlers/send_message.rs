//! SendMessage command handler - the conversation orchestrator.
//!
//! One call runs a full turn: reply generation, turn persistence,
//! stateless full-history extraction, progress and unlock recomputation,
//! and upgrade routing. The session lock is held across the whole
//! read-modify-write sequence, so turns within one session never
//! interleave.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;

use crate::application::SessionLocks;
use crate::config::{FunnelCatalog, FunnelDefinition};
use crate::domain::conversation::{
    build_system_context, completion_message, degraded_turn_reply, ready_for_report_reply, Turn,
};
use crate::domain::foundation::{DomainError, FunnelId, SessionId};
use crate::domain::intake::Answer;
use crate::domain::progress::{compute_progress, Progress};
use crate::domain::session::{Session, SessionPatch, UpgradeProgress};
use crate::domain::unlock::{evaluate_components, UnlockStatus};
use crate::domain::intake::NormalizedValue;
use crate::ports::{ExtractionOracle, ExtractionResult, SessionStore, USER_NAME_KEY};

/// Command to send a user message within a session.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub session_id: SessionId,
    /// The message content.
    pub content: String,
}

impl SendMessageCommand {
    pub fn new(session_id: SessionId, content: impl Into<String>) -> Self {
        Self {
            session_id,
            content: content.into(),
        }
    }
}

/// Errors that can occur when processing a turn.
#[derive(Debug, Error)]
pub enum SendMessageError {
    /// Message content is empty or whitespace only.
    #[error("Validation error: message content cannot be empty")]
    EmptyContent,

    /// Session was not found.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// The session references a funnel missing from the catalog.
    #[error("Funnel not found: {0}")]
    FunnelNotFound(FunnelId),

    /// Store error during persistence.
    #[error("Store error: {0}")]
    Store(#[from] DomainError),
}

/// How the active upgrade moved this turn, if one was active.
#[derive(Debug, Clone, PartialEq)]
pub enum UpgradeOutcome {
    /// The targeted component unlocked (or every originally-missing
    /// question got answered). Upgrade mode is now inactive.
    Completed { message: String },
    /// Still collecting; `answered/total` over the original missing list.
    InProgress(UpgradeProgress),
}

/// Result of one conversation turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// The assistant's conversational reply.
    pub response: String,
    pub progress: Progress,
    pub unlock: UnlockStatus,
    pub is_complete: bool,
    /// Present only while an upgrade was active this turn.
    pub upgrade: Option<UpgradeOutcome>,
}

/// Handler for SendMessage commands.
pub struct SendMessageHandler<S, O>
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

impl<S, O> SendMessageHandler<S, O>
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

    /// Handles one conversation turn.
    pub async fn handle(&self, cmd: SendMessageCommand) -> Result<TurnResult, SendMessageError> {
        let content = cmd.content.trim();
        if content.is_empty() {
            return Err(SendMessageError::EmptyContent);
        }

        let _turn_guard = self.locks.acquire(cmd.session_id).await;

        let session = self
            .store
            .get_session(&cmd.session_id)
            .await?
            .ok_or(SendMessageError::SessionNotFound(cmd.session_id))?;
        let funnel = self
            .catalog
            .funnel(&session.funnel_id)
            .ok_or_else(|| SendMessageError::FunnelNotFound(session.funnel_id.clone()))?;

        // A complete session that is not upgrading never reaches the
        // oracle; nothing is persisted for this exchange.
        if session.is_complete && !session.is_upgrading() {
            self.locks.release(&cmd.session_id);
            return Ok(TurnResult {
                response: ready_for_report_reply(&funnel.label),
                progress: session.progress,
                unlock: UnlockStatus {
                    unlocked: session.unlocked_components.clone(),
                    ..UnlockStatus::default()
                },
                is_complete: true,
                upgrade: None,
            });
        }

        let system_context =
            build_system_context(&funnel.system_prompt_template, &session.bubble_answers);

        let mut history = self.store.get_history(&cmd.session_id).await?;
        history.push(Turn::user(content));

        let response = self.generate_reply(&cmd.session_id, &history, &system_context).await;

        self.store
            .append_turn(&cmd.session_id, Turn::user(content))
            .await?;
        self.store
            .append_turn(&cmd.session_id, Turn::assistant(&response))
            .await?;

        // Extraction re-reads the whole conversation, so later turns can
        // overwrite what earlier ones established. A failed extraction
        // yields an empty delta; the persisted reply stands regardless.
        history.push(Turn::assistant(&response));
        let extracted = self.extract(&cmd.session_id, &history, funnel).await;
        self.save_extracted(&cmd.session_id, &session, funnel, extracted)
            .await?;

        let answers = self.store.get_answers(&cmd.session_id).await?;
        let progress = compute_progress(&answers, &funnel.questions);
        let unlock = evaluate_components(&answers, &funnel.components, &progress);

        if let Some(upgrade) = &session.upgrade_mode {
            let unlocked_now = unlock.is_unlocked(&upgrade.target_component);
            if unlocked_now || upgrade.all_questions_answered(&answers) {
                let component_name = funnel
                    .component(&upgrade.target_component)
                    .map(|c| c.name.as_str())
                    .unwrap_or_else(|| upgrade.target_component.as_str());
                let message = completion_message(component_name);

                self.store
                    .append_turn(&cmd.session_id, Turn::assistant(&message))
                    .await?;
                self.store
                    .update_session(
                        &cmd.session_id,
                        SessionPatch::new()
                            .clear_upgrade_mode()
                            .unlocked_components(unlock.unlocked.clone())
                            .progress(progress)
                            .is_complete(progress.is_complete),
                    )
                    .await?;

                tracing::info!(
                    session_id = %cmd.session_id,
                    component = %upgrade.target_component,
                    "upgrade completed"
                );

                let is_complete = progress.is_complete;
                if is_complete {
                    self.locks.release(&cmd.session_id);
                }
                return Ok(TurnResult {
                    response,
                    progress,
                    unlock,
                    is_complete,
                    upgrade: Some(UpgradeOutcome::Completed { message }),
                });
            }

            let interim = upgrade.progress_against(&answers);
            self.store
                .update_session(
                    &cmd.session_id,
                    SessionPatch::new().unlocked_components(unlock.unlocked.clone()),
                )
                .await?;

            let is_complete = progress.is_complete;
            return Ok(TurnResult {
                response,
                progress,
                unlock,
                is_complete,
                upgrade: Some(UpgradeOutcome::InProgress(interim)),
            });
        }

        self.store
            .update_session(
                &cmd.session_id,
                SessionPatch::new()
                    .unlocked_components(unlock.unlocked.clone())
                    .progress(progress)
                    .is_complete(progress.is_complete),
            )
            .await?;

        // A completed session takes no further serialized turns; its lock
        // entry would otherwise sit in the registry forever.
        let is_complete = progress.is_complete;
        if is_complete {
            self.locks.release(&cmd.session_id);
        }
        Ok(TurnResult {
            response,
            progress,
            unlock,
            is_complete,
            upgrade: None,
        })
    }

    /// Reply generation with the configured deadline; transport failures
    /// degrade to a canned continuation line instead of failing the turn.
    async fn generate_reply(
        &self,
        session_id: &SessionId,
        history: &[Turn],
        system_context: &str,
    ) -> String {
        match timeout(
            self.oracle_timeout,
            self.oracle.generate_reply(history, system_context),
        )
        .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                tracing::warn!(session_id = %session_id, error = %err, "reply degraded");
                degraded_turn_reply()
            }
            Err(_) => {
                tracing::warn!(session_id = %session_id, "reply timed out");
                degraded_turn_reply()
            }
        }
    }

    /// Extraction with the configured deadline; any failure yields an
    /// empty delta and the turn continues from existing answers.
    async fn extract(
        &self,
        session_id: &SessionId,
        history: &[Turn],
        funnel: &FunnelDefinition,
    ) -> ExtractionResult {
        match timeout(
            self.oracle_timeout,
            self.oracle.extract(history, &funnel.questions),
        )
        .await
        {
            Ok(Ok(extracted)) => extracted,
            Ok(Err(err)) => {
                tracing::warn!(session_id = %session_id, error = %err, "extraction degraded");
                ExtractionResult::new()
            }
            Err(_) => {
                tracing::warn!(session_id = %session_id, "extraction timed out");
                ExtractionResult::new()
            }
        }
    }

    /// Upserts each usable extracted field. `user_name` routes onto the
    /// session; fields with zero confidence or an absent value are
    /// dropped, leaving any earlier answer in place.
    async fn save_extracted(
        &self,
        session_id: &SessionId,
        session: &Session,
        funnel: &FunnelDefinition,
        extracted: ExtractionResult,
    ) -> Result<(), DomainError> {
        for (question_id, field) in extracted {
            if question_id.as_str() == USER_NAME_KEY {
                if let serde_json::Value::String(name) = &field.normalized_value {
                    if !name.trim().is_empty() && session.user_name.as_deref() != Some(name) {
                        self.store
                            .update_session(session_id, SessionPatch::new().user_name(name.trim()))
                            .await?;
                        tracing::debug!(session_id = %session_id, "user name extracted");
                    }
                }
                continue;
            }

            let Some(question) = funnel.question(&question_id) else {
                tracing::debug!(
                    session_id = %session_id,
                    question = %question_id,
                    "extraction returned unknown question id"
                );
                continue;
            };
            if !field.confidence.is_extracted() {
                continue;
            }
            let normalized = NormalizedValue::from_raw(&field.normalized_value, question);
            if normalized.is_absent() {
                continue;
            }

            tracing::debug!(
                session_id = %session_id,
                question = %question_id,
                confidence = field.confidence.score(),
                "answer saved"
            );
            self.store
                .upsert_answer(
                    session_id,
                    question_id,
                    Answer::new(field.raw_answer, normalized, field.confidence),
                )
                .await?;
        }
        Ok(())
    }
}

//! Session aggregate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ComponentId, FunnelId, SessionId, Timestamp};
use crate::domain::progress::Progress;

use super::upgrade::UpgradeMode;

/// An intake session: funnel selection, bubble-intake answers, running
/// progress snapshot, unlocked components, and the optional upgrade
/// sub-state.
///
/// The extracted answer set and the turn history live in the store and are
/// loaded separately; the aggregate carries the derived snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub funnel_id: FunnelId,
    /// Fixed upfront multiple-choice intake, keyed by bubble question id.
    pub bubble_answers: BTreeMap<String, String>,
    /// Name the oracle extracted from the conversation, if any.
    pub user_name: Option<String>,
    /// Latest computed progress snapshot.
    pub progress: Progress,
    /// Components unlocked as of the last evaluated turn.
    pub unlocked_components: Vec<ComponentId>,
    /// Whether enough data has been collected for the full report.
    pub is_complete: bool,
    /// Active upgrade sub-state; `None` when not upgrading.
    pub upgrade_mode: Option<UpgradeMode>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Session {
    /// Creates a fresh session for a funnel.
    pub fn new(
        funnel_id: FunnelId,
        bubble_answers: BTreeMap<String, String>,
        initial_progress: Progress,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: SessionId::new(),
            funnel_id,
            bubble_answers,
            user_name: None,
            progress: initial_progress,
            unlocked_components: Vec::new(),
            is_complete: false,
            upgrade_mode: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True while an upgrade sub-conversation is running.
    pub fn is_upgrading(&self) -> bool {
        self.upgrade_mode.is_some()
    }

    /// Applies a partial update, bumping `updated_at`.
    pub fn apply(&mut self, patch: SessionPatch) {
        if let Some(user_name) = patch.user_name {
            self.user_name = Some(user_name);
        }
        if let Some(progress) = patch.progress {
            self.progress = progress;
        }
        if let Some(unlocked) = patch.unlocked_components {
            self.unlocked_components = unlocked;
        }
        if let Some(is_complete) = patch.is_complete {
            self.is_complete = is_complete;
        }
        if let Some(upgrade_mode) = patch.upgrade_mode {
            self.upgrade_mode = upgrade_mode;
        }
        self.updated_at = Timestamp::now();
    }
}

/// Partial update of a session, built with the setter methods.
///
/// Unset fields keep their current value; `upgrade_mode` distinguishes
/// "leave alone" from "clear".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    user_name: Option<String>,
    progress: Option<Progress>,
    unlocked_components: Option<Vec<ComponentId>>,
    is_complete: Option<bool>,
    upgrade_mode: Option<Option<UpgradeMode>>,
}

impl SessionPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the extracted user name.
    pub fn user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    /// Sets the progress snapshot.
    pub fn progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Sets the unlocked component list.
    pub fn unlocked_components(mut self, unlocked: Vec<ComponentId>) -> Self {
        self.unlocked_components = Some(unlocked);
        self
    }

    /// Sets the completion flag.
    pub fn is_complete(mut self, complete: bool) -> Self {
        self.is_complete = Some(complete);
        self
    }

    /// Activates (or replaces) the upgrade sub-state.
    pub fn upgrade_mode(mut self, upgrade: UpgradeMode) -> Self {
        self.upgrade_mode = Some(Some(upgrade));
        self
    }

    /// Clears the upgrade sub-state.
    pub fn clear_upgrade_mode(mut self) -> Self {
        self.upgrade_mode = Some(None);
        self
    }

    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

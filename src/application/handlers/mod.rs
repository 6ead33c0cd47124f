//! Command handlers.
//!
//! One file per command, each with its own command, result, and error
//! types. All handlers are generic over the [`crate::ports`] traits so
//! tests can run them against the mock oracle and the in-memory store.

mod get_state;
mod send_message;
mod start_conversation;
mod start_upgrade;

pub use get_state::{GetStateError, GetStateHandler, StateSnapshot};
pub use send_message::{
    SendMessageCommand, SendMessageError, SendMessageHandler, TurnResult, UpgradeOutcome,
};
pub use start_conversation::{
    StartConversationCommand, StartConversationError, StartConversationHandler,
    StartConversationResult,
};
pub use start_upgrade::{StartUpgradeCommand, StartUpgradeError, StartUpgradeHandler, StartUpgradeResult};

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ComponentId;
use crate::domain::unlock::ReportComponent;

/// Caller-facing view of one report component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub id: ComponentId,
    pub name: String,
    pub description: String,
}

impl ComponentDefinition {
    pub fn from_component(component: &ReportComponent) -> Self {
        Self {
            id: component.id.clone(),
            name: component.name.clone(),
            description: component.description.clone(),
        }
    }
}

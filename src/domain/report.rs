//! Report payload and request types.
//!
//! Report generation itself lives outside this crate; these types define
//! the shape of a generated component report and the request assembled
//! from an intake session for the generator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ComponentId, FunnelId, SessionId};
use crate::domain::intake::AnswerSet;
use crate::domain::session::Session;
use crate::domain::unlock::ReportComponent;

/// One titled block of a generated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub heading: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A fully generated report for one unlocked component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub component_id: ComponentId,
    pub component_name: String,
    pub executive_summary: String,
    pub sections: Vec<ReportSection>,
}

/// Everything a report generator needs for one component: who the
/// business is, which funnel and component, and the collected answers
/// flattened to display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub session_id: SessionId,
    pub funnel_id: FunnelId,
    pub component_id: ComponentId,
    pub component_name: String,
    pub business_context: BusinessContext,
    pub collected_answers: BTreeMap<String, String>,
}

/// Bubble-phase context carried into every report request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geography: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_maturity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl BusinessContext {
    pub fn from_session(session: &Session) -> Self {
        let bubble = |key: &str| session.bubble_answers.get(key).cloned();
        Self {
            business_type: bubble("business_type"),
            geography: bubble("geography"),
            marketing_maturity: bubble("marketing_maturity"),
            user_name: session.user_name.clone(),
        }
    }
}

impl ReportRequest {
    /// Assembles a request for one component. Answers normalize to their
    /// display form; absent answers fall back to the raw text.
    pub fn build(session: &Session, answers: &AnswerSet, component: &ReportComponent) -> Self {
        let collected_answers = answers
            .iter()
            .filter(|(_, answer)| answer.is_answered())
            .map(|(id, answer)| {
                let value = if answer.normalized_value.is_absent() {
                    answer.raw_answer.clone()
                } else {
                    answer.normalized_value.display()
                };
                (id.to_string(), value)
            })
            .collect();

        Self {
            session_id: session.id,
            funnel_id: session.funnel_id.clone(),
            component_id: component.id.clone(),
            component_name: component.name.clone(),
            business_context: BusinessContext::from_session(session),
            collected_answers,
        }
    }
}

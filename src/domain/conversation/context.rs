//! Assistant context assembly.
//!
//! Builds the system context string for the conversational oracle and the
//! synthesized instructions that drive the upgrade sub-flow. Pure string
//! assembly; the oracle adapter decides how the text reaches the model.

use std::collections::BTreeMap;

use crate::domain::intake::Question;
use crate::domain::unlock::QualityIssue;

/// Interpolates bubble answers into the funnel's system prompt template.
///
/// Recognized placeholders: `{business_type}`, `{geography}`,
/// `{marketing_maturity}`. Unanswered bubbles fall back to neutral
/// wording so the template never leaks a bare placeholder.
pub fn build_system_context(
    template: &str,
    bubble_answers: &BTreeMap<String, String>,
) -> String {
    let get = |key: &str, fallback: &str| -> String {
        bubble_answers
            .get(key)
            .map(String::as_str)
            .unwrap_or(fallback)
            .to_string()
    };

    template
        .replace("{business_type}", &get("business_type", "business"))
        .replace("{geography}", &get("geography", "area"))
        .replace("{marketing_maturity}", &get("marketing_maturity", "basics"))
}

/// Instruction sent to the oracle when an upgrade starts with missing
/// questions: acknowledge the request and ask the first one.
pub fn missing_questions_prompt(component_name: &str, missing: &[&Question]) -> String {
    let question_list = missing
        .iter()
        .map(|q| q.question_template.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let first = missing
        .first()
        .map(|q| q.question_template.as_str())
        .unwrap_or_default();

    format!(
        "The user wants to unlock the \"{component_name}\" report component. \
         To do this, I need to ask {count} more question(s).\n\n\
         Missing questions: {question_list}\n\n\
         I should:\n\
         1. Acknowledge their request: \"Great! To create your {component_name}, \
         I need {count} more quick question(s).\"\n\
         2. Ask the first missing question: \"{first}\"\n\
         3. Keep it brief and focused - don't re-ask things I already know\n\
         4. Reference their previous answers when relevant\n\n\
         Start by acknowledging and asking the first missing question.",
        count = missing.len(),
    )
}

/// Instruction sent to the oracle when every question is answered but
/// quality checks still fail: ask for more detail on exactly those fields.
pub fn quality_issues_prompt(
    component_name: &str,
    issues: &[QualityIssue],
    questions: &[Question],
) -> String {
    let mut prompt = format!(
        "The user wants to unlock the \"{component_name}\" report component. \
         All required questions are answered, but the answers need more detail \
         to generate a quality report.\n\nQuality issues found:\n"
    );
    for issue in issues {
        prompt.push_str(&format!("- {}: {}\n", issue.field, issue.reason));
    }
    prompt.push_str("\nI should ask follow-up questions to get more detailed answers. For example:\n");
    for issue in issues {
        if let Some(question) = questions.iter().find(|q| q.id == issue.field) {
            prompt.push_str(&format!(
                "- For \"{}\": Ask for more specific details\n",
                question.question_template
            ));
        }
    }
    prompt.push_str(
        "\nBe warm and helpful - explain that I need a bit more detail to create \
         their personalized report.",
    );
    prompt
}

/// Congratulatory line emitted when an upgrade completes.
pub fn completion_message(component_name: &str) -> String {
    format!(
        "Perfect! I now have everything I need to create your {component_name} report. \
         You can generate it now!"
    )
}

/// Opening instruction for a brand-new conversation. The persona greets
/// warmly and asks for the user's name before any intake questions.
pub fn opening_instruction() -> String {
    "You are starting a new conversation. Follow your instructions: greet them \
     warmly and ask for their name first before asking any marketing questions."
        .to_string()
}

/// Canned greeting used when the oracle is unreachable at session start.
pub fn fallback_greeting() -> String {
    "Hi! I'm excited to help you build your marketing plan. What's your name?".to_string()
}

/// Canned reply for a complete session that is not upgrading.
pub fn ready_for_report_reply(funnel_label: &str) -> String {
    format!(
        "I already have all the information I need to create your {} report. \
         Would you like me to generate it now?",
        funnel_label.to_lowercase()
    )
}

/// Continuation line used when the conversational oracle fails mid-turn.
pub fn degraded_turn_reply() -> String {
    "Thanks! I didn't quite catch any new details there - let's keep going.".to_string()
}

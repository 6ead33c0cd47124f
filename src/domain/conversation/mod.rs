//! Conversation module - turn history and assistant context assembly.

mod context;
mod turn;

pub use context::{
    build_system_context, completion_message, degraded_turn_reply, fallback_greeting,
    missing_questions_prompt, opening_instruction, quality_issues_prompt, ready_for_report_reply,
};
pub use turn::{Turn, TurnRole};

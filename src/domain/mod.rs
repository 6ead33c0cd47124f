//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `intake` - Question schema, extracted answers, and normalization
//! - `progress` - Completion percentage and answer-quality scoring
//! - `unlock` - Report components, quality checks, and the unlock engine
//! - `session` - Intake session aggregate and upgrade sub-state
//! - `conversation` - Turn history and assistant context assembly
//! - `report` - Structured report payload types

pub mod conversation;
pub mod foundation;
pub mod intake;
pub mod progress;
pub mod report;
pub mod session;
pub mod unlock;

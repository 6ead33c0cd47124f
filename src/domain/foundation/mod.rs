//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the intake domain.

mod confidence;
mod errors;
mod ids;
mod percentage;
mod timestamp;

pub use confidence::Confidence;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ComponentId, FunnelId, QuestionId, SessionId};
pub use percentage::Percentage;
pub use timestamp::Timestamp;

//! Unlock module - report components and the progressive-unlock engine.
//!
//! Components are static per-funnel configuration; the engine classifies
//! every component as unlocked, partial, or locked from the current answer
//! set and progress snapshot.

mod component;
mod engine;
mod quality;

pub use component::{ComponentRequirements, ReportComponent};
pub use engine::{evaluate_components, failing_quality_checks, ComponentState, UnlockStatus};
pub use quality::{QualityCheckKind, QualityIssue};

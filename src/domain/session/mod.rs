//! Session module - the intake session aggregate.
//!
//! One session is exclusively owned by one conversation thread; it is the
//! unit of concurrency isolation.

mod aggregate;
mod upgrade;

pub use aggregate::{Session, SessionPatch};
pub use upgrade::{UpgradeMode, UpgradeProgress};

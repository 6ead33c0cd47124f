//! Application layer - async command handlers over the ports.
//!
//! The conversation orchestrator and the upgrade flow controller live here
//! as handlers generic over the oracle and store ports, holding the funnel
//! catalog and the per-session lock registry by `Arc`.

pub mod handlers;
mod session_locks;

pub use session_locks::SessionLocks;

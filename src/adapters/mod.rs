//! Adapters - Implementations of the ports.
//!
//! Adapters connect the domain to the outside world: the OpenAI oracle
//! over reqwest, and the in-memory session store.

pub mod oracle;
pub mod store;

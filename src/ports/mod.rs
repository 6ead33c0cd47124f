//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Oracle Ports
//!
//! - `ExtractionOracle` - Conversational replies plus structured answer
//!   extraction from the full turn history
//!
//! ## Storage Ports
//!
//! - `SessionStore` - Session aggregates, extracted answers, and turn
//!   history persistence

mod extraction_oracle;
mod session_store;

pub use extraction_oracle::{
    ExtractedField, ExtractionOracle, OracleError, ExtractionResult, USER_NAME_KEY,
};
pub use session_store::SessionStore;

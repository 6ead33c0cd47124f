//! Oracle adapters.
//!
//! `OpenAiOracle` is the production implementation; `MockOracle` scripts
//! both sides of the port for orchestration tests.

mod mock_oracle;
mod openai_oracle;
pub mod repair;

pub use mock_oracle::{extracted, extraction_of, MockOracle, MockOracleError};
pub use openai_oracle::{OpenAiOracle, OpenAiOracleConfig};

//! Decision oracle integration: context prompt rendering plus the xAI
//! chat-completions client behind the `DecisionOracle` trait.

pub mod client;
pub mod prompt;

pub use client::{XaiOracle, XaiOracleConfig, XAI_PROD_URL};
pub use prompt::build_prompt;

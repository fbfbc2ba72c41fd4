//! The tick engine and its wiring: per-session bar cache, decision-context
//! assembly, and the minute loop driving the position lifecycle.

pub mod context_builder;
pub mod engine;
pub mod session;

pub use context_builder::{ContextBuilder, ContextInputs};
pub use engine::{EngineSettings, TradingEngine};
pub use session::SessionCache;

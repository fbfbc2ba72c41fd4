//! Outbound sinks. Both are best-effort: the engine logs failures and keeps
//! ticking. A dropped notification or order forward never corrupts state.

pub mod discord;
pub mod traderspost;

pub use discord::DiscordNotifier;
pub use traderspost::TradersPostGateway;

pub mod config;
pub mod config_loader;
pub mod context;
pub mod events;
pub mod position;
pub mod scheduler;
pub mod store;
pub mod traits;

pub use config::{
    AppConfig, DiscordConfig, InstrumentConfig, OracleConfig, RiskConfig, SessionConfig,
    TradersPostConfig, TradierConfig, WebhookConfig,
};
pub use config_loader::ConfigLoader;
pub use context::{
    BandInteraction, CandlePattern, Channel, DecisionContext, EmaRelation, Fundamentals,
    IndicatorSnapshot, MacdValue, MacroSnapshot, PriceRelation, Trend, VwapState,
};
pub use events::{Bar, BarInterval, Quote, Signal, TradeAction};
pub use position::{
    apply_signal, check_partial_exit, check_stop_loss, Effect, Outcome, Position, Side,
};
pub use scheduler::{DecisionGate, TickDecision};
pub use store::PositionStore;
pub use traits::{
    DecisionOracle, FundamentalsSource, MacroSource, MarketData, Notifier, OrderGateway,
};

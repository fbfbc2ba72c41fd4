use anyhow::Result;
use band_trade_alerts::AlertStore;
use band_trade_bot::{ContextBuilder, EngineSettings, SessionCache, TradingEngine};
use band_trade_core::{ConfigLoader, DecisionGate, PositionStore};
use band_trade_oracle::{XaiOracle, XaiOracleConfig};
use band_trade_research::{research_client, WebFundamentals, WebMacro};
use band_trade_sinks::{DiscordNotifier, TradersPostGateway};
use band_trade_tradier::{TradierClient, TradierClientConfig};
use band_trade_webhook::AlertReceiver;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "band-trade")]
#[command(about = "Intraday anchored-VWAP band trader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the trading loop
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Run the inbound alert receiver
    Webhook {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { config } => run_bot(&config).await,
        Commands::Webhook { config } => run_webhook(&config).await,
    }
}

async fn run_bot(config_path: &str) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;
    let data_dir = Path::new(&config.data_dir);
    std::fs::create_dir_all(data_dir)?;

    let settings = EngineSettings::from_config(&config)?;
    let gate = DecisionGate::new(config.session.decision_start, config.session.decision_end);

    let market = TradierClient::new(
        TradierClientConfig::new(config.tradier.token.clone())
            .with_base_url(config.tradier.api_url.clone()),
    )?;
    let oracle = XaiOracle::new(XaiOracleConfig {
        api_url: config.oracle.api_url.clone(),
        api_key: config.oracle.api_key.clone(),
        model: config.oracle.model.clone(),
        timeout_secs: config.oracle.timeout_secs,
    })?;

    let sink_http = reqwest::Client::new();
    let notifier = DiscordNotifier::new(sink_http.clone(), config.discord.webhook_url.clone());
    let gateway = TradersPostGateway::new(
        sink_http,
        config.traderspost.webhook_url.clone(),
        config.instrument.symbol.clone(),
    );

    let research_http = research_client()?;
    let context = ContextBuilder::new(
        Arc::new(WebFundamentals::new(research_http.clone())),
        Arc::new(WebMacro::new(research_http)),
        AlertStore::new(data_dir),
        config.risk.band_touch_threshold,
    );

    let store = PositionStore::new(data_dir.join("position.json"));
    let cache = SessionCache::new(data_dir.join("market_data.csv"));

    let engine = TradingEngine::new(
        settings, gate, market, oracle, notifier, gateway, context, store, cache,
    );
    engine.run().await
}

async fn run_webhook(config_path: &str) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;
    std::fs::create_dir_all(&config.data_dir)?;

    let receiver = AlertReceiver::from_config(&config)?;
    receiver.serve(&config.webhook.bind).await
}

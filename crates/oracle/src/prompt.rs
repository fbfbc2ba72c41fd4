//! Renders a `DecisionContext` into the oracle prompt.
//!
//! Undefined readings are spelled out as "undefined" so the oracle treats
//! missing history as disqualifying rather than as a neutral zero.

use band_trade_core::DecisionContext;

fn num(value: Option<f64>) -> String {
    value.map_or_else(|| "undefined".to_string(), |v| v.to_string())
}

#[must_use]
pub fn build_prompt(ctx: &DecisionContext) -> String {
    let symbol = &ctx.symbol;

    let interaction = ctx
        .band_interaction
        .map_or_else(String::new, |i| format!(" ({i})"));

    let macd = ctx.indicators.macd.map_or_else(
        || "MACD: undefined".to_string(),
        |m| {
            format!(
                "MACD: {}, Signal: {}, Hist: {}",
                m.line, m.signal, m.histogram
            )
        },
    );

    let position = ctx.position.as_ref().map_or_else(
        || "No open position.".to_string(),
        |p| {
            format!(
                "Current open position: {} with {} contracts entered at {}.",
                p.side, p.contracts, p.entry_price
            )
        },
    );

    let ema_line = match (ctx.ema_relation, ctx.indicators.ema21) {
        (Some(relation), Some(ema)) => {
            format!("Price relative to 21-period EMA: {relation} (EMA value: {ema})")
        }
        _ => "Price relative to 21-period EMA: undefined".to_string(),
    };

    let channel = |c: Option<band_trade_core::Channel>| {
        c.map_or_else(|| "undefined".to_string(), |c| c.to_string())
    };

    let candle = ctx
        .candle
        .map_or_else(|| "none".to_string(), |p| p.to_string());

    format!(
        "You are a professional day trader with years of experience trading {symbol} intraday. \
         Your decisions prioritize high-confidence setups and disciplined risk management.\n\
         Analyze {symbol} for a trading signal:\n\
         Current price: {price}{interaction}\n\
         Anchored VWAP: {vwap}\n\
         Outermost bands: Upper {upper3}, Lower {lower3}\n\
         Second bands: Upper {upper2}, Lower {lower2}\n\
         VWAP slope: {slope} (positive=up, negative=down)\n\
         RSI: {rsi}\n\
         {macd}\n\
         ATR: {atr}\n\
         VIX: {vix}\n\
         S&P P/E: {pe}, Dividend Yield: {dividend}, Sectors: {sectors}\n\
         Fed Rate: {fed}, CPI: {cpi}, 10Y Treasury: {treasury}\n\
         Alerts: {alert_summary}\n\
         Oscillator Matrix Alerts (with timestamps): {oscillator}\n\
         Price Action Concepts Alerts (with timestamps): {price_action}\n\
         Session high/low: {session_high}/{session_low}\n\
         Candle pattern: {candle}\n\
         Time: {time}\n\
         {position}\n\
         {ema_line}\n\
         1min channel: {channel_fine}\n\
         30min channel: {channel_coarse}\n\
         \n\
         Strategy: Trade when price interacts with an outer VWAP band and shows bullish candle \
         behavior for long or bearish for short. Give heavy consideration to the alert feed \
         (trend catcher across timeframes, oscillator matrix, price action concepts); for exits, \
         weight higher timeframes (15min/30min) over 3min/5min and handle repeated exit signals \
         by considering persistence or the latest one. Consider the existing position and decide \
         whether to close it. Favor longs above the 21-period EMA, shorts below. Consider whether \
         price is within or has exited the 1min and 30min channels. Enter long on lower band \
         interaction with a bullish candle, short on upper with a bearish candle. Exit on the \
         opposite band touch unless the slope favors your direction, then hold until the second \
         band breaks or the trend flips. Treat any undefined reading as disqualifying.\n\
         Return only: 'long', 'short', 'close long', or 'close short'. High confidence only.",
        price = ctx.price,
        vwap = ctx.vwap.vwap,
        upper3 = ctx.vwap.upper3,
        lower3 = ctx.vwap.lower3,
        upper2 = ctx.vwap.upper2,
        lower2 = ctx.vwap.lower2,
        slope = ctx.vwap.slope,
        rsi = num(ctx.indicators.rsi),
        atr = num(ctx.indicators.atr),
        vix = num(ctx.vix),
        pe = ctx.fundamentals.pe_ratio,
        dividend = ctx.fundamentals.dividend_yield,
        sectors = ctx.fundamentals.sector_weights,
        fed = ctx.macro_data.fed_funds_rate,
        cpi = ctx.macro_data.cpi_yoy,
        treasury = ctx.macro_data.treasury_10y,
        alert_summary = ctx.alert_summary,
        oscillator = ctx.oscillator_alerts,
        price_action = ctx.price_action_alerts,
        session_high = num(ctx.session_high),
        session_low = num(ctx.session_low),
        time = ctx.time_of_day,
        channel_fine = channel(ctx.channel_fine),
        channel_coarse = channel(ctx.channel_coarse),
    )
}

//! TickerLens CLI - indicator and chart-view computations over price files.
//!
//! Every command prints a JSON `ApiResponse` envelope on stdout; logs go to
//! stderr and are controlled with `RUST_LOG`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tickerlens_core::indicators::DEFAULT_MACD_PERIODS;
use tickerlens_core::{
    available_indicators, compute_overlays, ingest, macd, rsi, valuate, ApiResponse, ChartConfig,
    ChartSession, Error, Holdings, IndicatorId, PricePoint, RawPoint, Result, StaticSource,
    TimeRange,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tickerlens")]
#[command(about = "TickerLens CLI - technical indicators and zoomable chart series")]
#[command(version)]
struct Cli {
    /// Config file (defaults to TICKERLENS_CONFIG or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available chart overlays
    List,
    /// Compute indicators over a JSON array of raw points
    Indicators {
        /// Path to the raw points file
        #[arg(short, long)]
        file: PathBuf,
        /// Overlay ids (default: all)
        #[arg(long = "id")]
        ids: Vec<String>,
        /// RSI period
        #[arg(long, default_value = "14")]
        rsi_period: usize,
    },
    /// Show the visible slice of a zoomed chart
    View {
        /// Path to the raw points file
        #[arg(short, long)]
        file: PathBuf,
        /// Window start in percent
        #[arg(long, default_value = "0")]
        from: f64,
        /// Window end in percent
        #[arg(long, default_value = "100")]
        to: f64,
        /// Overlay ids to draw
        #[arg(long = "id")]
        ids: Vec<String>,
        /// Symbol label for the session
        #[arg(short, long, default_value = "FILE")]
        symbol: String,
        /// Time range label (1D, 1W, 1M, 3M, 1Y, ALL)
        #[arg(short, long)]
        range: Option<TimeRange>,
    },
    /// Value holdings at the given quotes
    Value {
        /// Path to the holdings JSON array
        #[arg(long)]
        holdings: PathBuf,
        /// Quote as SYMBOL=PRICE (repeatable)
        #[arg(short, long = "quote")]
        quotes: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match load_config(cli.config.as_deref()) {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    let output = match result {
        Ok(data) => render(&ApiResponse::ok(data)),
        Err(e) => {
            tracing::warn!("Command failed: {}", e);
            render(&ApiResponse::<()>::err(e.to_string()))
        }
    };

    println!("{}", output);
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response)
        .unwrap_or_else(|e| json!({ "ok": false, "error": e.to_string() }).to_string())
}

fn load_config(path: Option<&Path>) -> Result<ChartConfig> {
    match path {
        Some(path) => ChartConfig::load_from_path(path),
        None => ChartConfig::load(),
    }
}

async fn run(command: Commands, config: ChartConfig) -> Result<Value> {
    match command {
        Commands::List => Ok(json!({ "indicators": available_indicators() })),
        Commands::Indicators {
            file,
            ids,
            rsi_period,
        } => handle_indicators(&file, &ids, rsi_period, &config),
        Commands::View {
            file,
            from,
            to,
            ids,
            symbol,
            range,
        } => handle_view(&file, from, to, &ids, &symbol, range, config).await,
        Commands::Value { holdings, quotes } => handle_value(&holdings, &quotes),
    }
}

fn read_points(path: &Path) -> Result<Vec<RawPoint>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn parse_ids(ids: &[String]) -> Result<Vec<IndicatorId>> {
    if ids.is_empty() {
        return Ok(IndicatorId::all());
    }
    ids.iter().map(|id| IndicatorId::parse(id)).collect()
}

fn handle_indicators(
    file: &Path,
    ids: &[String],
    rsi_period: usize,
    config: &ChartConfig,
) -> Result<Value> {
    let ids = parse_ids(ids)?;
    let report = ingest(&read_points(file)?, config.max_points)?;
    let points = report.series.points();
    let overlays = compute_overlays(points, points, &ids);
    let (fast, slow, signal) = DEFAULT_MACD_PERIODS;

    Ok(json!({
        "points": points.len(),
        "dropped": report.dropped,
        "truncated": report.truncated,
        "overlays": overlays,
        "rsi": rsi(points, rsi_period),
        "macd": macd(points, fast, slow, signal),
    }))
}

async fn handle_view(
    file: &Path,
    from: f64,
    to: f64,
    ids: &[String],
    symbol: &str,
    range: Option<TimeRange>,
    mut config: ChartConfig,
) -> Result<Value> {
    let ids = parse_ids(ids)?;
    let source = StaticSource::new(read_points(file)?);

    if let Some(range) = range {
        config.default_range = range;
    }
    let mut session = ChartSession::new(symbol, config);
    session.load(&source).await;

    if let Some(message) = session.error_message() {
        return Err(Error::Fetch(message.to_string()));
    }

    session.set_active_indicators(ids);
    let window = session.set_zoom_window(from, to);
    let visible = session.visible_slice();

    Ok(json!({
        "symbol": session.symbol(),
        "range": session.time_range(),
        "state": session.state(),
        "window": window,
        "start": visible.first().and_then(PricePoint::datetime),
        "end": visible.last().and_then(PricePoint::datetime),
        "visible": visible,
        "domain": session.domain(),
        "summary": session.summary(),
        "overlays": session.active_indicator_overlays(),
    }))
}

fn parse_quote(quote: &str) -> Result<(String, f64)> {
    let (symbol, price) = quote
        .split_once('=')
        .ok_or_else(|| Error::InvalidOperation(format!("quote must be SYMBOL=PRICE: {}", quote)))?;
    let price: f64 = price
        .trim()
        .parse()
        .map_err(|_| Error::InvalidOperation(format!("invalid price in quote: {}", quote)))?;
    Ok((symbol.trim().to_uppercase(), price))
}

fn handle_value(holdings: &Path, quotes: &[String]) -> Result<Value> {
    let holdings = Holdings::from_json(&fs::read_to_string(holdings)?)?;
    let quotes = quotes
        .iter()
        .map(|q| parse_quote(q))
        .collect::<Result<HashMap<String, f64>>>()?;

    Ok(serde_json::to_value(valuate(&holdings, &quotes))?)
}

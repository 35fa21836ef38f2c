//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::adapters::command_backend::CommandBackendLoader;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::unavailable_backend::UnavailableLoader;
use crate::domain::analysis::{analyze, StockReport};
use crate::domain::config::{build_analysis_config, AnalysisConfig};
use crate::domain::error::StockcastError;
use crate::domain::forecast::{BackendStatus, ForecastConfig, ForecastPipeline, ForecastResult};
use crate::domain::indicator::{annualized_volatility, compute_price_targets, PriceTargetBand};
use crate::domain::indicator_set::compute_indicators;
use crate::domain::period::Period;
use crate::domain::price_series::PriceSeries;
use crate::ports::data_port::MarketDataPort;

#[derive(Parser, Debug)]
#[command(
    name = "stockcast",
    about = "Technical indicators and price forecasts for a single ticker"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where to find the series and how much of it to use.
#[derive(Args, Debug)]
pub struct SeriesArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(short, long)]
    pub ticker: String,
    /// Window such as 1mo, 6mo, 1y or max (overrides [data] period)
    #[arg(short, long)]
    pub period: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Full report: indicators, volatility, price targets and forecast
    Analyze {
        #[command(flatten)]
        series: SeriesArgs,
        #[arg(short, long)]
        days: Option<usize>,
    },
    /// Print the indicator table for the most recent rows
    Indicators {
        #[command(flatten)]
        series: SeriesArgs,
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Volatility-based price targets for the last close
    Targets {
        #[command(flatten)]
        series: SeriesArgs,
    },
    /// Forecast prices as `date,price` lines
    Predict {
        #[command(flatten)]
        series: SeriesArgs,
        #[arg(short, long)]
        days: Option<usize>,
    },
    /// List tickers available in the data directory
    ListTickers {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file and try loading the forecast backend
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Analyze { series, days } => run_analyze(&series, days),
        Command::Indicators { series, rows } => run_indicators(&series, rows),
        Command::Targets { series } => run_targets(&series),
        Command::Predict { series, days } => run_predict(&series, days),
        Command::ListTickers { config } => run_list_tickers(config.as_ref()),
        Command::Validate { config } => run_validate(&config),
    };
    result.unwrap_or_else(|code| code)
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| report(&e))
}

/// Config from `path`, or the defaults when no file is given.
pub fn load_analysis_config(path: Option<&PathBuf>) -> Result<AnalysisConfig, ExitCode> {
    match path {
        Some(path) => {
            let adapter = load_config(path)?;
            build_analysis_config(&adapter).map_err(|e| report(&e))
        }
        None => Ok(AnalysisConfig::default()),
    }
}

/// Slack given to the pipeline's own timer so a timed-out command is killed
/// and reaped before the fallback is served.
const KILL_GRACE: Duration = Duration::from_secs(2);

/// A command backend when one is configured, otherwise a pipeline that
/// always falls back.
pub fn build_pipeline(config: &AnalysisConfig) -> ForecastPipeline {
    let Some(command) = &config.backend.command else {
        return ForecastPipeline::new(
            Box::new(UnavailableLoader::default()),
            config.forecast.clone(),
        );
    };
    let timeout = config.forecast.timeout;
    let loader = CommandBackendLoader::new(command.clone(), config.backend.args.clone())
        .with_timeout(timeout);
    let forecast = ForecastConfig {
        timeout: timeout.saturating_add(KILL_GRACE),
        ..config.forecast.clone()
    };
    ForecastPipeline::new(Box::new(loader), forecast)
}

fn report(err: &StockcastError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

fn fetch_series(config: &AnalysisConfig, args: &SeriesArgs) -> Result<PriceSeries, ExitCode> {
    let period = match &args.period {
        Some(label) => label.parse::<Period>().map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::from(2)
        })?,
        None => config.period,
    };
    let adapter = CsvAdapter::new(config.data_dir.clone());
    let series = adapter
        .historical_series(&args.ticker, period)
        .map_err(|e| report(&e))?;
    eprintln!(
        "Loaded {} observations for {} ({})",
        series.len(),
        args.ticker,
        period
    );
    Ok(series)
}

fn run_analyze(args: &SeriesArgs, days: Option<usize>) -> Result<ExitCode, ExitCode> {
    let mut config = load_analysis_config(args.config.as_ref())?;
    if let Some(days) = days {
        config.days_ahead = days;
    }
    let series = fetch_series(&config, args)?;
    let pipeline = build_pipeline(&config);

    let stock = analyze(&args.ticker, series, &pipeline, &config);
    print_report(&stock);
    Ok(ExitCode::SUCCESS)
}

fn run_indicators(args: &SeriesArgs, rows: usize) -> Result<ExitCode, ExitCode> {
    let config = load_analysis_config(args.config.as_ref())?;
    let series = fetch_series(&config, args)?;
    let set = compute_indicators(&series, &config.indicators);
    let columns = set.all();

    print!("{:<12}{:>12}", "date", "close");
    for column in &columns {
        print!("{:>26}", column.indicator_type.to_string());
    }
    println!();

    let start = series.len().saturating_sub(rows);
    for (i, point) in series.points().iter().enumerate().skip(start) {
        print!("{:<12}{:>12.2}", point.date, point.close);
        for column in &columns {
            print!("{:>26}", fmt_value(column.value_at(i)));
        }
        println!();
    }
    Ok(ExitCode::SUCCESS)
}

fn run_targets(args: &SeriesArgs) -> Result<ExitCode, ExitCode> {
    let config = load_analysis_config(args.config.as_ref())?;
    let series = fetch_series(&config, args)?;
    let Some(last) = series.last() else {
        return Err(report(&StockcastError::NotFound {
            ticker: args.ticker.clone(),
        }));
    };
    let volatility = annualized_volatility(&series, config.indicators.periods_per_year);
    print_targets(&compute_price_targets(last.close, volatility));
    Ok(ExitCode::SUCCESS)
}

fn run_predict(args: &SeriesArgs, days: Option<usize>) -> Result<ExitCode, ExitCode> {
    let config = load_analysis_config(args.config.as_ref())?;
    let series = fetch_series(&config, args)?;
    let pipeline = build_pipeline(&config);

    let forecast = pipeline.predict_trend(&series, days.unwrap_or(config.days_ahead));
    eprintln!("Forecast source: {}", forecast.source);
    for point in &forecast.points {
        println!("{},{:.2}", point.date, point.price);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_list_tickers(config_path: Option<&PathBuf>) -> Result<ExitCode, ExitCode> {
    let config = load_analysis_config(config_path)?;
    let tickers = CsvAdapter::new(config.data_dir.clone())
        .list_tickers()
        .map_err(|e| report(&e))?;

    if tickers.is_empty() {
        eprintln!("No tickers found in {}", config.data_dir.display());
    } else {
        for ticker in &tickers {
            println!("{}", ticker);
        }
        eprintln!("{} tickers found", tickers.len());
    }
    Ok(ExitCode::SUCCESS)
}

fn run_validate(config_path: &PathBuf) -> Result<ExitCode, ExitCode> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_analysis_config(Some(config_path))?;

    let p = &config.indicators;
    eprintln!("\nData:");
    eprintln!("  dir:     {}", config.data_dir.display());
    eprintln!("  period:  {}", config.period);
    eprintln!("\nIndicators:");
    eprintln!(
        "  RSI({}) SMA({}) EMA({}) MACD({},{},{}) BB({}, {})",
        p.rsi_period,
        p.sma_period,
        p.ema_period,
        p.macd_fast,
        p.macd_slow,
        p.macd_signal,
        p.bollinger_period,
        p.bollinger_multiplier
    );
    eprintln!("\nForecast:");
    eprintln!("  days_ahead: {}", config.days_ahead);
    eprintln!(
        "  lookback:   {}",
        config
            .forecast
            .lookback
            .map_or_else(|| "all".to_string(), |n| n.to_string())
    );
    eprintln!("  fallback:   {}", config.forecast.fallback);
    eprintln!("  timeout:    {}s", config.forecast.timeout.as_secs());

    eprintln!("\nBackend:");
    match build_pipeline(&config).status() {
        BackendStatus::Primed { backend } => eprintln!("  ready ({})", backend),
        BackendStatus::Degraded { reason } => {
            eprintln!("  unavailable: {} (forecasts will use the fallback)", reason)
        }
    }

    eprintln!("\nConfiguration is valid");
    Ok(ExitCode::SUCCESS)
}

fn print_report(stock: &StockReport) {
    let history = &stock.history;
    match (history.first(), history.last()) {
        (Some(first), Some(last)) => println!(
            "{}: {} observations, {} to {}",
            stock.ticker,
            history.len(),
            first.date,
            last.date
        ),
        _ => println!("{}: no observations", stock.ticker),
    }
    if let Some(change) = &stock.change {
        let sign = if change.change >= 0.0 { "+" } else { "" };
        println!(
            "Last close:  {:.2} ({}{:.2}, {}{:.2}%)",
            change.last, sign, change.change, sign, change.change_pct
        );
    }

    println!("\n=== Indicators (latest) ===");
    for series in stock.indicators.all() {
        println!(
            "  {:<26}{:>12}",
            series.indicator_type.to_string(),
            fmt_value(series.last_value())
        );
    }

    if let Some(targets) = &stock.targets {
        println!();
        print_targets(targets);
    }

    println!();
    print_forecast(&stock.forecast);
}

fn print_targets(band: &PriceTargetBand) {
    println!("=== Price targets ===");
    println!("Current:     {:.2}", band.current_price);
    println!("Volatility:  {:.2}%", band.volatility * 100.0);
    println!("  {:<6}{:>12}{:>12}{:>12}", "", "min", "mean", "max");
    for target in &band.targets {
        println!(
            "  {:<6}{:>12.2}{:>12.2}{:>12.2}",
            target.horizon.to_string(),
            target.min,
            target.mean,
            target.max
        );
    }
}

fn print_forecast(forecast: &ForecastResult) {
    println!("=== Forecast: {} ===", forecast.source);
    for point in &forecast.points {
        println!("  {}  {:>12.2}", point.date, point.price);
    }
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_arguments() {
        let cli = Cli::try_parse_from([
            "stockcast", "analyze", "--ticker", "SAN.MC", "--period", "1y", "--days", "10",
        ])
        .unwrap();
        match cli.command {
            Command::Analyze { series, days } => {
                assert_eq!(series.ticker, "SAN.MC");
                assert_eq!(series.period.as_deref(), Some("1y"));
                assert!(series.config.is_none());
                assert_eq!(days, Some(10));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn indicators_rows_default() {
        let cli = Cli::try_parse_from(["stockcast", "indicators", "-t", "ITX.MC"]).unwrap();
        assert!(matches!(cli.command, Command::Indicators { rows: 10, .. }));
    }

    #[test]
    fn ticker_is_required() {
        assert!(Cli::try_parse_from(["stockcast", "predict"]).is_err());
    }

    #[test]
    fn fmt_value_marks_missing() {
        assert_eq!(fmt_value(None), "-");
        assert_eq!(fmt_value(Some(1.234)), "1.23");
    }

    #[test]
    fn pipeline_without_command_is_degraded() {
        let pipeline = build_pipeline(&AnalysisConfig::default());
        assert!(!pipeline.is_primed());
    }
}

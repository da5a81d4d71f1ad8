use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kbar_ganzhi::{
    GanZhiCache, GanZhiResolution, KbarSeriesKey, SeriesInput, StoreConfig,
    db::{connection, migrate},
    stock_meta,
};

#[derive(Parser)]
#[command(version, about = "Kbar series gan-zhi cache CLI")]
struct Cli {
    /// Store config TOML file (db_path = "...").
    #[arg(long, value_name = "FILE", conflicts_with = "db")]
    config: Option<String>,

    /// Store file path, bypassing the config file.
    #[arg(long, value_name = "PATH")]
    db: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply the embedded migrations to the store file.
    Migrate,
    /// Compute gan-zhi labels for one timestamp text.
    Compute {
        /// Timestamp text, e.g. "2023/10/10" or "2023-10-10 15:30:45".
        text: String,
    },
    /// Resolve gan-zhi series in a time range: scan the whole store, or one
    /// key when --symbol/--exchange/--period are given.
    Resolve {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, requires = "exchange", requires = "period")]
        symbol: Option<String>,
        #[arg(long, requires = "symbol")]
        exchange: Option<String>,
        #[arg(long, requires = "symbol")]
        period: Option<String>,
    },
    /// Listing-date gan-zhi for one symbol.
    Listing {
        symbol: String,
    },
}

fn store_config(cli: &Cli) -> Result<StoreConfig> {
    if let Some(path) = &cli.db {
        return Ok(StoreConfig::new(path));
    }
    if let Some(config) = &cli.config {
        return StoreConfig::from_toml_path(config)
            .with_context(|| format!("reading store config {config}"));
    }
    bail!("pass --db <PATH> or --config <FILE> to locate the store");
}

fn print_series(series: &kbar_ganzhi::KbarSeriesGanZhi) {
    println!("{} ({} bars)", series.key, series.labels.len());
    for label in &series.labels {
        println!("  {label}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match &cli.cmd {
        Cmd::Migrate => {
            let cfg = store_config(&cli)?;
            migrate::run_sqlite(&cfg.database_url())?;
            println!("migrations applied to {}", cfg.db_path.display());
        }
        Cmd::Compute { text } => {
            let gz = ganzhi_calendar::datetime_ganzhi(text)?;
            println!("{}", gz.composite());
        }
        Cmd::Resolve {
            start,
            end,
            symbol,
            exchange,
            period,
        } => {
            let cache = GanZhiCache::new(store_config(&cli)?);
            let input = match (symbol, exchange, period) {
                (Some(s), Some(e), Some(p)) => SeriesInput::Key(KbarSeriesKey::new(s, e, p)),
                _ => SeriesInput::Absent,
            };
            match cache.resolve(start, end, input, true)? {
                GanZhiResolution::Single(series) => print_series(&series),
                GanZhiResolution::Many(list) => {
                    for series in &list.series {
                        print_series(series);
                    }
                }
            }
        }
        Cmd::Listing { symbol } => {
            let cfg = store_config(&cli)?;
            cfg.ensure_reachable()?;
            let mut conn = connection::connect_sqlite(&cfg.database_url())?;
            let info = stock_meta::listing_date_ganzhi(&mut conn, symbol)?;
            println!(
                "{} {} ({}) listed {}: {}-{}-{}",
                info.symbol, info.name, info.exchange, info.list_date, info.year, info.month, info.day
            );
        }
    }

    Ok(())
}

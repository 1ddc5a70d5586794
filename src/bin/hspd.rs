use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use csv::ReaderBuilder;
use tracing::{debug, info};

use hspd::params::HeadShouldersParams;
use hspd::{
    scan_parallel, scan_parallel_raw, EngineBuilder, PatternCandidate, PatternEngine, PriceBar,
    ScanResult,
};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Table,
}

/// Scan price bars for head-and-shoulders formations
#[derive(Debug, Parser)]
#[command(name = "hspd", version)]
struct Args {
    /// Path to the CSV file (symbol,date,timestamp,open,high,low,close,volume)
    #[arg(long)]
    input: PathBuf,

    /// Detection parameters (TOML, YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only scan rows for this symbol
    #[arg(long)]
    symbol: Option<String>,

    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Print every accepted center without overlap resolution
    #[arg(long)]
    raw: bool,

    /// Drop candidates below this confidence
    #[arg(long)]
    min_confidence: Option<u32>,

    /// Reject NaN, negative volume and out-of-order bars
    #[arg(long)]
    validate: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

type Groups = BTreeMap<String, Vec<PriceBar>>;

fn load_bars(input: &Path, only: Option<&str>) -> Result<Groups> {
    let file =
        File::open(input).with_context(|| format!("failed to open input file: {:?}", input))?;
    read_bars(file, only)
}

/// Read bars grouped by symbol, keeping file order within each group.
fn read_bars<R: Read>(reader: R, only: Option<&str>) -> Result<Groups> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let mut groups = Groups::new();
    for (line, result) in rdr.deserialize::<PriceBar>().enumerate() {
        let bar = result.with_context(|| format!("failed to deserialize CSV row {}", line + 1))?;
        if only.is_some_and(|s| s != bar.symbol) {
            continue;
        }
        groups.entry(bar.symbol.clone()).or_default().push(bar);
    }
    Ok(groups)
}

/// Scan every group, skipping symbols that fail. Errors only when all fail.
fn scan_groups(engine: &PatternEngine, groups: &Groups, raw: bool) -> Result<Vec<ScanResult>> {
    let instruments: Vec<(&str, &[PriceBar])> =
        groups.iter().map(|(s, b)| (s.as_str(), b.as_slice())).collect();
    let (mut ok, errors) = if raw {
        scan_parallel_raw(engine, instruments)
    } else {
        scan_parallel(engine, instruments)
    };
    if ok.is_empty() && !errors.is_empty() {
        bail!("all {} symbols failed to scan", errors.len());
    }
    ok.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    Ok(ok)
}

fn print_table(results: &[ScanResult]) {
    for result in results {
        println!("{} ({} patterns)", result.symbol, result.patterns.len());
        for p in &result.patterns {
            print_row(p);
        }
    }
}

fn print_row(p: &PatternCandidate) {
    println!(
        "  {:<26} {:<17} {:<8} conf {:>3}  bars {:>5}..{:<5} center {:>5}  L {:.4}  H {:.4}  R {:.4}",
        p.pattern_type.as_str(),
        p.signal.as_str(),
        p.strength.as_str(),
        p.confidence,
        p.start_index,
        p.end_index,
        p.center_index,
        p.left_shoulder,
        p.head,
        p.right_shoulder,
    );
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let params = match &args.config {
        Some(path) => HeadShouldersParams::load(path)
            .with_context(|| format!("failed to load parameters from {:?}", path))?,
        None => HeadShouldersParams::default(),
    };

    let mut builder = EngineBuilder::new().params(params).validate_data(args.validate);
    if let Some(min) = args.min_confidence {
        builder = builder.min_confidence(min);
    }
    let engine = builder.build().context("invalid detection parameters")?;

    let groups = load_bars(&args.input, args.symbol.as_deref())?;
    if groups.is_empty() {
        debug!(input = ?args.input, "no bars to scan");
        return Ok(());
    }
    info!(symbols = groups.len(), "loaded bars");

    let results = scan_groups(&engine, &groups, args.raw)?;

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        Format::Table => print_table(&results),
    }

    Ok(())
}

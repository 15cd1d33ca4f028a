use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use tracing::error;

use overrep::parser::{read_items, read_sets, DEFAULT_ID_COLUMN, DEFAULT_SET_COLUMN};
use overrep::report::{format_results, write_results};
use overrep::{analyze, significant, HitCounting, OraConfig, OraError, OraResult};
use overrep::{DEFAULT_FDR_THRESHOLD, DEFAULT_MIN_SET_SIZE};

/// Runs an overrepresentation analysis and saves the results as CSV
#[derive(Debug, Parser)]
#[command(name = "ora", version, about)]
struct Args {
    /// CSV file containing set mappings. Must have columns for IDs and set names
    #[arg(long)]
    sets: PathBuf,

    /// CSV file containing hits (first column is used, any header)
    #[arg(long)]
    hits: PathBuf,

    /// CSV file containing universe items (first column is used, any header)
    ///
    /// Defaults to all items of the sets
    #[arg(long)]
    universe: Option<PathBuf>,

    /// Name of column containing item IDs in sets CSV
    #[arg(long, default_value = DEFAULT_ID_COLUMN)]
    id_column: String,

    /// Name of column containing set names in sets CSV
    #[arg(long, default_value = DEFAULT_SET_COLUMN)]
    set_column: String,

    /// Minimum set size to consider
    #[arg(long, default_value_t = DEFAULT_MIN_SET_SIZE)]
    min_set_size: usize,

    /// Output CSV file path
    #[arg(long, default_value = "ora_results.csv")]
    output: PathBuf,

    /// Only count hits that are part of the universe
    #[arg(long)]
    hits_in_universe: bool,

    /// Report sets with an FDR below this threshold
    #[arg(long, default_value_t = DEFAULT_FDR_THRESHOLD)]
    fdr_threshold: f64,

    /// Increase log output (-v: info, -vv: debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn run(args: &Args) -> OraResult<()> {
    let sets = read_sets(&args.sets, &args.id_column, &args.set_column)?;
    let hits = read_items(&args.hits)?;
    let universe = args.universe.as_ref().map(read_items).transpose()?;

    let hit_counting = if args.hits_in_universe {
        HitCounting::InUniverse
    } else {
        HitCounting::All
    };
    let config = OraConfig::default()
        .with_min_set_size(args.min_set_size)
        .with_hit_counting(hit_counting);

    let results = match analyze(&sets, &hits, universe.as_ref(), &config) {
        Ok(results) => results,
        Err(err @ OraError::EmptyUniverseOrHits) => {
            error!("{}", err);
            Vec::new()
        }
        Err(err) => return Err(err),
    };

    write_results(&args.output, &results)?;
    println!("\nResults saved to {}", args.output.display());

    let significant = significant(&results, args.fdr_threshold);
    if significant.is_empty() {
        println!("\nNo significant results found at FDR < {}", args.fdr_threshold);
    } else {
        println!("\nSignificant results (FDR < {}):", args.fdr_threshold);
        print!("{}", format_results(&significant));
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(err) = SimpleLogger::new().with_level(log_level(args.verbose)).init() {
        eprintln!("unable to initialize logging: {err}");
    }

    if let Err(err) = run(&args) {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use overrep::pathway::{PathwayLookup, PathwayLookupResult, PathwaySource, TablePathwayLookup};
use overrep::report::format_results;
use overrep::workflow::{run, PredictionTable, WorkflowConfig};
use overrep::workflow::{DEFAULT_COMPOUND_COLUMN, DEFAULT_GENE_COLUMN, DEFAULT_RANK_COLUMN};
use overrep::{OraConfig, OraError, OraResult, SetEnrichment, DEFAULT_MIN_SET_SIZE};

/// Compound-gene and gene-pathway enrichment of target predictions
#[derive(Debug, Parser)]
#[command(name = "prediction-ora", version, about)]
struct Args {
    /// CSV file with compound-gene predictions and their global rank
    #[arg(long)]
    predictions: PathBuf,

    /// CSV file with gene to pathway mappings (gene, pathway_name, pathway_id, source)
    ///
    /// Pathway analyses are skipped if not provided
    #[arg(long)]
    pathways: Option<PathBuf>,

    /// Directory for all result tables
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_COMPOUND_COLUMN)]
    compound_column: String,

    #[arg(long, default_value = DEFAULT_GENE_COLUMN)]
    gene_column: String,

    #[arg(long, default_value = DEFAULT_RANK_COLUMN)]
    rank_column: String,

    /// Predictions up to this rank are hits [default: number of predictions]
    #[arg(long)]
    max_rank: Option<f64>,

    /// Minimum set size to consider
    #[arg(long, default_value_t = DEFAULT_MIN_SET_SIZE)]
    min_set_size: usize,

    /// Increase log output (-v: info, -vv: debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Used when no pathway table is given
struct NoPathways;

impl PathwayLookup for NoPathways {
    fn lookup(&self, _genes: &[String]) -> OraResult<PathwayLookupResult> {
        Err(OraError::ExternalLookupFailure(
            "no pathway table provided".to_string(),
        ))
    }
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn print_results(title: &str, results: &[SetEnrichment]) {
    let rows: Vec<&SetEnrichment> = results.iter().collect();
    println!("\nResults of {title} ORA analysis:");
    print!("{}", format_results(&rows));
}

fn run_workflow(args: &Args) -> OraResult<()> {
    let config = WorkflowConfig::default()
        .with_compound_column(&args.compound_column)
        .with_gene_column(&args.gene_column)
        .with_rank_column(&args.rank_column)
        .with_max_rank(args.max_rank)
        .with_ora(OraConfig::default().with_min_set_size(args.min_set_size));

    let table = PredictionTable::from_path(&args.predictions, &config)?;

    let lookup: Box<dyn PathwayLookup> = match &args.pathways {
        Some(path) => Box::new(TablePathwayLookup::from_path(path)?),
        None => Box::new(NoPathways),
    };

    let results = run(&table, lookup.as_ref(), &config)?;

    print_results("Compound-Gene", results.compound_gene());
    for source in PathwaySource::ALL {
        if let Some(rows) = results.gene_pathway(source) {
            print_results(&format!("{source} Pathway"), rows);
        }
    }

    for path in results.write(&args.output_dir)? {
        println!("Saved {}", path.display());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(err) = SimpleLogger::new().with_level(log_level(args.verbose)).init() {
        eprintln!("unable to initialize logging: {err}");
    }

    if let Err(err) = run_workflow(&args) {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

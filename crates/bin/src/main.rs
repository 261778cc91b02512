//! Tally CLI binary.
//!
//! Answers "company, metric, period" questions against a fundamentals
//! database.

mod paths;

use clap::{Parser, Subcommand};
use serde_json::json;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tally::export::write_series_csv;
use tally::{
    AnswerFormat, Consolidation, Engine, QueryRequest, ResolverConfig, SqliteStore, render,
};
use tally_resolve::{DissectionNormalizer, classify};
use tally_store::import::{ImportTarget, import_csv};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Tally: resolve metric questions to stored facts", long_about = None)]
#[command(version)]
struct Cli {
    /// Database file
    #[arg(long, global = true, env = "TALLY_DB")]
    db: Option<PathBuf>,

    /// Resolver configuration (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Query {
        /// Company name or ticker
        #[arg(long)]
        company: String,

        /// Metric phrase
        #[arg(long)]
        metric: String,

        /// Period phrase ("FY 2023", "last quarter", "2023-06-30")
        #[arg(long)]
        period: String,

        /// Statement basis ("consolidated", "unconsolidated", "standalone")
        #[arg(long)]
        consolidation: Option<String>,

        /// Output format (text, json or pretty)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Classify a metric phrase
    Classify {
        /// Metric phrase
        phrase: String,
    },

    /// Export every stored period of a metric
    Series {
        /// Company name or ticker
        #[arg(long)]
        company: String,

        /// Metric phrase
        #[arg(long)]
        metric: String,

        /// Period phrase selecting the horizon
        #[arg(long, default_value = "")]
        period: String,

        /// Statement basis ("consolidated", "unconsolidated", "standalone")
        #[arg(long)]
        consolidation: Option<String>,

        /// Output CSV file (stdout when absent)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Create the database schema
    Init,

    /// Load a table from CSV
    Import {
        /// Table name (companies, heads, facts_quarterly, ...)
        table: String,

        /// CSV file with a header row
        file: PathBuf,
    },

    /// Show dimension row counts
    Dimensions,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        db,
        config,
        verbose,
        command,
    } = Cli::parse();
    init_logging(verbose);
    let db = db.as_deref();

    match command {
        Commands::Query {
            company,
            metric,
            period,
            consolidation,
            format,
        } => {
            let format = AnswerFormat::parse(&format)?;
            let engine = open_engine(db, config.as_deref())?;
            let request = build_request(company, metric, period, consolidation.as_deref());
            let answer = engine.query(&request)?;
            print!("{}", render(&answer, format)?);
            if format != AnswerFormat::Text {
                println!();
            }
        }
        Commands::Classify { phrase } => {
            let class = classify(&phrase);
            let base = match class.group() {
                Some(group) => DissectionNormalizer::new()?.normalize(&phrase, group),
                None => phrase.clone(),
            };
            let output = json!({
                "phrase": phrase,
                "classification": class,
                "group": class.group().map(|g| g.name()),
                "base": base,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Series {
            company,
            metric,
            period,
            consolidation,
            output,
        } => {
            let engine = open_engine(db, config.as_deref())?;
            let request = build_request(company, metric, period, consolidation.as_deref());
            let (resolution, frame) = engine.series(&request)?;
            let rows = match output {
                Some(path) => {
                    write_series_csv(File::create(path)?, &resolution.head_name, &frame)?
                }
                None => write_series_csv(io::stdout().lock(), &resolution.head_name, &frame)?,
            };
            tracing::info!(rows, head = %resolution.head_name, "series exported");
        }
        Commands::Init => {
            paths::open_store(db)?;
            let path = db.map_or_else(paths::default_db_path, Path::to_path_buf);
            println!("Initialized {}", path.display());
        }
        Commands::Import { table, file } => {
            let target = ImportTarget::from_table_name(&table)?;
            let store = paths::open_store(db)?;
            let count = import_csv(&store, target, File::open(&file)?)?;
            println!("Imported {} rows into {}", count, table);
        }
        Commands::Dimensions => {
            let engine = open_engine(db, config.as_deref())?;
            for (table, count) in engine.dimensions().counts() {
                println!("{:<20} {:>8}", table, count);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_engine(
    db: Option<&Path>,
    config: Option<&Path>,
) -> Result<Engine<SqliteStore>, Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => ResolverConfig::from_file(path)?,
        None => ResolverConfig::default(),
    };
    let store = paths::open_store(db)?;
    Ok(Engine::new(store, config)?)
}

fn build_request(
    company: String,
    metric: String,
    period: String,
    consolidation: Option<&str>,
) -> QueryRequest {
    let request = QueryRequest::new(company, metric, period);
    match consolidation {
        Some(phrase) => request.with_consolidation(Consolidation::parse_phrase(phrase)),
        None => request,
    }
}

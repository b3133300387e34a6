use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;

use cyclist_roster::config::Config;
use cyclist_roster::constants::{DEFAULT_LOG_DIR, DEFAULT_OUTPUT_FILE};
use cyclist_roster::logging;
use cyclist_roster::pipeline::ingestion::{CsvFileSource, JsonFileSource};
use cyclist_roster::pipeline::processing::normalize::NameNormalizer;
use cyclist_roster::pipeline::processing::price::PriceCalculator;
use cyclist_roster::pipeline::processing::reference::MatchMode;
use cyclist_roster::pipeline::Pipeline;
use cyclist_roster::storage::{save_roster, WriteOptions};
use cyclist_roster::types::{CandidateSource, SourceKind};

#[derive(Parser)]
#[command(name = "cyclist_roster")]
#[command(about = "Builds a canonical fantasy cycling roster from scraped rider data")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline over a candidate file and write the roster CSV
    Run {
        /// Scraped candidate file
        #[arg(long)]
        input: PathBuf,
        /// Input format; guessed from the file extension when omitted
        #[arg(long, value_enum)]
        format: Option<InputFormat>,
        /// Which extractor produced the file (overrides config)
        #[arg(long, value_enum)]
        source: Option<SourceKind>,
        /// Roster CSV to write
        #[arg(long)]
        output: Option<PathBuf>,
        /// TOML config file; falls back to CYCLIST_ROSTER_CONFIG
        #[arg(long)]
        config: Option<PathBuf>,
        /// Require exact (case-insensitive) reference name matches
        #[arg(long)]
        exact_match: bool,
        /// Input CSV has no header row and uses the roster column layout
        #[arg(long)]
        no_header: bool,
    },
    /// Print the price a source would assign for a ranking
    Price {
        #[arg(long)]
        ranking: u32,
        /// Sum of the rider's specialty points
        #[arg(long, default_value_t = 0)]
        points_total: i64,
        #[arg(long, value_enum, default_value_t = SourceKind::Ranking)]
        source: SourceKind,
    },
    /// Show how a raw name is normalized
    Normalize {
        name: String,
    },
}

fn guess_format(path: &Path) -> InputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
        _ => InputFormat::Csv,
    }
}

struct RunArgs {
    input: PathBuf,
    format: Option<InputFormat>,
    source: Option<SourceKind>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    exact_match: bool,
    no_header: bool,
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = Config::resolve(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(source) = args.source {
        config.pipeline.source = source;
    }
    if args.exact_match {
        config.pipeline.match_mode = MatchMode::Exact;
    }

    let pipeline = Pipeline::from_config(&config).context("Failed to load reference table")?;

    let encodings = config.input.encodings.clone();
    let source: Box<dyn CandidateSource> = match args.format.unwrap_or_else(|| guess_format(&args.input)) {
        InputFormat::Json => Box::new(JsonFileSource::new(&args.input).with_encodings(encodings)),
        InputFormat::Csv => {
            let csv = CsvFileSource::new(&args.input).with_encodings(encodings);
            Box::new(if args.no_header { csv.headerless() } else { csv })
        }
    };

    println!("🚀 Building roster from {} ({})", args.input.display(), config.pipeline.source);
    let outcome = pipeline
        .run(source.as_ref())
        .with_context(|| format!("Failed to read candidates from {}", args.input.display()))?;

    let output = args.output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));
    save_roster(&output, &outcome.roster, WriteOptions::from(&config.output))
        .with_context(|| format!("Failed to write roster to {}", output.display()))?;

    info!(summary = %serde_json::to_string(&outcome.summary)?, "Run summary");
    println!("\n📊 Roster results");
    println!("{}", outcome.summary);
    println!("💾 Saved {} riders to {}", outcome.roster.len(), output.display());
    Ok(())
}

fn main() -> Result<()> {
    let _guard = logging::init_logging(DEFAULT_LOG_DIR);

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            format,
            source,
            output,
            config,
            exact_match,
            no_header,
        } => run(RunArgs {
            input,
            format,
            source,
            output,
            config,
            exact_match,
            no_header,
        })?,
        Commands::Price {
            ranking,
            points_total,
            source,
        } => {
            let calculator = PriceCalculator::new(source.policy().pricing);
            let price = calculator.price(Some(ranking), points_total);
            println!("{source} rank {ranking} ({points_total} pts): {price}M");
        }
        Commands::Normalize { name } => {
            let normalized = NameNormalizer::normalize(&name);
            println!("first_name: {}", normalized.first_name);
            println!("last_name:  {}", normalized.last_name);
            println!("key:        {}", normalized.key);
            println!("slug:       {}", normalized.slug);
        }
    }
    Ok(())
}

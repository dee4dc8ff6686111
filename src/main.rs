use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{error, info};

use soap_etl::app::stage_use_case::StageUseCase;
use soap_etl::config::Config;
use soap_etl::constants;
use soap_etl::domain::InsertResult;
use soap_etl::infra::http_sink::HttpDatasetSink;
use soap_etl::logging;
use soap_etl::pipeline::{artifact, BuildResult, Pipeline};

#[derive(Parser)]
#[command(name = "soap_etl")]
#[command(about = "PriMock-57 consultation ETL and evaluation dataset stager")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full dataset artifact from the raw consultation corpus
    Build {
        /// Dataset root containing transcripts/ and notes/
        #[arg(long)]
        input: PathBuf,
        /// Output NDJSON path (default: data/soap_dataset.ndjson)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Provenance label recorded in each record's metadata
        #[arg(long, default_value = constants::DEFAULT_SOURCE_LABEL)]
        source_label: String,
        /// Split label recorded in each record's metadata
        #[arg(long, default_value = constants::DEFAULT_SPLIT)]
        split: String,
    },
    /// Filter a built artifact down to records with no missing sections
    Filter {
        /// Path to the full dataset artifact
        #[arg(long)]
        input: PathBuf,
        /// Output NDJSON path (default: data/soap_dataset_complete.ndjson)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Report completeness statistics for an artifact
    Analyze {
        /// Path to a dataset artifact
        #[arg(long)]
        input: PathBuf,
    },
    /// Insert a filtered artifact into the evaluation platform dataset
    Stage {
        /// Path to the complete dataset artifact
        #[arg(long)]
        input: PathBuf,
        /// Path to the sink configuration file
        #[arg(long, default_value = "config.toml")]
        config: String,
    },
    /// Run build and filter sequentially
    Run {
        /// Dataset root containing transcripts/ and notes/
        #[arg(long)]
        input: PathBuf,
        /// Directory for the two output artifacts
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,
        /// Provenance label recorded in each record's metadata
        #[arg(long, default_value = constants::DEFAULT_SOURCE_LABEL)]
        source_label: String,
        /// Split label recorded in each record's metadata
        #[arg(long, default_value = constants::DEFAULT_SPLIT)]
        split: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Keep the guard alive so file logs flush on exit
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            out,
            source_label,
            split,
        } => {
            let out = out.unwrap_or_else(|| PathBuf::from("data").join(constants::ALL_DATASET_FILE));
            println!("🔄 Building dataset from {}...", input.display());
            match Pipeline::build(&input, &out, &source_label, &split) {
                Ok(result) => print_build_results(&result),
                Err(e) => {
                    error!("Build stage failed: {}", e);
                    println!("❌ Build stage failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Filter { input, out } => {
            let out = out
                .unwrap_or_else(|| PathBuf::from("data").join(constants::COMPLETE_DATASET_FILE));
            println!("🔎 Filtering {} for complete records...", input.display());
            match Pipeline::filter(&input, &out) {
                Ok(result) => {
                    println!("\n📊 Filter Results:");
                    println!("   Total records: {}", result.total_records);
                    println!("   Complete records: {}", result.complete_records);
                    println!("   Output file: {}", result.output_file);
                }
                Err(e) => {
                    error!("Filter stage failed: {}", e);
                    println!("❌ Filter stage failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Analyze { input } => {
            println!("🔬 Analyzing {}...", input.display());
            match Pipeline::analyze(&input) {
                Ok(result) => {
                    println!("\n📊 Dataset Analysis:");
                    println!("   Total records: {}", result.total_records);
                    println!("   Complete records: {}", result.complete_records);
                    println!(
                        "   Records with missing sections: {}",
                        result.total_records - result.complete_records
                    );
                    println!("   Unsegmentable notes: {}", result.report.unsegmentable);
                    println!("   Missing subjective: {}", result.report.missing_subjective);
                    println!("   Missing objective: {}", result.report.missing_objective);
                    println!("   Missing assessment: {}", result.report.missing_assessment);
                    println!("   Missing plan: {}", result.report.missing_plan);
                }
                Err(e) => {
                    error!("Analyze failed: {}", e);
                    println!("❌ Analyze failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Stage { input, config } => {
            println!("📤 Staging {} into the evaluation platform...", input.display());
            match stage(&input, &config).await {
                Ok(result) => {
                    println!("✅ Sink accepted {} records", result.inserted);
                }
                Err(e) => {
                    error!("Stage failed: {}", e);
                    println!("❌ Stage failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Run {
            input,
            out_dir,
            source_label,
            split,
        } => {
            println!("🚀 Running full pipeline (build + filter)...");
            let all_path = out_dir.join(constants::ALL_DATASET_FILE);
            let complete_path = out_dir.join(constants::COMPLETE_DATASET_FILE);

            println!("\n📥 Step 1: Building dataset...");
            match Pipeline::build(&input, &all_path, &source_label, &split) {
                Ok(result) => print_build_results(&result),
                Err(e) => {
                    error!("Build stage failed: {}", e);
                    println!("❌ Build stage failed: {}", e);
                    return Err(e.into());
                }
            }

            println!("\n🔎 Step 2: Filtering complete records...");
            match Pipeline::filter(&all_path, &complete_path) {
                Ok(result) => {
                    println!("   Complete records: {}", result.complete_records);
                    println!("   Output file: {}", result.output_file);
                    println!("\n✅ Full pipeline completed successfully!");
                }
                Err(e) => {
                    error!("Filter stage failed: {}", e);
                    println!("❌ Filter stage failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    }
    Ok(())
}

async fn stage(input: &Path, config_path: &str) -> soap_etl::error::Result<InsertResult> {
    let config = Config::load(config_path)?;
    let records = artifact::read_records(input)?;
    info!(
        "Staging {} records into dataset '{}'",
        records.len(),
        config.sink.dataset
    );
    let sink = HttpDatasetSink::from_config(&config.sink)?;
    StageUseCase::new(Box::new(sink)).stage(&records).await
}

fn print_build_results(result: &BuildResult) {
    println!("\n📊 Build Results:");
    println!("   Total cases: {}", result.total_cases);
    println!("   Complete records: {}", result.complete_records);
    println!("   Unsegmentable notes: {}", result.report.unsegmentable);
    println!("   Missing subjective: {}", result.report.missing_subjective);
    println!("   Missing objective: {}", result.report.missing_objective);
    println!("   Missing assessment: {}", result.report.missing_assessment);
    println!("   Missing plan: {}", result.report.missing_plan);
    println!("   Output file: {}", result.output_file);
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use geofix::app::GeoFixUseCase;
use geofix::config::Config;
use geofix::infra::{FanoutReporter, GazetteerResolver, MetricsReporter, TracingReporter};
use geofix::observability;

#[derive(Parser)]
#[command(name = "geofix")]
#[command(about = "Approximate the geo-location of crowd messages")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to $GEOFIX_CONFIG, then ./geofix.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Geo-fix a newline-delimited JSON file of messages
    Fix {
        /// Input NDJSON file
        #[arg(long)]
        input: PathBuf,
        /// Output NDJSON file
        #[arg(long)]
        output: String,
    },
    /// Validate the configuration and print what it resolves to
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    // Dropped when main returns, flushing buffered file logs
    let _log_guard = observability::init_logging(&config.logging)?;
    observability::metrics::describe_all();

    match cli.command {
        Commands::Fix { input, output } => {
            println!("🌍 Running geo-fix on {}...", input.display());

            let reporter = FanoutReporter::new()
                .with(Arc::new(TracingReporter::new(config.stage.plugin_name.clone())))
                .with(Arc::new(MetricsReporter::new(config.stage.plugin_name.clone())));
            let use_case = GeoFixUseCase::from_config(&config, Arc::new(reporter));

            let summary = use_case.run_file(&input, &output).await?;
            info!(run_id = %summary.run_id, "Geo-fix finished");

            println!("\n📊 Geo-fix Results ({}):", summary.plugin_name);
            println!("   Processed: {}", summary.stats.processed);
            println!("   Fixed: {}", summary.stats.fixed);
            println!("   Unresolved: {}", summary.stats.unresolved);
            println!("   Written: {}", summary.written);
            println!("   Output file: {}", summary.output_file);

            if let Some(stage_error) = &summary.error {
                error!("Geo-fix stage failed: {}", stage_error);
                println!("\n⚠️  Stage terminated early: {}", stage_error);
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::CheckConfig => {
            let resolver = GazetteerResolver::from_config(&config.resolver);
            println!("✅ Configuration is valid");
            println!("   Plugin: {}", config.stage.plugin_name);
            println!("   Channel capacity: {}", config.stage.channel_capacity);
            println!("   Lookup field: {}", resolver.lookup_field());
            println!("   Known places: {}", resolver.len());
            println!("   Log directory: {}", config.logging.directory);
        }
    }

    Ok(ExitCode::SUCCESS)
}

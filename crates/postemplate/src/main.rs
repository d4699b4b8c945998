use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use postemplate::convert::{self, ConvertRequest};
use postemplate::server::{self, UNCATEGORIZED_WARNING};
use postemplate_core::config::Settings;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "POS import template generator", long_about = None)]
struct Cli {
    /// TOML settings file; environment variables override its values
    #[arg(long, global = true, env = "POSTEMPLATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the upload/download web server
    Serve,
    /// Convert a single workbook into a POS template CSV
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Item list workbook (.xlsx or .xls)
    #[arg(long, short)]
    input: PathBuf,

    /// Reference dataset CSV; defaults to the configured basis path
    #[arg(long)]
    basis: Option<PathBuf>,

    /// Destination CSV; defaults to the input name with a .csv extension
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print the run summary as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;

    match cli.command {
        Command::Serve => {
            info!(bind_addr = %settings.bind_addr, "Starting POS template server");
            server::serve(settings).await
        }
        Command::Convert(args) => {
            let request = ConvertRequest {
                input: args.input,
                basis: args.basis,
                output: args.output,
            };
            let report = tokio::task::spawn_blocking(move || convert::run(&settings, &request))
                .await
                .context("conversion task failed")??;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", convert::summary_table(&report));
            }
            if report.had_unmatched {
                warn!(uncategorized = report.summary.uncategorized, "Uncategorized items in output");
                eprintln!("Warning: {UNCATEGORIZED_WARNING}");
            }
            Ok(())
        }
    }
}

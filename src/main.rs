use clap::{Parser, Subcommand};
use anyhow::Result;
use dotenvy::dotenv;

mod config;
mod error;
mod model;
mod ingestion;
mod site;
mod publish;
mod telemetry;
mod output;

#[derive(Parser)]
#[command(name = "taplist", about = "Tap list site generator")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(flatten)]
    config: config::ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Scrape(ingestion::ScrapeCmd),
    Build(site::BuildCmd),
    Publish(publish::PublishCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    output::types::RunMeta::start();
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // logs to stderr. Respect RUST_LOG and TAPLIST_LOG_FORMAT
    telemetry::config::init_tracing();
    let cfg = config::SiteConfig::from_env(&cli.config)?;

    match cli.command {
        Commands::Scrape(args) => ingestion::run(&cfg, args).await?,
        Commands::Build(args) => site::run(&cfg, args).await?,
        Commands::Publish(args) => publish::run(&cfg, args).await?,
    }

    Ok(())
}

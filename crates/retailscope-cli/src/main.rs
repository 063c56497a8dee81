mod retailers;
mod scrape;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "retailscope-cli")]
#[command(about = "RetailScope command line interface")]
struct Cli {
    /// Retailer registry file (overrides `RETAILSCOPE_RETAILERS_PATH`).
    #[arg(long, global = true)]
    retailers_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List configured retailers, grouped by category.
    Retailers {
        /// Only show one group (e.g. `fashion`, `pharmacy`).
        #[arg(long)]
        group: Option<String>,
        /// Include disabled retailers.
        #[arg(long)]
        all: bool,
    },
    /// Find the retailer a URL belongs to and check it against that
    /// retailer's URL rule.
    Check {
        url: String,
        /// Check against this retailer instead of detecting one.
        #[arg(long)]
        retailer: Option<String>,
    },
    /// Scrape one product page through the scraping API.
    Scrape {
        slug: String,
        url: String,
        /// Print the raw payload as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Scrape a category (listing) page through the scraping API.
    Category {
        slug: String,
        url: String,
        #[arg(long)]
        page: Option<u32>,
        /// Print the raw payload as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = retailscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let registry_path = cli
        .retailers_file
        .unwrap_or_else(|| config.retailers_path.clone());
    let registry = retailscope_core::load_retailers(&registry_path)?;

    match command {
        Commands::Retailers { group, all } => {
            retailers::run_list(&registry, group.as_deref(), all);
        }
        Commands::Check { url, retailer } => {
            retailers::run_check(&registry, &url, retailer.as_deref())?;
        }
        Commands::Scrape { slug, url, json } => {
            scrape::run_scrape(&config, &registry, &slug, &url, json).await?;
        }
        Commands::Category {
            slug,
            url,
            page,
            json,
        } => {
            scrape::run_category(&config, &registry, &slug, &url, page, json).await?;
        }
    }

    Ok(())
}

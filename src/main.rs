mod config;
mod driver;
mod fetch;
mod metadata;
mod relevance;
mod sources;
mod store;

use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::fetch::Fetcher;
use crate::store::Store;

#[derive(Parser)]
#[command(name = "phyto_scraper", about = "Plant disease dataset scraper")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the plant-disease listing site
    Diseases {
        /// Max items to process (0 = all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Search academic sites for ornamental-plant disease articles
    Research {
        /// Max articles per search-results page
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Run every pipeline
    All {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let config = Config::load();

    let (scrape_diseases, scrape_research, limit) = match cli.command {
        Some(Commands::Diseases { limit }) => (true, false, limit),
        Some(Commands::Research { limit }) => (false, true, limit),
        Some(Commands::All { limit }) => (true, true, limit),
        None => (true, true, None),
    };

    let client = fetch::http_client()?;
    let store = Store::new(&config.output_dir, client.clone())?;
    let fetcher = if scrape_research {
        Fetcher::with_renderer(client)
    } else {
        Fetcher::new(client)
    };

    let mut records = Vec::new();

    if scrape_diseases {
        let n = driver::run_diseases(&config, &fetcher, &store, &mut records, limit);
        println!("Diseases: {n} items collected.");
    }
    if scrape_research {
        let n = driver::run_research(&config, &fetcher, &store, &mut records, limit);
        println!("Research: {n} articles collected.");
    }

    let csv_path = config.output_dir.join("metadata.csv");
    if metadata::write_metadata(&records, &csv_path)? {
        println!("Metadata saved to {}", csv_path.display());
    } else {
        println!("No data extracted, nothing to save.");
    }
    println!("Dataset directory: {}", config.output_dir.display());

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

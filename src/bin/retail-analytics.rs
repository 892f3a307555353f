#[path = "../bin_common.rs"]
mod common;

use clap::{Parser, Subcommand};
use common::parse_top_n;
use retail_analytics::{
    AnalyticsClient, AnalyticsError, AnalyticsResult, ApiConfig, Query, Report,
    config::{API_URL_ENV, DEFAULT_API_URL, DEFAULT_TOP_N},
    run_query,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "retail-analytics")]
#[command(about = "Run Online Retail Analytics queries from the command line")]
struct Args {
    /// Analytics API base URL
    #[arg(long, global = true, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Customer sales ranking
    Customers {
        /// Number of customers to rank
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N, value_parser = parse_top_n)]
        top_n: u32,

        /// Print the decoded response as JSON instead of a report
        #[arg(long)]
        json: bool,
    },
    /// Popular products ranking
    Products {
        /// Number of products to rank
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N, value_parser = parse_top_n)]
        top_n: u32,

        /// Print the decoded response as JSON instead of a report
        #[arg(long)]
        json: bool,
    },
    /// Hourly sales trend
    Hourly {
        /// Print the decoded response as JSON instead of a report
        #[arg(long)]
        json: bool,
    },
    /// Render a previously saved JSON response
    Render {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Check that the analytics service is up
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ApiConfig::new(&args.api_url);
    let client = AnalyticsClient::new(&config.base_url);

    let outcome = match args.command {
        Command::Customers { top_n, json } => {
            query(&client, Query::CustomerSalesRanking { top_n }, json).await
        }
        Command::Products { top_n, json } => {
            query(&client, Query::PopularProductsRanking { top_n }, json).await
        }
        Command::Hourly { json } => query(&client, Query::HourlySalesTrend, json).await,
        Command::Render { file } => render_file(&client, &file),
        Command::Health => health(&client).await,
    };

    if let Err(e) = outcome {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("{}", e.display_message());
        std::process::exit(1);
    }

    Ok(())
}

async fn query(client: &AnalyticsClient, query: Query, json: bool) -> Result<(), AnalyticsError> {
    tracing::info!(url = %client.base_url(), path = %query.path(), "Running query");
    let result = run_query(client, query).await?;
    print_result(client, &result, json)
}

fn render_file(client: &AnalyticsClient, file: &Path) -> Result<(), AnalyticsError> {
    let text = std::fs::read_to_string(file)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    let result = AnalyticsResult::from_value(value)?;
    tracing::info!(kind = ?result.kind(), "Rendering {}", file.display());
    print_result(client, &result, false)
}

fn print_result(
    client: &AnalyticsClient,
    result: &AnalyticsResult,
    json: bool,
) -> Result<(), AnalyticsError> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", Report::build(result, client.base_url()).to_text());
    }
    Ok(())
}

async fn health(client: &AnalyticsClient) -> Result<(), AnalyticsError> {
    let info = client.service_info().await?;
    let health = client.health().await?;
    println!("{} v{} ({})", info.message, info.version, client.base_url());
    println!("status: {}", health.status);
    Ok(())
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comment_finder::config::Config;
use comment_finder::finder::CommentFinder;
use comment_finder::matcher::normalize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "comment-finder",
    version,
    about = "Find the most-replied comment carrying a target phrase under a video",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (defaults to COMMENT_FINDER_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured one
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the target comment for a video link and print it as JSON
    Find {
        /// Video URL, short or canonical
        url: String,

        /// Abort the lookup after this many seconds
        #[arg(long)]
        deadline_secs: Option<u64>,

        /// Pretty-print the JSON result
        #[arg(long, default_value = "false")]
        pretty: bool,
    },

    /// Show how a text normalizes and whether it carries a target phrase
    Check {
        /// Text to check
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Find {
            url,
            deadline_secs,
            pretty,
        } => {
            tracing::info!(url = %url, deadline_secs = ?deadline_secs, "Starting find command");
            find(&config, &url, deadline_secs, pretty).await?;
        }

        Commands::Check { text } => {
            check(&config, &text)?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("comment_finder=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("comment_finder={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

async fn find(config: &Config, url: &str, deadline_secs: Option<u64>, pretty: bool) -> Result<()> {
    let finder = CommentFinder::new(config).context("Failed to create comment finder")?;

    let result = match deadline_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), finder.find(url))
            .await
            .with_context(|| format!("Lookup did not finish within {secs}s"))?,
        None => finder.find(url).await,
    };

    let output = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{output}");

    Ok(())
}

fn check(config: &Config, text: &str) -> Result<()> {
    let matcher = config.matcher();
    let normalized = normalize(text);
    let matched: Vec<&str> = matcher.matching_phrases(&normalized).collect();

    let output = serde_json::json!({
        "normalized": &normalized,
        "matches": matcher.matches_normalized(&normalized),
        "phrases": matched,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_playback::{config::Config, resolver::playlist::reference_lines, Resolver};

#[derive(Parser)]
#[command(name = "m3u-playback")]
#[command(version)]
#[command(about = "Resolve M3U/HLS stream URLs to their playable endpoints")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Nested playlist depth bound (overrides config file)
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve URLs (and/or every entry of a local M3U file)
    Resolve {
        /// URLs to resolve
        urls: Vec<String>,

        /// Local M3U playlist whose entries are resolved too
        #[arg(short, long, value_name = "FILE")]
        playlist: Option<PathBuf>,

        /// Emit one JSON object per line
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("m3u_playback={},resolver={0},playback={0}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(max_depth) = cli.max_depth {
        config.resolver.max_depth = max_depth;
    }

    match cli.command {
        Command::Resolve {
            mut urls,
            playlist,
            json,
        } => {
            if let Some(path) = playlist {
                let contents = tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("reading playlist {}", path.display()))?;
                urls.extend(reference_lines(&contents).map(str::to_string));
            }
            if urls.is_empty() {
                anyhow::bail!("nothing to resolve: pass URLs or --playlist");
            }

            let resolver = Resolver::from_config(&config.resolver)?;
            for url in urls {
                let resolution = resolver.resolve(&url).await;
                if json {
                    let line = json!({
                        "original": url,
                        "resolved": resolution.url,
                        "termination": resolution.termination.to_string(),
                        "depth": resolution.depth,
                        "requests": resolution.requests,
                    });
                    println!("{line}");
                } else {
                    println!(
                        "{url} -> {} ({}, {} request(s))",
                        resolution.url, resolution.termination, resolution.requests
                    );
                }
            }
        }
    }

    Ok(())
}

//! Release Cache CLI - refreshes the cache once and prints what would be served.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use clap::builder::FalseyValueParser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use release_cache::{CacheConfig, RefreshOutcome, ReleaseCache};

/// Release Cache
#[derive(Parser)]
#[command(name = "release-cache")]
#[command(about = "Resolve the latest release and its per-platform downloads")]
#[command(version)]
struct Args {
    /// Repository owner
    #[arg(long, env = "ACCOUNT")]
    account: Option<String>,

    /// Repository name
    #[arg(long, env = "REPOSITORY")]
    repository: Option<String>,

    /// Consider pre-releases alongside stable releases
    #[arg(long, env = "PRE", value_parser = FalseyValueParser::new())]
    pre: bool,

    /// Consider pre-releases only
    #[arg(long, env = "ONLY_PRE", value_parser = FalseyValueParser::new())]
    only_pre: bool,

    /// Alternate API base URL
    #[arg(long, env = "URL")]
    url: Option<String>,

    /// Access token for private repositories (requires --url)
    #[arg(long, env = "TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Minutes after which the cached release is considered outdated
    #[arg(long, env = "INTERVAL", default_value_t = 15)]
    interval: u32,

    /// Print only the download URL for this platform (e.g. "mac", "win32", "deb")
    #[arg(long)]
    platform: Option<String>,

    /// Print the patched RELEASES manifest instead of the snapshot
    #[arg(long, conflicts_with = "platform")]
    manifest: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn config(&self) -> CacheConfig {
        let mut config = CacheConfig::new(
            self.account.clone().unwrap_or_default(),
            self.repository.clone().unwrap_or_default(),
        );
        config.include_prerelease = self.pre;
        config.only_prerelease = self.only_pre;
        config.url = self.url.clone();
        config.token = self.token.clone();
        config.interval_minutes = self.interval;
        config
    }
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let cache = ReleaseCache::new(args.config()).context("Invalid configuration")?;

    match cache.refresh().await {
        RefreshOutcome::Updated { version } => info!(%version, "Release cached"),
        RefreshOutcome::FetchFailed => {
            error!("Could not fetch the release list");
            return Ok(ExitCode::FAILURE);
        }
        outcome => info!(?outcome, "Cache unchanged"),
    }

    let entry = cache.read();

    if let Some(platform) = &args.platform {
        return match entry.download_url(platform) {
            Some(url) => {
                println!("{url}");
                Ok(ExitCode::SUCCESS)
            }
            None => {
                error!(%platform, "No download for platform");
                Ok(ExitCode::FAILURE)
            }
        };
    }

    if args.manifest {
        return match &entry.manifest_text {
            Some(text) => {
                println!("{text}");
                Ok(ExitCode::SUCCESS)
            }
            None => {
                error!("No RELEASES manifest cached");
                Ok(ExitCode::FAILURE)
            }
        };
    }

    println!("{}", serde_json::to_string_pretty(&*entry)?);
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    setup_logging(&args.log_level, args.json_logs);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use checkweather_core::{
    CacheStore, Config, ErrorKind, MemoryCache, RedisCache, WeatherError, WeatherResolver,
    upstream::client_from_config,
};
use clap::{Args, Parser, Subcommand};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "checkweather", version, about = "Cached current and 7-day weather lookups")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the API key and cache settings.
    Configure,

    /// Show weather for a city or a coordinate pair.
    Show(ShowArgs),

    /// Print the config file location.
    ConfigPath,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// City name, e.g. "Cairo".
    #[arg(long)]
    pub city: Option<String>,

    /// Latitude in decimal degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Print the normalized JSON instead of a summary.
    #[arg(long)]
    pub json: bool,

    /// Use an in-process cache instead of Redis.
    #[arg(long)]
    pub no_cache_server: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show(args) => show(args).await,
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load_file()?;

    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    cfg.set_api_key(api_key.trim().to_string());

    let host = inquire::Text::new("Redis host:")
        .with_default(&cfg.cache.host)
        .prompt()
        .context("Failed to read Redis host")?;
    cfg.cache.host = host;

    cfg.cache.port = inquire::CustomType::<u16>::new("Redis port:")
        .with_default(cfg.cache.port)
        .prompt()
        .context("Failed to read Redis port")?;

    cfg.cache.ttl_secs = inquire::CustomType::<u64>::new("Cache TTL in seconds (0 disables):")
        .with_default(cfg.cache.ttl_secs)
        .prompt()
        .context("Failed to read cache TTL")?;

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(args: ShowArgs) -> anyhow::Result<ExitCode> {
    let cfg = Config::load()?;
    let resolver = build_resolver(&cfg, args.no_cache_server).await?;

    match resolver
        .get_weather(args.city.as_deref(), args.lat, args.lon)
        .await
    {
        Ok(data) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print!("{}", output::render(&data));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            report(&e);
            Ok(exit_code(e.kind()))
        }
    }
}

async fn build_resolver(cfg: &Config, no_cache_server: bool) -> anyhow::Result<WeatherResolver> {
    let upstream = Arc::new(client_from_config(cfg)?);

    let cache: Arc<dyn CacheStore> = if no_cache_server {
        Arc::new(MemoryCache::new())
    } else {
        match RedisCache::connect(&cfg.cache.redis_url(), cfg.cache.connect_timeout()).await {
            Ok(redis) => Arc::new(redis),
            Err(e) => {
                tracing::warn!("redis unavailable, using in-process cache: {e:#}");
                Arc::new(MemoryCache::new())
            }
        }
    };

    Ok(WeatherResolver::new(cache, upstream, cfg.cache.ttl()))
}

fn report(e: &WeatherError) {
    if e.kind() == ErrorKind::Internal {
        tracing::error!(error = %e, "weather lookup failed");
    }
    eprintln!("Error: {}", e.public_message());
}

fn exit_code(kind: ErrorKind) -> ExitCode {
    match kind {
        ErrorKind::InvalidRequest => ExitCode::from(2),
        ErrorKind::NotFound => ExitCode::from(3),
        ErrorKind::Internal => ExitCode::FAILURE,
    }
}

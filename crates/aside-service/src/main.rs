//! Aside binary: looks records up through the cache-aside service.

use std::path::PathBuf;

use anyhow::Context;
use aside_core::{Key, Ttl};
use aside_service::metrics::init_metrics;
use aside_service::{CacheAsideService, logging, settings};
use aside_stores::{create_cache_or_noop, create_store};
use clap::Parser;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "aside", version, about = "Read records through a cache-aside layer")]
struct Cli {
    /// Settings file, layered over ./aside.toml
    #[arg(short, long, env = "ASIDE_CONFIG")]
    config: Option<PathBuf>,

    /// TTL in seconds for entries written by this run
    #[arg(long)]
    ttl: Option<u64>,

    /// Keys to look up
    #[arg(required = true)]
    keys: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = settings::load(cli.config.as_deref()).context("failed to load settings")?;
    logging::init(&settings.logging).context("failed to initialize logging")?;

    let metrics_handle = if settings.metrics.enabled {
        Some(init_metrics().context("failed to install metrics recorder")?)
    } else {
        None
    };

    let ttl_override = cli
        .ttl
        .map(Ttl::from_secs)
        .transpose()
        .context("invalid --ttl")?;
    let keys = cli
        .keys
        .iter()
        .map(Key::new)
        .collect::<Result<Vec<_>, _>>()
        .context("invalid key")?;

    info!(
        version = aside_service::version(),
        cache = %settings.cache.kind(),
        store = %settings.store.kind(),
        "Starting aside"
    );

    let cache = create_cache_or_noop(&settings.cache).await?;
    let store = match create_store(&settings.store).await {
        Ok(store) => store,
        Err(e) => {
            if let Err(close_err) = cache.close().await {
                warn!(error = %close_err, "Failed to close cache store");
            }
            return Err(e.into());
        },
    };

    let outcome = match CacheAsideService::builder()
        .cache(cache.clone())
        .store(store.clone())
        .default_ttl(settings.service.default_ttl)
        .namespace(settings.service.namespace.clone())
        .build()
    {
        Ok(service) => lookup_all(&service, &keys, ttl_override).await,
        Err(e) => Err(e.into()),
    };

    // Both handles are released even when a lookup failed
    if let Err(e) = cache.close().await {
        warn!(error = %e, "Failed to close cache store");
    }
    if let Err(e) = store.close().await {
        warn!(error = %e, "Failed to close persistent store");
    }

    if let Some(handle) = metrics_handle {
        eprintln!("{}", handle.render());
    }

    outcome
}

/// Prints one JSON line per key; `record` is `null` when the key is absent.
async fn lookup_all(
    service: &CacheAsideService,
    keys: &[Key],
    ttl_override: Option<Ttl>,
) -> anyhow::Result<()> {
    let mut failures = 0usize;

    for key in keys {
        match service.get(key, ttl_override).await {
            Ok(record) => {
                let line = serde_json::json!({ "key": key, "record": record });
                println!("{}", serde_json::to_string(&line)?);
            },
            Err(e) => {
                failures += 1;
                error!(key = %key, error = %e, "Lookup failed");
            },
        }
    }

    let metrics = service.metrics();
    info!(
        hits = metrics.hits(),
        misses = metrics.misses(),
        cache_errors = metrics.cache_errors(),
        hit_rate = metrics.hit_rate(),
        "Lookups finished"
    );

    if failures > 0 {
        anyhow::bail!("{} of {} lookups failed", failures, keys.len());
    }
    Ok(())
}

//! CLI binary for geolookup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use geolookup::{LookupConfig, ProviderConfig, SearchController};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Look up addresses with a local or remote geocoding provider.
#[derive(Parser)]
#[command(name = "geolookup", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Provider to query, overriding the configuration file.
    #[arg(short, long, value_enum)]
    provider: Option<ProviderArg>,

    /// API key for remote providers.
    #[arg(long, env = "GEOLOOKUP_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// JSON placemark file for the local provider.
    #[arg(long)]
    index: Option<PathBuf>,

    /// Debounce the search by this many milliseconds before sending it.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Address, place, or postcode to search for.
    term: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Local,
    Geocoder,
    Postcode,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geolookup=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::info!(provider = %config.provider.kind(), "looking up address");

    let records = match cli.delay_ms {
        Some(ms) => {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let controller = SearchController::new(config, move |outcome| {
                let _ = tx.send(outcome);
            })?;
            controller.search_with_delay(&cli.term, Duration::from_millis(ms));
            rx.recv()
                .await
                .ok_or_else(|| anyhow::anyhow!("search finished without a result"))??
        }
        None => {
            let controller = SearchController::new(config, |_| {})?;
            controller.lookup(&cli.term).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Read the config file (explicit, or the default path when present) and
/// apply command-line overrides.
fn load_config(cli: &Cli) -> anyhow::Result<LookupConfig> {
    let mut config = match &cli.config {
        Some(path) => LookupConfig::from_file(path)?,
        None => {
            let path = LookupConfig::default_config_path();
            if path.exists() {
                LookupConfig::from_file(&path)?
            } else {
                LookupConfig::default()
            }
        }
    };

    if let Some(provider) = cli.provider {
        let key = config.provider.api_key().map(str::to_owned);
        config.provider = match provider {
            ProviderArg::Local => ProviderConfig::Local,
            ProviderArg::Geocoder => ProviderConfig::Geocoder { api_key: key },
            ProviderArg::Postcode => ProviderConfig::Postcode { api_key: key },
        };
    }
    if let Some(key) = &cli.api_key {
        config.provider = config.provider.with_api_key(key.clone());
    }
    if let Some(index) = &cli.index {
        config.local_index = Some(index.clone());
    }
    Ok(config)
}

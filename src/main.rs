//! worldmatrix: local time and current weather for a fixed set of cities.
//!
//! Each city's time and weather resolve through three tiers: persisted
//! cache, remote API, deterministic local fallback. This binary is the
//! thin surface over that core: argument handling, rendering, the watch
//! loop, and configuration maintenance.

mod display;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use display::CityReport;
use worldmatrix_acquire::{
    AtmosphericService, CityRegistry, TemporalService, TimeApiClient, WeatherApiClient,
};
use worldmatrix_core::{Config, UnitSystem};
use worldmatrix_store::CacheStore;

#[derive(Parser)]
#[command(
    name = "worldmatrix",
    about = "Local time and current weather for a fixed set of cities"
)]
struct Cli {
    /// Target city, or "all".
    #[arg(long, default_value = "all", value_parser = ["london", "newyork", "tokyo", "all"])]
    city: String,

    /// Re-resolve and re-render on a fixed interval until interrupted.
    #[arg(long)]
    watch: bool,

    /// Render one comparison table instead of per-city cards.
    #[arg(long)]
    compare: bool,

    /// Emit compact JSON instead of formatted output.
    #[arg(long)]
    raw: bool,

    /// Print the current configuration and exit.
    #[arg(long)]
    config: bool,

    /// Store an API key: --set-key <openweather|worldtime> <KEY>.
    #[arg(long, num_args = 2, value_names = ["TYPE", "KEY"])]
    set_key: Option<Vec<String>>,

    /// Set measurement units and exit.
    #[arg(long, value_enum)]
    units: Option<UnitsArg>,

    /// Watch-mode refresh interval in seconds (defaults to the
    /// configured value).
    #[arg(long)]
    refresh: Option<u64>,

    /// Purge all cached records and exit.
    #[arg(long)]
    clear_cache: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitsArg {
    Metric,
    Imperial,
}

impl From<UnitsArg> for UnitSystem {
    fn from(value: UnitsArg) -> Self {
        match value {
            UnitsArg::Metric => UnitSystem::Metric,
            UnitsArg::Imperial => UnitSystem::Imperial,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    worldmatrix_core::init()?;
    let cli = Cli::parse();

    if cli.config || cli.set_key.is_some() || cli.units.is_some() || cli.clear_cache {
        return run_configuration(&cli);
    }

    let app = App::build().context("failed to initialize")?;
    tracing::info!("worldmatrix initialized");

    if cli.watch {
        app.run_watch(&cli).await
    } else {
        app.run_cycle(&cli).await
    }
}

/// Handle the maintenance flags (`--set-key`, `--units`, `--clear-cache`,
/// `--config`). These touch config and cache directly, without the
/// acquisition services.
fn run_configuration(cli: &Cli) -> Result<()> {
    let mut config = Config::load()?;

    if let Some(pair) = &cli.set_key {
        let (kind, value) = (pair[0].as_str(), pair[1].clone());
        match kind {
            "openweather" => config.credentials.weather_api_key = Some(value),
            "worldtime" => config.credentials.time_api_key = Some(value),
            other => anyhow::bail!("unknown key type: {other} (expected openweather or worldtime)"),
        }
        config.save()?;
        println!("Configured {kind} API key");
        return Ok(());
    }

    if let Some(units) = cli.units {
        config.units = units.into();
        config.save()?;
        println!("Units set to {}", config.units.as_str());
        return Ok(());
    }

    if cli.clear_cache {
        let store =
            CacheStore::open(Config::cache_db_path()?).context("failed to open cache store")?;
        store.purge().context("failed to purge cache")?;
        println!("Cache purged");
        return Ok(());
    }

    println!("Current configuration:");
    println!(
        "  weather_api_key: {}",
        Config::masked_key(config.credentials.weather_key())
    );
    println!(
        "  time_api_key:    {}",
        Config::masked_key(config.credentials.time_key())
    );
    println!("  cache_ttl:       {}s", config.cache.ttl_seconds);
    println!("  units:           {}", config.units.as_str());
    println!("  refresh:         {}s", config.watch.refresh_seconds);
    Ok(())
}

struct App {
    registry: Arc<CityRegistry>,
    temporal: TemporalService,
    atmospheric: AtmosphericService,
    units: UnitSystem,
    refresh_default: u64,
}

impl App {
    /// Wire configuration, cache store, registry, and services. A cache
    /// store that cannot be opened at all is a fatal initialization
    /// error, unlike per-resolution storage hiccups.
    fn build() -> Result<Self> {
        let config = Config::load_validated()?;
        let store = Arc::new(
            CacheStore::open(Config::cache_db_path()?).context("failed to open cache store")?,
        );
        let registry = Arc::new(CityRegistry::builtin());

        let time_client = TimeApiClient::new(config.credentials.time_key().map(String::from))
            .context("failed to build time API client")?;
        let weather_client = match config.credentials.weather_key() {
            Some(key) => Some(
                WeatherApiClient::new(key.to_string())
                    .context("failed to build weather API client")?,
            ),
            None => None,
        };

        let ttl = config.cache.ttl_seconds;
        Ok(Self {
            temporal: TemporalService::new(
                Arc::clone(&registry),
                Arc::clone(&store),
                time_client,
                ttl,
            ),
            atmospheric: AtmosphericService::new(
                Arc::clone(&registry),
                Arc::clone(&store),
                weather_client,
                ttl,
                config.units,
            ),
            registry,
            units: config.units,
            refresh_default: config.watch.refresh_seconds,
        })
    }

    fn target_ids(&self, cli: &Cli) -> Vec<String> {
        if cli.city == "all" {
            self.registry.ids().map(String::from).collect()
        } else {
            vec![cli.city.clone()]
        }
    }

    async fn resolve_reports(&self, cli: &Cli) -> Result<Vec<CityReport>> {
        let mut reports = Vec::new();
        for id in self.target_ids(cli) {
            // The two record kinds for one city are independent; resolve
            // them concurrently.
            let (temporal, atmospheric) =
                tokio::join!(self.temporal.resolve(&id), self.atmospheric.resolve(&id));
            let profile = self
                .registry
                .get(&id)
                .with_context(|| format!("city not in registry: {id}"))?
                .clone();
            reports.push(CityReport {
                profile,
                temporal: temporal?,
                atmospheric: atmospheric?,
            });
        }
        Ok(reports)
    }

    async fn run_cycle(&self, cli: &Cli) -> Result<()> {
        let reports = self.resolve_reports(cli).await?;

        if cli.raw {
            println!("{}", display::render_raw(&reports, self.units));
        } else if cli.compare {
            println!("Temporal-Atmospheric Comparison");
            println!(
                "Generated: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("{}", display::render_comparison(&reports, self.units));
        } else {
            for report in &reports {
                println!("{}\n", display::render_card(report, self.units));
            }
        }
        Ok(())
    }

    async fn run_watch(&self, cli: &Cli) -> Result<()> {
        let interval = Duration::from_secs(cli.refresh.unwrap_or(self.refresh_default).max(2));
        let mut cycle: u64 = 0;

        loop {
            print!("\x1b[2J\x1b[H");
            println!("worldmatrix surveillance - cycle {cycle}");
            println!(
                "Refresh: {}s | {}",
                interval.as_secs(),
                chrono::Utc::now().format("%H:%M:%S UTC")
            );
            println!();

            self.run_cycle(cli).await?;

            println!("Next update in {}s | Ctrl+C to stop", interval.as_secs());
            // Ctrl+C stops scheduling new cycles; a cycle already under
            // way above runs to completion.
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    println!("Surveillance terminated");
                    return Ok(());
                }
            }
            cycle += 1;
        }
    }
}

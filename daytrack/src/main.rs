use std::time::Duration;

use anyhow::{ensure, Context, Result};
use chrono::Local;
use clap::Parser;
use daytrack_config::{default_config, CompositeConfig, Config, EnvConfig};

use daytrack::core::location;
use daytrack::core::sampler::{SampleOutcome, Sampler};
use daytrack::core::window::SamplingWindow;
use daytrack::core::{CoreEvent, TrackerCore};
use daytrack::geocode::HttpGeocoder;
use daytrack::prefs::{self, FilePrefs, KeyValueStore};
use daytrack::store::{MemoryStore, RtdbStore, TrackStore};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Store the user identifier the samples are recorded under, then exit.
    #[arg(long, value_name = "ID")]
    set_id: Option<String>,

    /// Run a single sampling invocation and exit instead of looping.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = CompositeConfig::from_configs(
        Box::new(EnvConfig::from_env()),
        Box::new(default_config()),
    );
    daytrack::init_logging(&config);

    if let Some(id) = &args.set_id {
        let mut prefs = FilePrefs::in_settings_dir()?;
        prefs.set(prefs::ID_KEY, id)?;
        log::info!("identifier '{id}' stored");
        return Ok(());
    }

    let sampler = build_sampler(&config)?;

    if args.once {
        let now = Local::now().naive_local();
        match sampler.sample_once(now, log_event).await? {
            SampleOutcome::Skipped => {
                log::info!("outside the sampling window, nothing recorded")
            }
            SampleOutcome::Recorded { .. } => {}
        }
        return Ok(());
    }

    let interval_minutes: u64 = config
        .get("SAMPLE_INTERVAL_MINUTES")?
        .parse()
        .context("SAMPLE_INTERVAL_MINUTES is not a number")?;
    ensure!(interval_minutes > 0, "SAMPLE_INTERVAL_MINUTES must be at least 1");

    let core = TrackerCore::new(sampler, Duration::from_secs(interval_minutes * 60));
    core.lock().await.on_core_event(log_event);

    tokio::signal::ctrl_c().await?;
    log::info!("shutting down");
    core.lock().await.quit().await;
    Ok(())
}

fn log_event(event: CoreEvent) {
    match event {
        CoreEvent::AddressResolved(address) if address.is_empty() => {
            log::warn!("no address could be resolved for the current fix")
        }
        CoreEvent::AddressResolved(address) => {
            log::info!("you are now at {}", address.trim_end().replace('\n', ", "))
        }
        CoreEvent::SampleRecorded { path, .. } => log::debug!("sample recorded at {path}"),
    }
}

fn build_sampler(config: &dyn Config) -> Result<Sampler> {
    let window = SamplingWindow::parse(&config.get("WINDOW_START")?, &config.get("WINDOW_END")?)?;
    let fix_timeout: u64 = config
        .get("FIX_TIMEOUT_SECS")?
        .parse()
        .context("FIX_TIMEOUT_SECS is not a number")?;

    let store: Box<dyn TrackStore> = match config.get("STORE_URL") {
        Ok(url) => Box::new(RtdbStore::new(&url)?),
        Err(_) => {
            log::warn!("STORE_URL not configured, samples are recorded in memory only");
            Box::new(MemoryStore::new())
        }
    };

    let geocoder = HttpGeocoder::new(&config.get("GEOCODER_URL")?)?;
    let locator = location::platform_locator(config)?;
    let prefs: Box<dyn KeyValueStore> = Box::new(FilePrefs::in_settings_dir()?);

    Ok(Sampler::new(
        prefs,
        locator,
        Box::new(geocoder),
        store,
        window,
        Duration::from_secs(fix_timeout),
    ))
}

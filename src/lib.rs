pub mod cli;
pub mod config;
pub mod errors;
pub mod executor;
pub mod logging;
pub mod observe;
pub mod orchestrator;
pub mod perception;
pub mod skills;
pub mod vision;
pub mod window;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use crate::cli::Cli;
use crate::config::{AppConfig, CONFIG_FILE_NAME};
use crate::errors::TinderResult;
use crate::executor::{ActionExecutor, EnigoDriver, Humanizer};
use crate::observe::Observer;
use crate::orchestrator::Orchestrator;
use crate::perception::{FrameCapture, XcapFrameSource};
use crate::skills::{SkillLibrary, SlotGrid};
use crate::vision::registry::ProviderRegistry;
use crate::vision::PerceptionClient;
use crate::window::source::XcapWindowSource;
use crate::window::store::RegionStore;
use crate::window::WindowLocator;

/// Wire every component from config and run the selected mode.
///
/// Expected failures end in a printed summary, not an error; `Err` means
/// the process could not be set up at all.
pub async fn run(cli: Cli) -> TinderResult<()> {
    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    if cli.init_config {
        let path = cli.config.clone().unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        config::save_config(&AppConfig::default(), &path)?;
        println!("wrote default config to {}", path.display());
        return Ok(());
    }

    let config = config::load_config(cli.config.as_deref())?;
    let _log_guard = logging::init_logging(&config.logging);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tinderbox starting");

    let mut locator = WindowLocator::new(
        Box::new(XcapWindowSource),
        RegionStore::new(config.window.region_file.clone()),
        config.window.title_pattern.clone(),
    );
    if cli.refresh_window {
        tracing::info!("re-detecting window");
        if let Err(e) = locator.refresh() {
            tracing::error!(error = %e, "window re-detection failed");
        }
    }

    let mapper = locator.mapper();
    let capture = FrameCapture::new(Box::new(XcapFrameSource), mapper.clone(), config.capture.clone());
    let registry = ProviderRegistry::from_config(&config.perception);
    let perception = PerceptionClient::new(
        registry.active(),
        config.perception.timeout(),
        config.grid.slot_count,
    );

    if cli.observe {
        let mut observer = Observer::new(capture, perception);
        let results = observer.diagnostics(locator.region()).await;
        let passed = results.iter().filter(|r| r.passed).count();
        for r in &results {
            println!("[{}] {}: {}", if r.passed { "PASS" } else { "FAIL" }, r.name, r.detail);
        }
        println!("{passed}/{} checks passed", results.len());

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        observer.interactive(stdin, tokio::io::stdout()).await?;
        return Ok(());
    }

    if !locator.is_ready() {
        tracing::error!(pattern = %config.window.title_pattern, "no usable window region");
        println!("window '{}' not found; nothing to do", config.window.title_pattern);
        return Ok(());
    }

    let executor = ActionExecutor::new(
        Box::new(EnigoDriver::new()?),
        mapper,
        Humanizer::new(config.humanize.clone()),
    );
    let mut skills = SkillLibrary::new(
        capture,
        perception,
        executor,
        SlotGrid::new(&config.grid),
        config.task.clone(),
    );
    if !skills.grid().is_calibrated() {
        skills.calibrate_grid().await;
    }

    let mut orchestrator = Orchestrator::new(skills, config.run.clone());
    let stop = orchestrator.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current iteration");
            stop.store(true, Ordering::Relaxed);
        }
    });

    let report = orchestrator.run(cli.mode()).await;
    println!("{}", report.summary());
    Ok(())
}

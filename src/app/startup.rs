//! Application startup

use clap::{CommandFactory, FromArgMatches};
use std::io::IsTerminal;
use std::sync::Arc;

use super::cli::args::Args;
use super::cli::config::{Settings, DEFAULT_MASTER};
use super::persistence::Persistence;
use super::sweeper::spawn_expiry_sweeper;
use super::transport::Console;
use crate::booking::api::Scheduler;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::styles::palette_to_clap;
use crate::core::time::{Clock, SystemClock};
use crate::core::version;
use crate::storage::SnapshotStore;

/// Run the application; returns the process exit code
pub async fn startup() -> i32 {
    let terminal = std::io::stdout().is_terminal();
    let command = Args::command().styles(palette_to_clap(terminal));
    let args = match Args::from_arg_matches(&command.get_matches()) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let settings = match Settings::resolve(&args).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let color = settings.color.unwrap_or(terminal);
    colored::control::set_override(color);
    let log_file = settings
        .log_file
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned());
    if let Err(e) = init_logging(
        settings.log_level.as_deref(),
        settings.log_format.as_deref(),
        log_file.as_deref(),
        color,
    ) {
        eprintln!("Error: failed to initialise logging: {}", e);
        return 1;
    }
    log::info!("{} starting", version::long_version());
    log::debug!("Settings: {:?}", settings);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let persistence = Arc::new(Persistence::new(
        settings.data_file.clone().map(SnapshotStore::new),
        clock.clone(),
    ));
    let Some(scheduler) = build_scheduler(&settings, &persistence, clock.clone()) else {
        return 1;
    };
    let scheduler = Arc::new(scheduler);

    let shutdown = ShutdownCoordinator::new();
    shutdown.install_signal_handlers();
    let sweeper = spawn_expiry_sweeper(
        scheduler.clone(),
        persistence.clone(),
        settings.expiry_sweep,
        &shutdown,
    );

    let user = settings
        .user
        .clone()
        .or_else(|| settings.masters.first().cloned())
        .unwrap_or_else(|| DEFAULT_MASTER.to_string());
    let mut console = Console::new(
        scheduler.clone(),
        persistence.clone(),
        clock,
        settings.masters.clone(),
        &user,
        color,
    );
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let result = console.run(stdin, tokio::io::stdout(), &shutdown).await;

    shutdown.trigger_shutdown();
    if let Err(e) = sweeper.await {
        log::warn!("Expiry sweeper ended abnormally: {}", e);
    }
    persistence.save(&scheduler);
    log::info!("Shut down");

    match result {
        Ok(()) => 0,
        Err(e) => {
            log::error!("Console failed: {}", e);
            1
        }
    }
}

/// Restore saved state, or start fresh from the configuration
fn build_scheduler(
    settings: &Settings,
    persistence: &Persistence,
    clock: Arc<dyn Clock>,
) -> Option<Scheduler> {
    match persistence.load(settings.scheduler) {
        Ok(Some(scheduler)) => return Some(scheduler),
        Ok(None) => {}
        Err(e) => {
            log_error_with_context(&e, "Loading salon state");
            return None;
        }
    }

    let fresh = settings.build_catalog().and_then(|catalog| {
        Scheduler::new(settings.scheduler, catalog, settings.template.clone(), clock)
    });
    match fresh {
        Ok(scheduler) => {
            if persistence.is_enabled() {
                persistence.save(&scheduler);
            }
            Some(scheduler)
        }
        Err(e) => {
            log_error_with_context(&e, "Building the salon from configuration");
            None
        }
    }
}

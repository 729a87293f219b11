use anyhow::{Context, Result};
use tokio::signal;

use lib_router::configs::load_router_config;
use lib_router::loggers::setup_logging;
use lib_router::{ChannelTransport, IoRouterLifecycle, RuleBasedIoRouter, StaticDeviceDirectory};

mod router_logic;
use router_logic::{config, events};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config();
    let log_path = setup_logging(&config.log_dir(), config.app_name(), config.log_level())?;
    log::info!("Logging to {}", log_path.display());

    let rules_file = config
        .rules_file
        .clone()
        .context("No rules file configured (--rules-file or ROUTER_RULES_FILE)")?;
    let router_config = load_router_config(&rules_file)
        .with_context(|| format!("Failed to load rules file {}", rules_file.display()))?;

    let (transport, rx) = ChannelTransport::new();
    let sink = tokio::spawn(events::log_events(rx));

    let directory = StaticDeviceDirectory::new(router_config.devices.clone());
    let mut router = RuleBasedIoRouter::new(directory, transport).with_options(router_config.router_options());
    router.on_init();
    router.on_started();
    log::info!(
        "Router running: {} rules active, {} associations",
        router.rule_count(),
        router.active_associations().len()
    );

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            log::info!("Ctrl-C received, initiating shutdown.");
        }
        _ = async {
            #[cfg(unix)]
            {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut term_signal) => {
                        term_signal.recv().await;
                        log::info!("SIGTERM received, initiating shutdown.");
                    }
                    Err(e) => {
                        log::warn!("SIGTERM handler unavailable: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {}
    }

    router.on_stopped();
    // Dropping the router closes the channel and ends the sink.
    drop(router);
    let totals = sink.await?;

    log::info!(
        "Shutdown complete ({} associations made, {} released).",
        totals.associated,
        totals.disassociated
    );
    Ok(())
}

use card_offers::config::{load_config, AppConfig};
use card_offers::exporter::{serialize, write_table};
use card_offers::scraper::HttpPortalSession;
use card_offers::traversal::{Traversal, TraversalOptions};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".into());
    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Nothing is scraped without credentials.
    if let Err(e) = config.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let session = HttpPortalSession::new(&config.base_url, &config.username, &config.password)?;
    let options = TraversalOptions {
        today: config.today(),
        wait_timeout: Duration::from_secs(config.wait_timeout_seconds),
        notification_threshold: config.notification_threshold,
    };

    let report = Traversal::new(session, options).run().await?;
    if !report.canceled_cards.is_empty() {
        info!("Skipped {} canceled card(s)", report.canceled_cards.len());
    }
    if !report.failed_cards.is_empty() {
        warn!("{} card(s) could not be fully scanned", report.failed_cards.len());
    }
    info!(
        "Collected {} distinct offers across {} cards",
        report.offers.len(),
        report.card_names.len()
    );

    let table = serialize(&report.offers, &report.card_names, &config.status_labels);
    write_table(
        &config.output_path,
        &table,
        config.delimiter_byte()?,
        config.notification_threshold,
    )?;
    Ok(())
}

use anyhow::{Context, Result};
use chrono::Utc;
use sheet_localization::config::Settings;
use sheet_localization::update::Updater;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sheet_localization=info".parse()?),
        )
        .init();

    let settings = Settings::from_env_or_file().context("Failed to load localization settings")?;
    settings.validate().context("Invalid localization settings")?;

    // Optional single sheet to update
    let sheet = std::env::args().nth(1);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .context("Failed to build HTTP client")?;
    let updater = Updater::new(&settings, client);

    let mut last_reported = Duration::ZERO;
    let mut progress = |name: &str, elapsed: Duration| {
        if elapsed >= last_reported + Duration::from_secs(1) {
            info!("Still loading {} ({}s)", name, elapsed.as_secs());
            last_reported = elapsed;
        }
    };

    let started = Utc::now();
    let summary = match sheet.as_deref() {
        Some(name) => {
            info!("Updating sheet {}", name);
            updater.update_sheet(name, &mut progress).await?
        }
        None => {
            info!("Updating all {} sheets", settings.sheets.len());
            updater.update_all(&mut progress).await?
        }
    };

    info!(
        "Wrote {} files for {} sheets in {}s",
        summary.files_written,
        summary.sheets_updated.len(),
        (Utc::now() - started).num_seconds()
    );

    if !summary.sheets_failed.is_empty() {
        warn!("Sheets not updated: {}", summary.sheets_failed.join(", "));
    }

    let errors = summary.unresolved_errors();
    if errors > 0 {
        warn!("There are {} unresolved errors", errors);
    } else if summary.report.has_warnings() {
        info!("No errors, {} warnings", summary.report.warnings().count());
    }

    Ok(())
}

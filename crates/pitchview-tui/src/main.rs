// Pitchview entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the Savant client
// 4. Create mpsc channels and the session
// 5. Spawn app logic task
// 6. Run the TUI until the user quits
// 7. Cleanup on exit

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use pitchview_app::app::{self, Session};
use pitchview_app::config;
use pitchview_app::provider::SavantClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Pitchview starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: savant={}, {} register shards, earliest date {}",
        config.savant.base_url,
        config.register.shards.len(),
        config.dates.earliest
    );

    // 3. Build the Savant client
    let client = SavantClient::from_config(&config).context("failed to build HTTP client")?;
    let earliest = config.dates.earliest;

    // 4. Create mpsc channels
    let (task_tx, task_rx) = mpsc::channel(64);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let session = Session::new(config, Arc::new(client), task_tx);

    // 5. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(task_rx, cmd_rx, ui_tx, session).await {
            error!("Application loop error: {}", e);
        }
    });

    // 6. The TUI consumes ui_rx and sends commands through cmd_tx.
    // It blocks until the user presses 'q' or Ctrl+C.
    if let Err(e) = pitchview_tui::run(ui_rx, cmd_tx, earliest).await {
        error!("TUI error: {}", e);
    }

    // 7. Cleanup: wait for app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Pitchview shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("pitchview.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("pitchview_app=info,pitchview_tui=info,pitchview_baseball=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

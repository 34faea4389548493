use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info};
use match_client::app::AppState;
use match_client::channel::EventChannel;
use match_client::types::Status;
use tokio::io::BufReader;

struct ConsoleChannel();

impl EventChannel for ConsoleChannel {
    fn send(&self, status: Status) -> Result<()> {
        let s = serde_json::to_string(&status)?;
        info!("{}", s);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut app_state = AppState::setup().context("Cannot setup state")?;

    let shutdown = app_state.shutdown_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, shutting down");
                shutdown.cancel();
            }
            Err(e) => error!("Cannot listen for Ctrl-C: {}", e),
        }
    });

    info!("Press Enter to submit the current session");
    let input = BufReader::new(tokio::io::stdin());
    let result = app_state.run(Arc::new(ConsoleChannel()), input).await;
    if let Err(e) = &result {
        sentry_anyhow::capture_anyhow(e);
        error!("Client stopped with error: {:#}", e);
    }
    app_state.flush_monitoring();
    log::logger().flush();

    // a pending stdin read keeps the runtime from shutting down
    std::process::exit(i32::from(result.is_err()));
}

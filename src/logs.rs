use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{Metadata, Record, info};
use sentry_log::SentryLogger;

const APP_NAME: &str = "MatchClient";
const LOG_FILE_NAME: &str = "output.log";

pub fn default_log_file_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_NAME).join(LOG_FILE_NAME))
}

pub fn dispatch_logs(log_file: Option<&Path>) -> Result<()> {
    let mut dispatch = fern::Dispatch::new()
        // Perform allocation-free log formatting
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ));
        })
        .level(log::LevelFilter::Debug)
        .level_for("tungstenite", log::LevelFilter::Info)
        .level_for("tokio_tungstenite", log::LevelFilter::Info)
        .level_for("hyper_util", log::LevelFilter::Info)
        .level_for("reqwest", log::LevelFilter::Info)
        .chain(std::io::stdout());

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create log directory {}", parent.display()))?;
        }
        let file = fern::log_file(path)
            .with_context(|| format!("Cannot open log file {}", path.display()))?;
        println!("Write logs to path: {}", path.display());
        dispatch = dispatch.chain(file);
    }

    let (level, fern_log) = dispatch.into_log();

    let log = CombinedLog {
        fern: fern_log,
        sentry: new_sentry_log(),
    };

    log::set_boxed_logger(Box::new(log))?;
    log::set_max_level(level);

    match log_file {
        Some(path) => info!("Logs setup to path: {}", path.display()),
        None => info!("Logs setup to stdout only"),
    }
    Ok(())
}

fn new_sentry_log() -> SentryLogger<pretty_env_logger::env_logger::Logger> {
    let mut log_builder = pretty_env_logger::formatted_builder();
    log_builder.parse_filters("info");
    let log = log_builder.build();
    sentry_log::SentryLogger::with_dest(log)
}

struct CombinedLog {
    fern: Box<dyn log::Log>,
    sentry: SentryLogger<pretty_env_logger::env_logger::Logger>,
}

impl log::Log for CombinedLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.fern.enabled(metadata) || self.sentry.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        self.fern.log(record);
        self.sentry.log(record);
    }

    fn flush(&self) {
        self.fern.flush();
        self.sentry.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_file_in_app_dir() {
        if let Some(path) = default_log_file_path() {
            assert!(path.ends_with("MatchClient/output.log"));
        }
    }
}

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

use crate::environment::Args;
use crate::errors::{ClientError, ClientResult};
use crate::logs;
use crate::submit::DEFAULT_PRICE;

pub const DEFAULT_WS_URL: &str = "ws://localhost:8080/v1/ws";
pub const DEFAULT_MATCH_URL: &str = "http://localhost:8080/v1/match";

const WS_SCHEMES: &[&str] = &["ws", "wss"];
const HTTP_SCHEMES: &[&str] = &["http", "https"];

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct FileConfig {
    ws_url: Option<String>,
    match_url: Option<String>,
    price: Option<String>,
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub ws_url: Url,
    pub match_url: Url,
    pub price: String,
    pub log_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Flags win over the config file, the config file wins over defaults.
    pub fn resolve(args: &Args) -> ClientResult<Self> {
        let file = match &args.config {
            Some(path) => read_file_config(Path::new(path))?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    fn merge(args: &Args, file: FileConfig) -> ClientResult<Self> {
        let ws_url = args
            .ws_url
            .clone()
            .or(file.ws_url)
            .unwrap_or_else(|| DEFAULT_WS_URL.to_owned());
        let match_url = args
            .match_url
            .clone()
            .or(file.match_url)
            .unwrap_or_else(|| DEFAULT_MATCH_URL.to_owned());
        let price = args
            .price
            .clone()
            .or(file.price)
            .unwrap_or_else(|| DEFAULT_PRICE.to_owned());

        let log_file = if args.no_log_file {
            None
        } else {
            args.log_file
                .as_ref()
                .map(PathBuf::from)
                .or(file.log_file)
                .or_else(logs::default_log_file_path)
        };

        Ok(Self {
            ws_url: parse_endpoint(&ws_url, WS_SCHEMES)?,
            match_url: parse_endpoint(&match_url, HTTP_SCHEMES)?,
            price,
            log_file,
        })
    }
}

fn read_file_config(path: &Path) -> ClientResult<FileConfig> {
    let read = || -> anyhow::Result<FileConfig> {
        let data = std::fs::read_to_string(path).context("Failed to read config file")?;
        serde_json::from_str::<FileConfig>(&data).context("Failed to parse JSON")
    };

    read().map_err(|e| ClientError::E1002_CONFIG_READ {
        path: path.to_string_lossy().to_string(),
        inner_error: e,
    })
}

fn parse_endpoint(raw: &str, schemes: &[&str]) -> ClientResult<Url> {
    let url = Url::parse(raw).map_err(|e| ClientError::E1001_INVALID_ENDPOINT {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;

    if !schemes.contains(&url.scheme()) {
        return Err(ClientError::E1001_INVALID_ENDPOINT {
            url: raw.to_owned(),
            reason: format!("scheme must be one of {}", schemes.join(", ")),
        });
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "match-client-{}-{}.json",
            name,
            std::process::id()
        ));
        std::fs::write(&path, content).expect("write config");
        path
    }

    #[test]
    fn test_defaults() {
        let args = Args {
            no_log_file: true,
            ..Args::default()
        };
        let config = ClientConfig::resolve(&args).expect("config");

        assert!(config.log_file.is_none());
        assert_eq!(config.ws_url.as_str(), "ws://localhost:8080/v1/ws");
        assert_eq!(config.match_url.as_str(), "http://localhost:8080/v1/match");
        assert_eq!(config.price, "10.0");
    }

    #[test]
    fn test_flags_override_file() {
        let path = temp_config(
            "override",
            r#"{"wsUrl": "ws://file:1/v1/ws", "price": "50", "logFile": "/tmp/from-file.log"}"#,
        );
        let args = Args {
            price: Some("100".to_owned()),
            config: Some(path.to_string_lossy().to_string()),
            ..Args::default()
        };

        let config = ClientConfig::resolve(&args).expect("config");
        std::fs::remove_file(&path).ok();

        assert_eq!(config.ws_url.as_str(), "ws://file:1/v1/ws");
        assert_eq!(config.match_url.as_str(), DEFAULT_MATCH_URL);
        assert_eq!(config.price, "100");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/from-file.log")));
    }

    #[test]
    fn test_invalid_scheme_rejected() {
        let args = Args {
            ws_url: Some("http://localhost:8080/v1/ws".to_owned()),
            ..Args::default()
        };

        let result = ClientConfig::resolve(&args);
        assert!(matches!(
            result,
            Err(ClientError::E1001_INVALID_ENDPOINT { .. })
        ));
    }

    #[test]
    fn test_secure_socket_url_accepted() {
        let args = Args {
            ws_url: Some("wss://match.example.com/v1/ws".to_owned()),
            match_url: Some("https://match.example.com/v1/match".to_owned()),
            no_log_file: true,
            ..Args::default()
        };

        let config = ClientConfig::resolve(&args).expect("config");

        assert_eq!(config.ws_url.scheme(), "wss");
        assert_eq!(config.match_url.scheme(), "https");
    }

    #[test]
    fn test_broken_config_file() {
        let path = temp_config("broken", "{ not json");
        let args = Args {
            config: Some(path.to_string_lossy().to_string()),
            ..Args::default()
        };

        let result = ClientConfig::resolve(&args);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ClientError::E1002_CONFIG_READ { .. })));
    }
}

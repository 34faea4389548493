use std::fmt::Display;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[allow(non_camel_case_types)]
#[derive(Error, Debug)]
pub enum ClientError {
    E1001_INVALID_ENDPOINT {
        url: String,
        reason: String,
    },
    E1002_CONFIG_READ {
        path: String,
        #[source]
        inner_error: anyhow::Error,
    },

    E2001_SOCKET_CONNECT {
        url: String,
        #[source]
        error: tungstenite::Error,
    },
    E2002_SOCKET_TRANSPORT {
        #[source]
        error: tungstenite::Error,
    },
    E2003_SOCKET_ALREADY_CLOSED,

    E3001_REQUEST_FAILED {
        url: Option<String>,
        #[source]
        error: reqwest::Error,
    },
    E3002_REQUEST_REJECTED {
        url: String,
        code: u16,
    },
}

impl ClientError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::E1001_INVALID_ENDPOINT { .. } => "E1001",
            Self::E1002_CONFIG_READ { .. } => "E1002",
            Self::E2001_SOCKET_CONNECT { .. } => "E2001",
            Self::E2002_SOCKET_TRANSPORT { .. } => "E2002",
            Self::E2003_SOCKET_ALREADY_CLOSED => "E2003",
            Self::E3001_REQUEST_FAILED { .. } => "E3001",
            Self::E3002_REQUEST_REJECTED { .. } => "E3002",
        }
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::E1001_INVALID_ENDPOINT { url, reason } => {
                write!(f, "Invalid endpoint '{}': {}", url, reason)
            }
            Self::E1002_CONFIG_READ { path, inner_error } => {
                write!(f, "Cannot read config file '{}': {:#}", path, inner_error)
            }
            Self::E2001_SOCKET_CONNECT { url, error } => {
                write!(f, "Cannot connect to '{}': {}", url, error)
            }
            Self::E2002_SOCKET_TRANSPORT { error } => write!(f, "WebSocket error: {}", error),
            Self::E2003_SOCKET_ALREADY_CLOSED => {
                write!(f, "WebSocket connection is closed and is never reopened")
            }
            Self::E3001_REQUEST_FAILED { url, error } => match url {
                Some(url) => write!(f, "Request to '{}' failed: {}", url, error),
                None => write!(f, "Request failed: {}", error),
            },
            Self::E3002_REQUEST_REJECTED { url, code } => {
                write!(f, "Request to '{}' rejected with status {}", url, code)
            }
        }
    }
}

impl From<tungstenite::Error> for ClientError {
    fn from(value: tungstenite::Error) -> Self {
        Self::E2002_SOCKET_TRANSPORT { error: value }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        let url: Option<String> = value.url().map(|e| e.as_str().to_owned());
        Self::E3001_REQUEST_FAILED { url, error: value }
    }
}

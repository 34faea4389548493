use std::time::Duration;

use futures_util::StreamExt;
use log::{debug, error, info, warn};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::channel::{EventChannel, publish};
use crate::errors::{ClientError, ClientResult};
use crate::session::{Session, SessionId};
use crate::types::{SocketEvent, SocketState};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CLOSE_NORMAL: u16 = 1000;
const CLOSE_NO_STATUS: u16 = 1005;
const CLOSE_ABNORMAL: u16 = 1006;

const CLOSE_ACK_TIMEOUT: Duration = Duration::from_secs(1);

struct CloseInfo {
    code: u16,
    reason: String,
}

impl CloseInfo {
    const fn abnormal() -> Self {
        Self {
            code: CLOSE_ABNORMAL,
            reason: String::new(),
        }
    }
}

impl From<CloseFrame> for CloseInfo {
    fn from(frame: CloseFrame) -> Self {
        Self {
            code: frame.code.into(),
            reason: frame.reason.as_str().to_owned(),
        }
    }
}

/// Owns the single socket connection of the client.
///
/// The listener walks `Connecting -> Open -> Closed` exactly once. Every
/// received message overwrites the shared [`Session`]. Errors and closes are
/// reported, never recovered from.
pub struct SocketListener {
    url: Url,
    session: Session,
    shutdown: CancellationToken,
    state: Option<SocketState>,
}

impl SocketListener {
    pub fn new(url: Url, session: Session, shutdown: CancellationToken) -> Self {
        Self {
            url,
            session,
            shutdown,
            state: None,
        }
    }

    /// `None` until `run` is called.
    pub const fn state(&self) -> Option<SocketState> {
        self.state
    }

    pub async fn run<T: EventChannel + ?Sized>(&mut self, channel: &T) -> ClientResult<()> {
        if self.state.is_some() {
            return Err(ClientError::E2003_SOCKET_ALREADY_CLOSED);
        }

        self.state = Some(SocketState::Connecting);
        info!("Connecting to {}", self.url);
        publish(
            channel,
            SocketEvent::Connecting {
                url: self.url.to_string(),
            },
        );

        let connected = tokio::select! {
            () = self.shutdown.cancelled() => None,
            result = connect_async(self.url.as_str()) => Some(result),
        };

        let close = match connected {
            None => {
                info!("Shutdown requested before the handshake completed");
                CloseInfo::abnormal()
            }
            Some(Err(e)) => {
                let error = ClientError::E2001_SOCKET_CONNECT {
                    url: self.url.to_string(),
                    error: e,
                };
                Self::report_error(channel, &error);
                CloseInfo::abnormal()
            }
            Some(Ok((socket, response))) => {
                self.state = Some(SocketState::Open);
                info!("WebSocket connection established.");
                debug!("Handshake response status: {}", response.status());
                publish(channel, SocketEvent::Open);
                self.listen(socket, channel).await
            }
        };

        self.state = Some(SocketState::Closed);
        info!("WebSocket connection closed: {} {}", close.code, close.reason);
        publish(
            channel,
            SocketEvent::Closed {
                code: close.code,
                reason: close.reason,
            },
        );
        Ok(())
    }

    async fn listen<T: EventChannel + ?Sized>(&self, mut socket: Socket, channel: &T) -> CloseInfo {
        let mut received_close: Option<CloseInfo> = None;

        loop {
            let next = tokio::select! {
                () = self.shutdown.cancelled() => None,
                next = socket.next() => Some(next),
            };
            let Some(next) = next else {
                return Self::close_on_shutdown(socket).await;
            };

            match next {
                None => break,
                Some(Ok(message)) => {
                    if let Some(close) = self.handle_message(message, channel).await {
                        received_close = Some(close);
                    }
                }
                Some(Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed)) => {
                    break;
                }
                Some(Err(e)) => {
                    // the peer may drop the TCP stream right after its close frame
                    if received_close.is_some() {
                        debug!("Socket error after close frame: {}", e);
                        break;
                    }
                    Self::report_error(channel, &e.into());
                    return CloseInfo::abnormal();
                }
            }
        }

        received_close.unwrap_or_else(CloseInfo::abnormal)
    }

    async fn handle_message<T: EventChannel + ?Sized>(
        &self,
        message: Message,
        channel: &T,
    ) -> Option<CloseInfo> {
        match message {
            Message::Text(text) => {
                self.accept_identifier(text.as_str().to_owned(), channel).await;
            }
            Message::Binary(bytes) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                self.accept_identifier(text, channel).await;
            }
            Message::Close(frame) => {
                let close = frame.map_or(
                    CloseInfo {
                        code: CLOSE_NO_STATUS,
                        reason: String::new(),
                    },
                    CloseInfo::from,
                );
                return Some(close);
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
        None
    }

    async fn accept_identifier<T: EventChannel + ?Sized>(&self, data: String, channel: &T) {
        info!("WebSocket message received: {}", data);
        self.session.store(SessionId::new(data.clone())).await;
        publish(channel, SocketEvent::Message { data });
    }

    async fn close_on_shutdown(mut socket: Socket) -> CloseInfo {
        info!("Shutdown requested, closing WebSocket connection");
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: String::new().into(),
        };
        if let Err(e) = socket.close(Some(frame)).await {
            warn!("Cannot send close frame: {}", e);
        }

        let drain = async { while let Some(Ok(_)) = socket.next().await {} };
        if timeout(CLOSE_ACK_TIMEOUT, drain).await.is_err() {
            warn!("Peer did not acknowledge the close frame in time");
        }

        CloseInfo {
            code: CLOSE_NORMAL,
            reason: String::new(),
        }
    }

    fn report_error<T: EventChannel + ?Sized>(channel: &T, e: &ClientError) {
        error!("WebSocket error [{}]: {}", e.code(), e);
        publish(
            channel,
            SocketEvent::Error {
                message: e.to_string(),
            },
        );
    }
}

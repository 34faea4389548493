use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info};
use sentry::ClientInitGuard;
use tokio::io::AsyncBufRead;
use tokio_util::sync::CancellationToken;

use crate::channel::EventChannel;
use crate::config::ClientConfig;
use crate::environment::AppEnvironment;
use crate::logs;
use crate::monitoring::Monitoring;
use crate::session::Session;
use crate::socket::SocketListener;
use crate::submit::SubmitHandler;
use crate::trigger;

const MONITORING_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

pub struct AppState {
    pub config: ClientConfig,
    pub session: Session,
    listener: SocketListener,
    handler: SubmitHandler,
    shutdown: CancellationToken,
    _monitoring: Option<ClientInitGuard>,
}

impl AppState {
    pub fn setup() -> Result<Self> {
        let args = AppEnvironment::cmd_args();
        let config = ClientConfig::resolve(&args).context("Cannot resolve configuration")?;
        logs::dispatch_logs(config.log_file.as_deref())?;

        info!("Application setup start");
        info!("parsed args: {:?}", args);

        let monitoring = Monitoring::try_setup_sentry()?;

        let mut app_state = Self::new(config);
        app_state._monitoring = monitoring;

        info!(
            "Application setup complete: socket {}, match {}, price {}",
            app_state.config.ws_url, app_state.config.match_url, app_state.config.price
        );

        Ok(app_state)
    }

    pub fn new(config: ClientConfig) -> Self {
        let session = Session::new();
        let shutdown = CancellationToken::new();
        let listener =
            SocketListener::new(config.ws_url.clone(), session.clone(), shutdown.child_token());
        let handler = SubmitHandler::new(config.match_url.clone(), config.price.clone(), session.clone());

        Self {
            config,
            session,
            listener,
            handler,
            shutdown,
            _monitoring: None,
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs the socket listener alongside the trigger loop until the input
    /// ends or shutdown is requested, then closes the socket.
    ///
    /// Borrows the state so the monitoring guard outlives the run and a
    /// fatal error can still be reported afterwards.
    pub async fn run<C, R>(&mut self, channel: Arc<C>, input: R) -> Result<()>
    where
        C: EventChannel + 'static,
        R: AsyncBufRead + Unpin,
    {
        let Self {
            listener,
            handler,
            shutdown,
            ..
        } = self;

        let triggers_then_shutdown = async {
            let triggers = trigger::run_triggers(input, handler, channel.clone(), shutdown.clone()).await;
            shutdown.cancel();
            triggers
        };
        let (socket_result, triggers) =
            tokio::join!(listener.run(channel.as_ref()), triggers_then_shutdown);

        if let Err(e) = socket_result {
            error!("Socket listener stopped with error [{}]: {}", e.code(), e);
        }

        let triggers = triggers?;
        info!("Application finished after {} submissions", triggers);
        Ok(())
    }

    pub const fn has_monitoring(&self) -> bool {
        self._monitoring.is_some()
    }

    /// Waits for queued monitoring events to be delivered.
    pub fn flush_monitoring(&self) {
        if let Some(guard) = &self._monitoring {
            if !guard.flush(Some(MONITORING_FLUSH_TIMEOUT)) {
                error!("Monitoring events were not flushed in time");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use futures_util::SinkExt;
    use tokio::io::{AsyncWriteExt, BufReader};
    use tokio::time::{sleep, timeout};
    use tokio_tungstenite::tungstenite::Message;

    use super::*;
    use crate::channel::testing::RecordingChannel;
    use crate::socket::testing::{drain, spawn_ws_server};
    use crate::submit::testing::{form_field, spawn_http_responder};
    use crate::types::{SocketEvent, SubmitOutcome};

    fn test_config(ws_url: url::Url, match_url: url::Url) -> ClientConfig {
        ClientConfig {
            ws_url,
            match_url,
            price: "10.0".to_owned(),
            log_file: None,
        }
    }

    async fn wait_for_session(session: &Session) {
        let received = async {
            while session.current().await.is_none() {
                sleep(Duration::from_millis(10)).await;
            }
        };
        timeout(Duration::from_secs(5), received)
            .await
            .expect("session id was never received");
    }

    #[tokio::test]
    async fn test_trigger_after_message_submits_session_id() {
        let (ws_url, ws_server) = spawn_ws_server(|mut ws| async move {
            ws.send(Message::text("abc123".to_owned())).await.expect("send");
            drain(&mut ws).await;
        })
        .await;
        let (match_url, http_server) = spawn_http_responder("HTTP/1.1 200 OK").await;

        let mut app = AppState::new(test_config(ws_url, match_url));
        let session = app.session.clone();
        let channel = Arc::new(RecordingChannel::default());

        let (mut writer, reader) = tokio::io::duplex(64);
        let run_channel = channel.clone();
        let run = tokio::spawn(async move { app.run(run_channel, BufReader::new(reader)).await });

        wait_for_session(&session).await;
        writer.write_all(b"click\n").await.expect("write");
        drop(writer);

        run.await.expect("join").expect("run");
        let request = http_server.await.expect("http server");
        ws_server.await.expect("ws server");

        assert_eq!(form_field(&request, "uuid").as_deref(), Some("abc123"));
        assert_eq!(form_field(&request, "price").as_deref(), Some("10.0"));
        assert_eq!(
            channel.submit_outcomes(),
            vec![SubmitOutcome::Sent { status: 200 }]
        );
        assert_eq!(
            channel.socket_events().last(),
            Some(&SocketEvent::Closed {
                code: 1000,
                reason: String::new()
            })
        );
    }

    #[tokio::test]
    async fn test_monitoring_guard_outlives_run() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        let ws_url = url::Url::parse(&format!("ws://{addr}/v1/ws")).expect("url");
        let match_url = url::Url::parse(&format!("http://{addr}/v1/match")).expect("url");

        let mut app = AppState::new(test_config(ws_url, match_url));
        app._monitoring = Some(sentry::init(sentry::ClientOptions::default()));

        let channel = Arc::new(RecordingChannel::default());
        app.run(channel, BufReader::new("".as_bytes()))
            .await
            .expect("run");

        assert!(app.has_monitoring());
        app.flush_monitoring();
    }
}

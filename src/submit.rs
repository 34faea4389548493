use log::{error, info};
use reqwest::Client;
use reqwest::multipart::Form;
use url::Url;

use crate::channel::{EventChannel, publish};
use crate::errors::{ClientError, ClientResult};
use crate::session::{Session, SessionId};
use crate::types::SubmitOutcome;

pub const DEFAULT_PRICE: &str = "10.0";

const FIELD_PRICE: &str = "price";
const FIELD_UUID: &str = "uuid";
// what the form field carried before any identifier was received
const ABSENT_UUID: &str = "undefined";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub price: String,
    pub uuid: Option<SessionId>,
}

impl SubmissionPayload {
    pub fn uuid_value(&self) -> &str {
        self.uuid.as_ref().map_or(ABSENT_UUID, SessionId::value)
    }

    /// Field order matches the wire order of the form.
    pub fn fields(&self) -> [(&'static str, String); 2] {
        [
            (FIELD_PRICE, self.price.clone()),
            (FIELD_UUID, self.uuid_value().to_owned()),
        ]
    }

    pub fn into_form(self) -> Form {
        self.fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
    }
}

/// Sends the current session identifier to the match endpoint.
///
/// Cheap to clone: clones share the HTTP client and the session cell, so
/// every trigger can run its own submission concurrently.
#[derive(Clone)]
pub struct SubmitHandler {
    client: Client,
    url: Url,
    price: String,
    session: Session,
}

impl SubmitHandler {
    pub fn new(url: Url, price: String, session: Session) -> Self {
        Self {
            client: Client::new(),
            url,
            price,
            session,
        }
    }

    pub async fn payload(&self) -> SubmissionPayload {
        SubmissionPayload {
            price: self.price.clone(),
            uuid: self.session.current().await,
        }
    }

    /// Performs one submission and publishes exactly one outcome.
    pub async fn submit<T: EventChannel + ?Sized>(&self, channel: &T) -> SubmitOutcome {
        let payload = self.payload().await;
        info!(
            "Submitting price {} with uuid {} to {}",
            payload.price,
            payload.uuid_value(),
            self.url
        );

        let outcome = match self.send(payload).await {
            Ok(status) => {
                info!("Request sent successfully.");
                SubmitOutcome::Sent { status }
            }
            Err(ClientError::E3002_REQUEST_REJECTED { code, .. }) => {
                error!("Failed to send request: {}", code);
                SubmitOutcome::Rejected { status: code }
            }
            Err(e) => {
                error!("Failed to send request [{}]: {}", e.code(), e);
                SubmitOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        publish(channel, outcome.clone());
        outcome
    }

    async fn send(&self, payload: SubmissionPayload) -> ClientResult<u16> {
        let response = self
            .client
            .post(self.url.clone())
            .multipart(payload.into_form())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::E3002_REQUEST_REJECTED {
                url: self.url.to_string(),
                code: status.as_u16(),
            });
        }

        Ok(status.as_u16())
    }
}

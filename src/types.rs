use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event", content = "data")]
pub enum Status {
    #[serde(rename_all = "camelCase")]
    Socket(SocketEvent),
    #[serde(rename_all = "camelCase")]
    Submit(SubmitOutcome),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event", content = "data")]
pub enum SocketEvent {
    #[serde(rename_all = "camelCase")]
    Connecting { url: String },
    #[serde(rename_all = "camelCase")]
    Open,
    #[serde(rename_all = "camelCase")]
    Message { data: String },
    #[serde(rename_all = "camelCase")]
    Closed { code: u16, reason: String },
    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event", content = "data")]
pub enum SubmitOutcome {
    #[serde(rename_all = "camelCase")]
    Sent { status: u16 },
    #[serde(rename_all = "camelCase")]
    Rejected { status: u16 },
    #[serde(rename_all = "camelCase")]
    Failed { message: String },
}

impl SubmitOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

impl From<SocketEvent> for Status {
    fn from(value: SocketEvent) -> Self {
        Self::Socket(value)
    }
}

impl From<SubmitOutcome> for Status {
    fn from(value: SubmitOutcome) -> Self {
        Self::Submit(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocketState {
    Connecting,
    Open,
    Closed,
}

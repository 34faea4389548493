use anyhow::Result;
use log::error;

use crate::types::Status;

pub trait EventChannel: Send + Sync {
    fn send(&self, status: Status) -> Result<()>;
}

/// Publishes a status and logs a delivery failure instead of propagating it.
pub fn publish<T: EventChannel + ?Sized>(channel: &T, status: impl Into<Status>) {
    if let Err(e) = channel.send(status.into()) {
        error!("Cannot send event to channel: {:#}", e);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use anyhow::{Result, anyhow};

    use super::EventChannel;
    use crate::types::{SocketEvent, Status, SubmitOutcome};

    #[derive(Default)]
    pub struct RecordingChannel {
        events: Mutex<Vec<Status>>,
    }

    impl RecordingChannel {
        pub fn events(&self) -> Vec<Status> {
            self.events.lock().map(|e| e.clone()).unwrap_or_default()
        }

        pub fn socket_events(&self) -> Vec<SocketEvent> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Status::Socket(s) => Some(s),
                    Status::Submit(_) => None,
                })
                .collect()
        }

        pub fn submit_outcomes(&self) -> Vec<SubmitOutcome> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Status::Submit(s) => Some(s),
                    Status::Socket(_) => None,
                })
                .collect()
        }
    }

    impl EventChannel for RecordingChannel {
        fn send(&self, status: Status) -> Result<()> {
            self.events
                .lock()
                .map_err(|_| anyhow!("recording channel poisoned"))?
                .push(status);
            Ok(())
        }
    }
}

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::channel::EventChannel;
use crate::submit::SubmitHandler;

/// Treats every input line as one submit trigger.
///
/// Submissions are spawned, not awaited in the loop, so triggers that arrive
/// while a request is in flight start their own independent request. Returns
/// the number of triggers once input ends or shutdown is requested and all
/// spawned submissions have finished.
pub async fn run_triggers<R, C>(
    input: R,
    handler: &SubmitHandler,
    channel: Arc<C>,
    shutdown: CancellationToken,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    C: EventChannel + 'static,
{
    let mut lines = input.lines();
    let mut submissions = JoinSet::new();
    let mut triggers: usize = 0;

    loop {
        let line = tokio::select! {
            () = shutdown.cancelled() => {
                info!("Shutdown requested, no more triggers accepted");
                break;
            }
            line = lines.next_line() => line.context("Cannot read trigger input")?,
        };

        if line.is_none() {
            info!("Trigger input closed");
            break;
        }

        triggers = triggers.saturating_add(1);
        let handler = handler.clone();
        let channel = channel.clone();
        submissions.spawn(async move { handler.submit(channel.as_ref()).await });
    }

    let mut succeeded: usize = 0;
    while let Some(result) = submissions.join_next().await {
        match result {
            Ok(outcome) if outcome.is_success() => succeeded = succeeded.saturating_add(1),
            Ok(_) => {}
            Err(e) => error!("Submission task failed: {}", e),
        }
    }
    info!("{} of {} submissions succeeded", succeeded, triggers);

    Ok(triggers)
}

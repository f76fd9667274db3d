//! Run-completion polling.
//!
//! A run is fetched, classified, and re-fetched after a fixed delay until it
//! reaches a terminal state or the attempt budget runs out.

use super::error::{RelayError, RelayResult};
use crate::config::PollConfig;
use crate::openai::{AssistantsApi, Run, RunStatus};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Completed,
    Failed { reason: String },
}

impl RunState {
    pub fn of(run: &Run) -> Self {
        match run.status {
            RunStatus::Completed => RunState::Completed,
            RunStatus::RequiresAction => RunState::Failed {
                reason: "run requires tool outputs, which are never submitted".to_string(),
            },
            status if status.is_terminal() => RunState::Failed {
                reason: run
                    .last_error
                    .as_ref()
                    .and_then(|e| e.message.clone())
                    .unwrap_or_else(|| "no error detail reported".to_string()),
            },
            _ => RunState::Pending,
        }
    }
}

/// Waits until the run completes. Every status check but the last is
/// followed by a `poll.interval` sleep; after `poll.max_attempts` checks
/// without a terminal state the wait gives up with [`RelayError::Timeout`].
#[instrument(skip(api, poll))]
pub async fn wait_for_completion(
    api: &dyn AssistantsApi,
    thread_id: &str,
    run_id: &str,
    poll: &PollConfig,
) -> RelayResult<Run> {
    let start = Instant::now();

    for attempt in 1..=poll.max_attempts {
        let run = api.retrieve_run(thread_id, run_id).await?;

        match RunState::of(&run) {
            RunState::Completed => {
                info!(
                    attempts = attempt,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Run completed"
                );
                return Ok(run);
            }
            RunState::Failed { reason } => {
                warn!(status = %run.status, reason = %reason, "Run ended without completing");
                return Err(RelayError::RunFailed {
                    run_id: run_id.to_string(),
                    status: run.status,
                    reason,
                });
            }
            RunState::Pending => {
                debug!(attempt = attempt, status = %run.status, "Run still pending");
            }
        }

        if attempt < poll.max_attempts {
            tokio::time::sleep(poll.interval).await;
        }
    }

    Err(RelayError::Timeout {
        run_id: run_id.to_string(),
        attempts: poll.max_attempts,
    })
}

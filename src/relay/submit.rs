use super::error::RelayResult;
use super::session::Session;
use crate::openai::{AssistantsApi, Run};
use tracing::{debug, instrument};

/// Appends the user's message to the session thread, then starts a run for
/// the session assistant. The append is not rolled back if the run fails to
/// start.
#[instrument(
    skip(api, session, input),
    fields(thread_id = %session.thread_id(), input_length = input.len())
)]
pub async fn submit_turn(
    api: &dyn AssistantsApi,
    session: &Session,
    input: &str,
    model: Option<&str>,
) -> RelayResult<Run> {
    let message = api.create_message(session.thread_id(), input).await?;
    debug!(message_id = %message.id, "User message appended");

    let run = api
        .create_run(session.thread_id(), session.assistant_id(), model)
        .await?;
    debug!(run_id = %run.id, status = %run.status, "Run created");

    Ok(run)
}

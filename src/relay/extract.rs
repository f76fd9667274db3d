use super::error::{RelayError, RelayResult};
use crate::openai::{AssistantsApi, Message, MessageRole};
use tracing::{debug, instrument};

/// Picks the newest assistant message produced by `run_id`.
///
/// Ordering is decided by `created_at`; on a tie the message listed first
/// wins, since listings come newest first.
pub fn select_reply<'a>(messages: &'a [Message], run_id: &str) -> Option<&'a Message> {
    messages
        .iter()
        .filter(|m| m.role == MessageRole::Assistant && m.run_id.as_deref() == Some(run_id))
        .fold(None, |best: Option<&Message>, m| match best {
            Some(b) if b.created_at >= m.created_at => Some(b),
            _ => Some(m),
        })
}

/// Fetches the thread listing and returns the reply text for `run_id`.
#[instrument(skip(api))]
pub async fn extract_reply(
    api: &dyn AssistantsApi,
    thread_id: &str,
    run_id: &str,
) -> RelayResult<String> {
    let messages = api.list_messages(thread_id, run_id).await?;

    let (message, reply) = select_reply(&messages, run_id)
        .and_then(|m| m.first_text().map(|text| (m, text)))
        .filter(|(_, text)| !text.trim().is_empty())
        .ok_or_else(|| RelayError::NoValidReply {
            run_id: run_id.to_string(),
        })?;

    debug!(
        message_id = %message.id,
        created_at = ?message.created_at_utc(),
        reply_length = reply.len(),
        "Reply extracted"
    );
    Ok(reply.to_string())
}

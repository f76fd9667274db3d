use super::AppState;
use crate::relay::RelayError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const NOT_READY_MESSAGE: &str = "OpenAI not initialized properly";
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMessageRequest {
    pub user_input: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMessageResponse {
    pub bot_response: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub initialized: bool,
}

/// Outward error shape. Only fixed messages ever reach the caller.
#[derive(Debug)]
pub enum ApiError {
    NotReady,
    // Answered like any other failure; kept apart for logging.
    InvalidInput,
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, msg) = match self {
            ApiError::NotReady => (StatusCode::INTERNAL_SERVER_ERROR, NOT_READY_MESSAGE),
            ApiError::InvalidInput | ApiError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE)
            }
        };
        let body = Json(serde_json::json!({ "error": msg }));
        (code, body).into_response()
    }
}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::NotInitialized => ApiError::NotReady,
            _ => ApiError::Internal,
        }
    }
}

/// Pulls `userInput` out of an already-parsed body. Any non-empty string is
/// relayed as is, whitespace included.
pub fn parse_user_input(body: Value) -> Option<String> {
    serde_json::from_value::<UserMessageRequest>(body)
        .ok()
        .map(|request| request.user_input)
        .filter(|input| !input.is_empty())
}

pub async fn process_user_message(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UserMessageResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    let session = state.sessions.get().await.map_err(|e| {
        warn!(request_id = %request_id, error = %e, "Rejecting request");
        ApiError::from(e)
    })?;

    let input = match body {
        Ok(Json(value)) => parse_user_input(value),
        Err(rejection) => {
            warn!(request_id = %request_id, reason = %rejection.body_text(), "Unreadable request body");
            None
        }
    }
    .ok_or_else(|| {
        warn!(request_id = %request_id, "userInput must be a non-empty string");
        ApiError::InvalidInput
    })?;

    // The turn runs on its own task so a caller hanging up does not abandon
    // a run half way through.
    let relay = state.relay.clone();
    let span = info_span!("turn", request_id = %request_id);
    let turn = tokio::spawn(async move { relay.run_turn(&session, &input).await }.instrument(span));

    match turn.await {
        Ok(Ok(reply)) => {
            info!(request_id = %request_id, reply_length = reply.len(), "Reply sent");
            Ok(Json(UserMessageResponse {
                bot_response: reply,
            }))
        }
        Ok(Err(e)) => {
            error!(request_id = %request_id, error = %e, "Error processing user message");
            Err(ApiError::from(e))
        }
        Err(join_error) => {
            error!(request_id = %request_id, error = %join_error, "Turn task aborted");
            Err(ApiError::Internal)
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        initialized: state.sessions.is_ready().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_input_must_be_a_non_empty_string() {
        assert_eq!(
            parse_user_input(json!({"userInput": "Hello"})).as_deref(),
            Some("Hello")
        );
        assert_eq!(parse_user_input(json!({})), None);
        assert_eq!(parse_user_input(json!({"userInput": 42})), None);
        assert_eq!(parse_user_input(json!({"userInput": null})), None);
        assert_eq!(parse_user_input(json!({"userInput": ""})), None);
        assert_eq!(
            parse_user_input(json!({"userInput": "   "})).as_deref(),
            Some("   ")
        );
        assert_eq!(parse_user_input(json!(["Hello"])), None);
    }

    #[test]
    fn relay_errors_never_leak_detail() {
        let err = ApiError::from(RelayError::NoValidReply {
            run_id: "run_1".to_string(),
        });
        assert!(matches!(err, ApiError::Internal));
        assert!(matches!(
            ApiError::from(RelayError::NotInitialized),
            ApiError::NotReady
        ));
    }

    #[test]
    fn invalid_input_answers_with_the_generic_failure() {
        let response = ApiError::InvalidInput.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

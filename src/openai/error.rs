use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenAIError {
    #[error("Network error - unable to reach the API: {reason}")]
    Network { reason: String },
    #[error("Request timeout - the API took too long to respond")]
    Timeout,
    #[error("Authentication failed - check your API key")]
    Unauthorized,
    #[error("Rate limit exceeded - too many requests")]
    RateLimited,
    #[error("Resource not found: {message}")]
    NotFound { message: String },
    #[error("Invalid request ({status}): {message}")]
    InvalidRequest { status: u16, message: String },
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Failed to decode API response: {reason}")]
    Decode { reason: String },
}

pub type Result<T> = std::result::Result<T, OpenAIError>;

impl OpenAIError {
    /// Maps a non-success HTTP status and its body onto the error taxonomy.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_api_message(body);
        match status {
            401 | 403 => OpenAIError::Unauthorized,
            404 => OpenAIError::NotFound { message },
            429 => OpenAIError::RateLimited,
            500..=599 => OpenAIError::Server { status, message },
            _ => OpenAIError::InvalidRequest { status, message },
        }
    }
}

impl From<reqwest::Error> for OpenAIError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OpenAIError::Timeout
        } else if e.is_decode() {
            OpenAIError::Decode {
                reason: e.to_string(),
            }
        } else {
            OpenAIError::Network {
                reason: e.to_string(),
            }
        }
    }
}

// The API wraps failures as {"error": {"message": "..."}}; fall back to the raw body.
fn extract_api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

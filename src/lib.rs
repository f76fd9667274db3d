pub mod config;
pub mod openai;
pub mod relay;
pub mod server;

pub use config::{Config, ConfigError, PollConfig};
pub use openai::{AssistantsApi, OpenAIClient, OpenAIError};
pub use relay::{Relay, RelayError, Session, SessionSlot};
pub use server::{router, AppState};

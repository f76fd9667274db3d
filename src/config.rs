//! Environment-driven configuration.
//!
//! Values come from the process environment, after an optional `.env` file in
//! the working directory has been loaded.

use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {names}")]
    MissingVariables { names: String },
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 150,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_key: String,
    pub assistant_id: String,
    pub base_url: String,
    /// Model sent with every run; `None` keeps the assistant's own model.
    pub model: Option<String>,
    pub poll: PollConfig,
    pub request_timeout: Duration,
    /// Abort startup when the session cannot be initialized.
    pub init_strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            api_key: String::new(),
            assistant_id: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: Some(DEFAULT_MODEL.to_string()),
            poll: PollConfig::default(),
            request_timeout: Duration::from_secs(30),
            init_strict: false,
        }
    }
}

impl Config {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let api_key = get("OPENAI_API_KEY");
        let assistant_id = get("ASSISTANT_ID").or_else(|| get("ASSISTANT"));

        let mut missing = Vec::new();
        if api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        if assistant_id.is_none() {
            missing.push("ASSISTANT_ID");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables {
                names: missing.join(", "),
            });
        }

        let base_url = match get("OPENAI_BASE_URL") {
            Some(raw) => {
                Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                    name: "OPENAI_BASE_URL",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                raw
            }
            None => defaults.base_url,
        };

        // An explicitly empty OPENAI_MODEL disables the override.
        let model = match lookup("OPENAI_MODEL") {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(raw.trim().to_string()),
            None => defaults.model,
        };

        let poll = PollConfig {
            interval: get("POLL_INTERVAL_MS")
                .map(|v| parse_number::<u64>("POLL_INTERVAL_MS", &v))
                .transpose()?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll.interval),
            max_attempts: get("POLL_MAX_ATTEMPTS")
                .map(|v| parse_number::<u32>("POLL_MAX_ATTEMPTS", &v))
                .transpose()?
                .unwrap_or(defaults.poll.max_attempts),
        };
        if poll.interval.is_zero() {
            return Err(ConfigError::Invalid {
                name: "POLL_INTERVAL_MS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if poll.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "POLL_MAX_ATTEMPTS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: get("PORT")
                .map(|v| parse_number::<u16>("PORT", &v))
                .transpose()?
                .unwrap_or(defaults.port),
            api_key: api_key.unwrap_or_default(),
            assistant_id: assistant_id.unwrap_or_default(),
            base_url,
            model,
            poll,
            request_timeout: get("REQUEST_TIMEOUT_SECS")
                .map(|v| parse_number::<u64>("REQUEST_TIMEOUT_SECS", &v))
                .transpose()?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            init_strict: get("INIT_STRICT")
                .map(|v| parse_flag("INIT_STRICT", &v))
                .transpose()?
                .unwrap_or(defaults.init_strict),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
